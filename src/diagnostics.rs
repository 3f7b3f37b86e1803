//! Warning collection.
//!
//! Structural problems in a circuit description and logical inconsistencies
//! found by sanity checks are warnings, not errors: they are counted and
//! logged, and the caller decides whether the run may go ahead.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single non-fatal problem report.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Warning {
    /// Human-readable message, usually prefixed by the entity it concerns
    pub message: String,
}

impl Warning {
    /// Creates a warning from any message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// An ordered list of warnings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records and logs a warning.
    pub fn warn(&mut self, message: impl Into<String>) {
        self.push(Warning::new(message));
    }

    /// Records and logs an existing warning.
    pub fn push(&mut self, warning: Warning) {
        tracing::warn!("{}", warning);
        self.warnings.push(warning);
    }

    /// Appends every warning from `other`.
    pub fn extend(&mut self, warnings: impl IntoIterator<Item = Warning>) {
        for warning in warnings {
            self.push(warning);
        }
    }

    /// Returns the number of warnings.
    pub fn count(&self) -> usize {
        self.warnings.len()
    }

    /// Returns true if nothing was reported.
    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Iterates over warnings in report order.
    pub fn iter(&self) -> impl Iterator<Item = &Warning> {
        self.warnings.iter()
    }

    /// Returns the warnings as a slice.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Removes and returns all warnings.
    pub fn take(&mut self) -> Vec<Warning> {
        std::mem::take(&mut self.warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_in_order() {
        let mut diag = Diagnostics::new();
        assert!(diag.is_empty());

        diag.warn("first");
        diag.extend(vec![Warning::new("second"), Warning::new("third")]);

        let messages: Vec<_> = diag.iter().map(|w| w.to_string()).collect();
        assert_eq!(messages, vec!["first", "second", "third"]);
        assert_eq!(diag.count(), 3);
    }

    #[test]
    fn test_take_empties() {
        let mut diag = Diagnostics::new();
        diag.warn("oops");
        let taken = diag.take();
        assert_eq!(taken.len(), 1);
        assert!(diag.is_empty());
    }
}
