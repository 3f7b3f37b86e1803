//! Core type definitions for the simulator.
//!
//! This module defines the fundamental types used throughout the engine and
//! the helpers that render them in trace output.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Not;

/// Simulated time.
///
/// Time is logical, not wall-clock. It is a single-precision float, and
/// trace lines print it with [`format_float`].
pub type SimTime = f32;

/// Arena index of a gate inside a [`Circuit`](crate::circuit::Circuit).
pub type GateId = usize;

/// Arena index of a wire inside a [`Circuit`](crate::circuit::Circuit).
pub type WireId = usize;

/// A Boolean signal level carried by gates and wires.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Signal {
    /// Logic 0
    #[default]
    Low,
    /// Logic 1
    High,
}

impl Signal {
    /// Returns the signal as 0 or 1.
    pub fn as_u8(self) -> u8 {
        match self {
            Signal::Low => 0,
            Signal::High => 1,
        }
    }

    /// Returns true for logic 1.
    pub fn is_high(self) -> bool {
        self == Signal::High
    }
}

impl Not for Signal {
    type Output = Signal;

    fn not(self) -> Signal {
        match self {
            Signal::Low => Signal::High,
            Signal::High => Signal::Low,
        }
    }
}

impl From<bool> for Signal {
    fn from(value: bool) -> Self {
        if value {
            Signal::High
        } else {
            Signal::Low
        }
    }
}

impl From<Signal> for u8 {
    fn from(signal: Signal) -> u8 {
        signal.as_u8()
    }
}

impl TryFrom<u8> for Signal {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Signal::Low),
            1 => Ok(Signal::High),
            other => Err(format!("signal value {} is not 0 or 1", other)),
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// Returns true if `delay` can be used to schedule an event.
pub fn is_valid_delay(delay: SimTime) -> bool {
    delay.is_finite() && delay >= 0.0
}

/// Formats a float for trace lines and listings.
///
/// Values in `[1e-3, 1e7)` print in plain decimal with at least one
/// fractional digit (`5.0`, `0.25`); everything else uses computerized
/// scientific notation (`1.0E7`, `2.5E-4`). Trace consumers rely on this shape.
pub fn format_float(value: SimTime) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }

    let magnitude = value.abs();
    if (1e-3..1e7).contains(&magnitude) {
        let plain = format!("{}", value);
        if plain.contains('.') {
            plain
        } else {
            format!("{}.0", plain)
        }
    } else {
        let sci = format!("{:e}", value);
        match sci.split_once('e') {
            Some((mantissa, exponent)) if mantissa.contains('.') => {
                format!("{}E{}", mantissa, exponent)
            }
            Some((mantissa, exponent)) => format!("{}.0E{}", mantissa, exponent),
            None => sci,
        }
    }
}
