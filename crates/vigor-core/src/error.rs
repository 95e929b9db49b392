//! Error types for the VIGOR engine

use thiserror::Error;

/// Core VIGOR errors
///
/// Every error is synchronous and local to the call that raised it; a
/// rejected operation mutates nothing. Removing an absent modifier or
/// re-setting an unchanged base value are not errors; they report
/// "no change" through their boolean results instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VigorError {
    // Range errors
    #[error("Ratio must be non-negative, got {0}")]
    NegativeRatio(f64),

    #[error("Minimum {min} exceeds the bound maximum {max}")]
    MinAboveMax { min: f64, max: f64 },

    #[error("Bound must be non-negative, got {0}")]
    NegativeBound(f64),

    // Configuration errors
    #[error("Unknown modifier kind: {0:#04x}")]
    UnknownModifierKind(u8),
}

/// Result type for VIGOR operations
pub type VigorResult<T> = Result<T, VigorError>;
