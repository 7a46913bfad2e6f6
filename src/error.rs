use alloc::string::String;

use crate::iir::Structure;

/// Errors raised while validating a filter design or selecting a structure.
///
/// Fixed-point overflow is not an error: it saturates inside the arithmetic.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("coefficient set is empty")]
    EmptyCoefficients,

    #[error("numerator has {b} coefficients but denominator has {a}")]
    LengthMismatch { b: usize, a: usize },

    #[error("leading denominator coefficient a0 is zero")]
    ZeroLeadingDenominator,

    #[error("second-order section {section} has a zero a0")]
    ZeroSectionDenominator { section: usize },

    #[error("coefficient {index} is not finite")]
    NonFiniteCoefficient { index: usize },

    #[error("cascade has no second-order sections")]
    EmptyCascade,

    #[error("{structure} is not supported here: {reason}")]
    Unsupported {
        structure: Structure,
        reason: &'static str,
    },

    #[error("unknown filter structure `{0}`")]
    UnknownStructure(String),

    #[error("unknown sample representation `{0}`")]
    UnknownRepresentation(String),
}

pub type Result<T> = core::result::Result<T, Error>;
