use thiserror::Error;

use crate::qnumber::QFormat;

/// Result type used by every checked operation in this workspace.
pub type Result<T> = core::result::Result<T, Error>;

/// Failures of the numeric layer and of the controllers built on it.
///
/// All of these are caller or configuration errors: nothing here is transient,
/// so no operation retries.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A value does not fit the representable domain at construction.
    #[error("value {value} is outside the representable range")]
    Range { value: f64 },

    /// Two fixed-point operands of different widths were combined.
    #[error("cannot combine {lhs} with {rhs}")]
    FormatMismatch { lhs: QFormat, rhs: QFormat },

    /// An arithmetic result left the representable range.
    #[error("arithmetic overflow")]
    Overflow,

    #[error("division by zero")]
    DivideByZero,

    /// Invalid limits, scales or margins handed to a constructor or setter.
    #[error("configuration error: {0}")]
    Configuration(&'static str),
}

impl Error {
    pub fn range(value: f64) -> Self {
        Self::Range { value }
    }

    pub fn config(reason: &'static str) -> Self {
        Self::Configuration(reason)
    }
}
