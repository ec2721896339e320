//! Errors and warnings.
//!
//! Hard errors ([`Error`]) are returned before any computation starts and
//! indicate that the caller must correct its input. Soft conditions
//! ([`Warning`]) never abort a computation. They are returned together with
//! the computed value so that the caller can decide what to do with it.

/// Hard error of the numeric routines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The input parameters cannot be used for the computation.
    ///
    /// The string describes which input is wrong.
    InvalidInput(String),
}

impl Error {
    pub(crate) fn invalid(reason: impl Into<String>) -> Error {
        Error::InvalidInput(reason.into())
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidInput(reason) => write!(f, "invalid input: {reason}"),
        }
    }
}

impl std::error::Error for Error {}

/// Soft condition found while computing a hardware value.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Warning {
    /// A control word falls outside the range accepted by its register.
    OutOfRange {
        /// Computed value.
        value: u64,
        /// Smallest valid value.
        min: u64,
        /// Largest valid value.
        max: u64,
    },
    /// The chirp rate search ran out of register width before reaching the
    /// requested tolerance.
    ToleranceNotMet {
        /// Error of the best rate pair found.
        error: f64,
        /// Requested tolerance.
        tolerance: f64,
    },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::OutOfRange { value, min, max } => write!(
                f,
                "control word {value} ({value:#x}) out of range [{min}, {max}]"
            ),
            Warning::ToleranceNotMet { error, tolerance } => write!(
                f,
                "rate registers exhausted before reaching tolerance {tolerance:e} \
                 (best error {error:e})"
            ),
        }
    }
}

/// Result type of the numeric routines.
pub type Result<T> = std::result::Result<T, Error>;
