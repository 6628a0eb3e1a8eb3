// ─────────────────────────────────────────────────────────────────────
// Firefly Sync — Error Hierarchy
// ─────────────────────────────────────────────────────────────────────

use thiserror::Error;

/// Root error type for the oscillator core.
///
/// Ticking and commands never fail; only construction, config parsing
/// and parameter-name lookup surface errors.
#[derive(Error, Debug)]
pub enum FireflyError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Invalid command argument (e.g. a degenerate spawn area).
    #[error("validation error: {0}")]
    Validation(String),

    /// Parameter name not recognised by `Parameter::from_str`.
    #[error("unknown parameter: {0}")]
    UnknownParameter(String),

    /// Numerical error (NaN/Inf in computation).
    #[error("numerical error: {0}")]
    Numerical(String),
}

pub type FireflyResult<T> = Result<T, FireflyError>;
