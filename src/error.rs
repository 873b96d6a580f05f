//! Error types for the LDS test server.

use thiserror::Error;

use crate::bootstrap::BootstrapStep;
use crate::runtime::RuntimeError;

/// Main error type for argument parsing and server bootstrap.
#[derive(Error, Debug)]
pub enum TestServerError {
    /// The program was started without any arguments
    #[error("no options found")]
    NoArguments,

    /// More arguments than the parser accepts
    #[error("too many options found: {count} arguments, at most {max} allowed")]
    TooManyArguments { count: usize, max: usize },

    /// A flag was the last token and has no value to pair with
    #[error("option '{flag}' at argument {index} is missing its value")]
    MissingValue { index: usize, flag: String },

    /// A flag code the parser does not recognize
    #[error("invalid option '{flag}' at argument {index}")]
    UnknownFlag { index: usize, flag: String },

    /// A flag value longer than its field allows
    #[error("value for {field} is {len} bytes, limit is {max}")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    /// No `-p` flag was given
    #[error("port is not set")]
    MissingPort,

    /// The `-p` value is not a usable port number
    #[error("invalid port '{0}': expected an integer between 1 and 65535")]
    InvalidPort(String),

    /// A call into the server runtime failed
    #[error("bootstrap step '{step}' failed: {source}")]
    BootstrapStep {
        step: BootstrapStep,
        #[source]
        source: RuntimeError,
    },
}

/// Coarse classification of [`TestServerError`], one per exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Zero arguments, too many arguments, or a flag without its value
    ArgumentCount,
    /// Unrecognized flag code
    UnknownFlag,
    /// Missing or malformed configuration value
    Configuration,
    /// A runtime call failed during bootstrap
    BootstrapStep,
}

impl ErrorKind {
    /// Process exit code reported for this kind of failure.
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::ArgumentCount => 1,
            ErrorKind::UnknownFlag => 2,
            ErrorKind::Configuration => 3,
            ErrorKind::BootstrapStep => 4,
        }
    }
}

impl TestServerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TestServerError::NoArguments
            | TestServerError::TooManyArguments { .. }
            | TestServerError::MissingValue { .. } => ErrorKind::ArgumentCount,
            TestServerError::UnknownFlag { .. } => ErrorKind::UnknownFlag,
            TestServerError::FieldTooLong { .. }
            | TestServerError::MissingPort
            | TestServerError::InvalidPort(_) => ErrorKind::Configuration,
            TestServerError::BootstrapStep { .. } => ErrorKind::BootstrapStep,
        }
    }
}

/// Result type alias for test server operations
pub type Result<T> = std::result::Result<T, TestServerError>;
