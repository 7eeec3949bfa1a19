//! Platform error types

use thiserror::Error;

/// Platform-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// The looper was asked to quit and no longer accepts messages
    #[error("Looper has quit, message rejected")]
    LooperQuit,

    /// A lifecycle transition that the state graph does not allow
    #[error("Invalid lifecycle transition: {from} -> {to}")]
    InvalidTransition {
        /// State the lifecycle was in
        from: &'static str,
        /// State that was requested
        to: &'static str,
    },
}

/// Result type for platform operations
pub type Result<T> = std::result::Result<T, PlatformError>;
