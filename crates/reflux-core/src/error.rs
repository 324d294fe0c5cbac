//! Error types for Reflux core.

use std::fmt;

/// Signal-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalError {
    /// One or more slots panicked during an isolated emission.
    ///
    /// Every slot still ran; `messages` holds each panic payload in
    /// connection order.
    SlotsPanicked {
        /// How many slots panicked.
        count: usize,
        /// The panic messages, one per failed slot.
        messages: Vec<String>,
    },
}

impl fmt::Display for SignalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SlotsPanicked { count, messages } => {
                write!(f, "{count} slot(s) panicked during emit")?;
                if !messages.is_empty() {
                    write!(f, ": {}", messages.join("; "))?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for SignalError {}

/// A specialized Result type for signal operations.
pub type Result<T> = std::result::Result<T, SignalError>;
