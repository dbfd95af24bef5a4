//! Error taxonomy.
//!
//! None of these escape a [`TextBlock`](crate::text_block::TextBlock): the
//! component logs them and degrades to a state that shows more content, not less.

use thiserror::Error;

/// Errors raised by the measurement, clipboard and configuration layers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypographyError {
    /// The render surface cannot report sizes (no layout capability).
    #[error("render surface cannot report sizes")]
    MeasurementUnavailable,

    /// Writing to the clipboard failed. Swallowed by the copy transition.
    #[error("clipboard write failed: {reason}")]
    ClipboardWriteFailed { reason: String },

    /// A configuration value was out of range and has been clamped.
    #[error("invalid {field}: {value} (clamped to minimum)")]
    InvalidConfig { field: &'static str, value: i64 },
}

pub type Result<T> = std::result::Result<T, TypographyError>;
