//! Conversion errors

use thiserror::Error;

/// Reasons a frame cannot be converted.
///
/// Nothing is written to the destination when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("unsupported pixel format: {0:#010x}")]
    UnsupportedFormat(u32),
}

pub type Result<T> = std::result::Result<T, ConvertError>;

impl ConvertError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        ConvertError::InvalidArgument(msg.into())
    }
}
