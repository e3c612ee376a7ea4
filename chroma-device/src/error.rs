//! Device layer error types

use chroma_protocol::CommandError;
use thiserror::Error;

/// Errors from high-level device operations
#[derive(Error, Debug)]
pub enum DeviceError {
    /// A protocol command failed underneath
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Parameter outside the range the hardware accepts
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Feature not present on this hardware model
    #[error("Not supported on {model}: {feature}")]
    NotSupported {
        model: &'static str,
        feature: &'static str,
    },

    /// Device returned a well-formed but nonsensical result
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}
