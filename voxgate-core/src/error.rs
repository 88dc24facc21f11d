use thiserror::Error;

/// All errors produced by voxgate-core.
///
/// Every variant is recoverable: the caller decides whether to retry,
/// fall back to another configuration, or give up.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no default input device found")]
    DeviceUnavailable,

    #[error("input device rejected stream parameters: {0}")]
    StreamOpenFailed(String),

    #[error("audio stream not initialized")]
    StreamNotInitialized,

    #[error("failed to start audio stream: {0}")]
    StreamStartFailed(String),

    #[error("failed to stop audio stream: {0}")]
    StreamStopFailed(String),

    #[error("invalid configuration: {field} {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, CaptureError>;
