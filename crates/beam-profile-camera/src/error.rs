use beam_profile_core::FrameError;

/// Errors reported by camera backends.
#[derive(thiserror::Error, Debug)]
pub enum CameraError {
    #[error("no cameras accessible")]
    NoCameras,
    #[error("failed to access camera '{0}'")]
    NotFound(String),
    #[error("camera '{camera}' is already in use")]
    Busy { camera: String },
    #[error("frame capture on '{camera}' timed out after {timeout_ms} ms")]
    Timeout { camera: String, timeout_ms: u128 },
    #[error("camera feature '{feature}' failed: {reason}")]
    Feature { feature: String, reason: String },
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
