use beam_profile_core::RoiError;

/// Errors returned by the beam profiler.
///
/// All of them describe malformed input; a lineout without any peak is
/// *not* an error (see [`crate::FwhmResult::selected`]).
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ProfileError {
    #[error("frame is empty")]
    EmptyFrame,
    #[error("frame buffer holds {got} samples, expected {expected}")]
    FrameBuffer { expected: usize, got: usize },
    #[error(transparent)]
    InvalidRoi(#[from] RoiError),
    #[error("prominence_min must be a positive finite number, got {0}")]
    InvalidProminence(f64),
    #[error("pixbit must be in 1..=16, got {0}")]
    InvalidBitDepth(u8),
    #[error("rel_height must be a non-negative finite number, got {0}")]
    InvalidRelHeight(f64),
    #[error("peak index {index} is not an interior sample of a {len}-sample lineout")]
    PeakOutOfRange { index: usize, len: usize },
}
