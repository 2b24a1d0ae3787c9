//! Single-shot acquisition: select → open → setup → capture → save → analyse.

use std::path::{Path, PathBuf};
use std::time::Duration;

use beam_profile_camera::{
    capture, save_frame, select_camera, setup_camera, CameraError, CameraInfo, CameraSystem,
    PersistError, DEFAULT_CAPTURE_TIMEOUT,
};
use beam_profile_core::{Frame, FrameError, PixelFormat, Roi};
use beam_profile_peaks::{
    FwhmResult, PeakProfiler, ProfileError, ProfileParams, DEFAULT_PROMINENCE_MIN,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Any failure of [`acquire`].
#[derive(thiserror::Error, Debug)]
pub enum AcquireError {
    #[error(transparent)]
    Camera(#[from] CameraError),
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error(transparent)]
    Profile(#[from] ProfileError),
}

/// Analysis settings applied to a captured or loaded frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Region to profile; the full frame when unset.
    pub roi: Option<Roi>,
    pub prominence_min: f64,
    /// Inversion bit depth; the frame's own bit depth when unset.
    pub pixbit: Option<u8>,
    pub invert: bool,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            roi: None,
            prominence_min: DEFAULT_PROMINENCE_MIN,
            pixbit: None,
            invert: false,
        }
    }
}

impl AnalysisSettings {
    /// Profiler parameters for a frame of `bit_depth` bits.
    pub fn params_for(&self, bit_depth: u8) -> ProfileParams {
        ProfileParams {
            prominence_min: self.prominence_min,
            pixbit: self.pixbit.unwrap_or(bit_depth),
            invert: self.invert,
        }
    }
}

/// Options of one [`acquire`] call.
#[derive(Clone, Debug, PartialEq)]
pub struct AcquireOptions {
    /// Camera to use; the first enumerated camera when `None`.
    pub camera_id: Option<String>,
    pub save_dir: PathBuf,
    pub timeout: Duration,
    /// Channel to keep from a multi-channel frame.
    pub channel: Option<usize>,
    pub analyze: bool,
    pub analysis: AnalysisSettings,
}

impl Default for AcquireOptions {
    fn default() -> Self {
        Self {
            camera_id: None,
            save_dir: PathBuf::from("."),
            timeout: DEFAULT_CAPTURE_TIMEOUT,
            channel: None,
            analyze: false,
            analysis: AnalysisSettings::default(),
        }
    }
}

/// What one acquisition produced.
#[derive(Clone, Debug)]
pub struct AcquireOutcome {
    pub camera: CameraInfo,
    pub pixel_format: PixelFormat,
    pub timestamp: NaiveDateTime,
    pub frame: Frame,
    pub frame_path: PathBuf,
    /// Present when [`AcquireOptions::analyze`] was set.
    pub analysis: Option<FwhmResult>,
}

/// Capture one frame, write it to `opts.save_dir` and optionally profile it.
///
/// The camera session is dropped before the frame is written, so the device
/// is released on success and on every error path.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(system, opts), fields(camera = ?opts.camera_id))
)]
pub fn acquire(
    system: &dyn CameraSystem,
    opts: &AcquireOptions,
) -> Result<AcquireOutcome, AcquireError> {
    let camera = select_camera(system, opts.camera_id.as_deref())?;
    log::info!(
        "using camera {} ({}) on {}",
        camera.name,
        camera.id,
        camera.interface_id
    );

    let (pixel_format, cap) = {
        let mut session = system.open(&camera)?;
        setup_camera(session.as_mut());
        let pixel_format = session.pixel_format()?;
        let cap = capture(session.as_mut(), opts.timeout)?;
        (pixel_format, cap)
    };

    let frame = match opts.channel {
        Some(c) => cap.frame.channel(c)?,
        None => cap.frame.into_mono()?,
    };
    let frame_path = save_frame(
        &frame,
        &opts.save_dir,
        Some(cap.timestamp),
        pixel_format.label(),
    )?;

    let analysis = if opts.analyze {
        Some(analyze_frame(&frame, &opts.analysis)?)
    } else {
        None
    };

    Ok(AcquireOutcome {
        camera,
        pixel_format,
        timestamp: cap.timestamp,
        frame,
        frame_path,
        analysis,
    })
}

/// Profile `frame` with `settings`, defaulting to the whole frame.
pub fn analyze_frame(
    frame: &Frame,
    settings: &AnalysisSettings,
) -> Result<FwhmResult, ProfileError> {
    let view = frame.as_view();
    let roi = settings.roi.unwrap_or_else(|| Roi::full(&view));
    let profiler = PeakProfiler::new(settings.params_for(frame.bit_depth))?;
    profiler.profile(&view, &roi)
}

/// Load a saved `.npy` frame and profile it.
pub fn analyze_file(
    path: &Path,
    settings: &AnalysisSettings,
) -> Result<(Frame, FwhmResult), AcquireError> {
    let frame = beam_profile_camera::load_frame(path)?;
    let result = analyze_frame(&frame, settings)?;
    Ok((frame, result))
}
