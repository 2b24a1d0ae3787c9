use std::fmt;
use std::time::Duration;

use beam_profile_core::{CapturedFrame, PixelFormat};
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::CameraError;

/// Frame timeout used by the acquisition tool.
pub const DEFAULT_CAPTURE_TIMEOUT: Duration = Duration::from_millis(2000);

/// How a camera is attached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transport {
    GigE,
    Usb,
    Simulated,
    File,
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::GigE => "GigE",
            Self::Usb => "USB",
            Self::Simulated => "simulated",
            Self::File => "file",
        };
        f.write_str(s)
    }
}

/// Identity of a camera as enumerated by a [`CameraSystem`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraInfo {
    /// SDK camera id, e.g. `DEV_000F314EED0D`.
    pub id: String,
    pub name: String,
    pub interface_id: String,
    pub transport: Transport,
}

/// Entry point of a camera SDK.
pub trait CameraSystem {
    /// All cameras currently accessible.
    fn cameras(&self) -> Result<Vec<CameraInfo>, CameraError>;

    /// Look a camera up by id.
    fn camera_by_id(&self, id: &str) -> Result<CameraInfo, CameraError> {
        self.cameras()?
            .into_iter()
            .find(|c| c.id == id)
            .ok_or_else(|| CameraError::NotFound(id.to_string()))
    }

    /// Open an exclusive session. The device is released when the session drops.
    fn open(&self, camera: &CameraInfo) -> Result<Box<dyn CameraSession + '_>, CameraError>;
}

/// An open camera.
pub trait CameraSession {
    fn info(&self) -> &CameraInfo;

    fn pixel_format(&self) -> Result<PixelFormat, CameraError>;

    /// Negotiate the GigE streaming packet size.
    ///
    /// Returns `Ok(false)` when the transport has no such feature.
    fn adjust_packet_size(&mut self) -> Result<bool, CameraError> {
        Ok(false)
    }

    /// Grab a single frame, waiting at most `timeout`.
    fn capture_frame(&mut self, timeout: Duration) -> Result<CapturedFrame, CameraError>;
}

/// A frame together with its local capture time.
#[derive(Clone, Debug)]
pub struct Capture {
    pub frame: CapturedFrame,
    pub timestamp: NaiveDateTime,
}

/// Pick the camera with `id`, or the first one found when `id` is `None`.
pub fn select_camera(
    system: &dyn CameraSystem,
    id: Option<&str>,
) -> Result<CameraInfo, CameraError> {
    match id {
        Some(id) => system.camera_by_id(id),
        None => system
            .cameras()?
            .into_iter()
            .next()
            .ok_or(CameraError::NoCameras),
    }
}

/// Best-effort session setup. Packet-size failures are logged, not fatal.
pub fn setup_camera(session: &mut dyn CameraSession) {
    match session.adjust_packet_size() {
        Ok(true) => log::info!("adjusted GigE packet size on '{}'", session.info().id),
        Ok(false) => log::debug!(
            "packet size adjustment not available on '{}' ({})",
            session.info().id,
            session.info().transport
        ),
        Err(e) => log::warn!("packet size adjustment failed: {e}"),
    }
}

/// Capture one frame and stamp it with the local time.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(session), fields(camera = %session.info().id))
)]
pub fn capture(session: &mut dyn CameraSession, timeout: Duration) -> Result<Capture, CameraError> {
    let frame = session.capture_frame(timeout)?;
    let timestamp = Local::now().naive_local();
    log::info!(
        "got frame from {}: {}x{} {}",
        frame.camera_name,
        frame.width,
        frame.height,
        frame.pixel_format
    );
    Ok(Capture { frame, timestamp })
}
