//! Synthetic camera rendering a Gaussian beam (or absorption dip).

use std::cell::RefCell;
use std::time::Duration;

use beam_profile_core::{max_value_for_bits, CapturedFrame, PixelFormat};
use serde::{Deserialize, Serialize};

use crate::{CameraError, CameraInfo, CameraSession, CameraSystem, Transport};

/// Elliptical Gaussian spot on a flat background.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeamSpec {
    pub center_col: f64,
    pub center_row: f64,
    pub sigma_col: f64,
    pub sigma_row: f64,
    /// Peak height above (or, for a dip, depth below) the background.
    pub amplitude: f64,
    pub background: f64,
    /// Render a dark dip instead of a bright spot.
    pub absorption: bool,
}

impl Default for BeamSpec {
    fn default() -> Self {
        Self {
            center_col: 968.0,
            center_row: 608.0,
            sigma_col: 40.0,
            sigma_row: 250.0,
            amplitude: 200.0,
            background: 10.0,
            absorption: false,
        }
    }
}

impl BeamSpec {
    /// Intensity at pixel (`row`, `col`), before quantisation.
    pub fn intensity(&self, row: usize, col: usize) -> f64 {
        let dx = (col as f64 - self.center_col) / self.sigma_col;
        let dy = (row as f64 - self.center_row) / self.sigma_row;
        let g = self.amplitude * (-0.5 * (dx * dx + dy * dy)).exp();
        if self.absorption {
            self.background - g
        } else {
            self.background + g
        }
    }
}

/// One simulated device.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulatedCamera {
    pub info: CameraInfo,
    pub pixel_format: PixelFormat,
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub beam: BeamSpec,
    /// Every capture times out.
    #[serde(default)]
    pub fail_capture: bool,
}

impl SimulatedCamera {
    /// A Mono8 GigE camera with a 1936x1216 sensor and a centred beam.
    pub fn manta(id: &str) -> Self {
        Self {
            info: CameraInfo {
                id: id.to_string(),
                name: "Manta G-235B (simulated)".to_string(),
                interface_id: "SIM_GIGE_0".to_string(),
                transport: Transport::GigE,
            },
            pixel_format: PixelFormat::Mono8,
            width: 1936,
            height: 1216,
            channels: 1,
            beam: BeamSpec::default(),
            fail_capture: false,
        }
    }

    pub fn with_size(mut self, width: usize, height: usize) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_beam(mut self, beam: BeamSpec) -> Self {
        self.beam = beam;
        self
    }

    pub fn with_pixel_format(mut self, pixel_format: PixelFormat) -> Self {
        self.pixel_format = pixel_format;
        self
    }

    pub fn with_channels(mut self, channels: usize) -> Self {
        self.channels = channels;
        self
    }

    pub fn with_transport(mut self, transport: Transport) -> Self {
        self.info.transport = transport;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail_capture = true;
        self
    }

    fn render(&self) -> Result<CapturedFrame, CameraError> {
        let max = f64::from(max_value_for_bits(self.pixel_format.bit_depth()));
        let mut data = Vec::with_capacity(self.width * self.height * self.channels);
        for row in 0..self.height {
            for col in 0..self.width {
                let v = self.beam.intensity(row, col).round().clamp(0.0, max) as u16;
                data.extend(std::iter::repeat_n(v, self.channels));
            }
        }
        Ok(CapturedFrame::new(
            self.width,
            self.height,
            self.channels,
            self.pixel_format.clone(),
            self.info.name.clone(),
            data,
        )?)
    }
}

/// In-process camera system serving [`SimulatedCamera`]s.
///
/// Sessions are exclusive per camera; the system keeps track of which
/// cameras are currently open so callers can verify release.
#[derive(Debug, Default)]
pub struct SimulatedCameraSystem {
    cameras: Vec<SimulatedCamera>,
    in_use: RefCell<Vec<String>>,
}

impl SimulatedCameraSystem {
    pub fn new(cameras: Vec<SimulatedCamera>) -> Self {
        Self {
            cameras,
            in_use: RefCell::new(Vec::new()),
        }
    }

    /// A single simulated Manta with id `DEV_000F314EED0D`.
    pub fn single_manta() -> Self {
        Self::new(vec![SimulatedCamera::manta("DEV_000F314EED0D")])
    }

    /// Number of sessions currently held open.
    pub fn open_sessions(&self) -> usize {
        self.in_use.borrow().len()
    }

    fn camera(&self, id: &str) -> Result<&SimulatedCamera, CameraError> {
        self.cameras
            .iter()
            .find(|c| c.info.id == id)
            .ok_or_else(|| CameraError::NotFound(id.to_string()))
    }
}

impl CameraSystem for SimulatedCameraSystem {
    fn cameras(&self) -> Result<Vec<CameraInfo>, CameraError> {
        Ok(self.cameras.iter().map(|c| c.info.clone()).collect())
    }

    fn open(&self, camera: &CameraInfo) -> Result<Box<dyn CameraSession + '_>, CameraError> {
        let cam = self.camera(&camera.id)?;
        let mut in_use = self.in_use.borrow_mut();
        if in_use.iter().any(|id| id == &camera.id) {
            return Err(CameraError::Busy {
                camera: camera.id.clone(),
            });
        }
        in_use.push(camera.id.clone());
        log::debug!("opened simulated camera '{}'", camera.id);
        Ok(Box::new(SimulatedSession { system: self, cam }))
    }
}

struct SimulatedSession<'a> {
    system: &'a SimulatedCameraSystem,
    cam: &'a SimulatedCamera,
}

impl CameraSession for SimulatedSession<'_> {
    fn info(&self) -> &CameraInfo {
        &self.cam.info
    }

    fn pixel_format(&self) -> Result<PixelFormat, CameraError> {
        Ok(self.cam.pixel_format.clone())
    }

    fn adjust_packet_size(&mut self) -> Result<bool, CameraError> {
        Ok(self.cam.info.transport == Transport::GigE)
    }

    fn capture_frame(&mut self, timeout: Duration) -> Result<CapturedFrame, CameraError> {
        if self.cam.fail_capture {
            return Err(CameraError::Timeout {
                camera: self.cam.info.id.clone(),
                timeout_ms: timeout.as_millis(),
            });
        }
        self.cam.render()
    }
}

impl Drop for SimulatedSession<'_> {
    fn drop(&mut self) {
        self.system
            .in_use
            .borrow_mut()
            .retain(|id| id != &self.cam.info.id);
        log::debug!("released simulated camera '{}'", self.cam.info.id);
    }
}
