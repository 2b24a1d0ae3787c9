//! JSON configuration and report helpers for the acquisition tool.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use beam_profile_camera::{
    CameraInfo, CameraSystem, ImageFileCameraSystem, SimulatedCamera, SimulatedCameraSystem,
    TIMESTAMP_FORMAT,
};
use beam_profile_peaks::FwhmResult;
use serde::{Deserialize, Serialize};

use crate::acquire::{AcquireOptions, AcquireOutcome, AnalysisSettings};

#[derive(thiserror::Error, Debug)]
pub enum ConfigIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("the images backend needs an image directory")]
    MissingImageDir,
}

/// Where frames come from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Backend {
    /// Synthetic Gaussian beam.
    #[default]
    Simulated,
    /// Image files in a directory, one camera per file.
    Images,
}

fn default_save_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_timeout_ms() -> u64 {
    2000
}

/// Configuration of one acquisition run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionConfig {
    #[serde(default)]
    pub backend: Backend,
    #[serde(default)]
    pub image_dir: Option<PathBuf>,
    /// Simulated cameras; a single Manta when empty.
    #[serde(default)]
    pub cameras: Vec<SimulatedCamera>,
    #[serde(default)]
    pub camera_id: Option<String>,
    #[serde(default = "default_save_dir")]
    pub save_dir: PathBuf,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub channel: Option<usize>,
    #[serde(default)]
    pub analyze: bool,
    #[serde(default)]
    pub analysis: AnalysisSettings,
    #[serde(default)]
    pub report_path: Option<PathBuf>,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            image_dir: None,
            cameras: Vec::new(),
            camera_id: None,
            save_dir: default_save_dir(),
            timeout_ms: default_timeout_ms(),
            channel: None,
            analyze: false,
            analysis: AnalysisSettings::default(),
            report_path: None,
        }
    }
}

impl AcquisitionConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Options for [`crate::acquire::acquire`].
    pub fn to_options(&self) -> AcquireOptions {
        AcquireOptions {
            camera_id: self.camera_id.clone(),
            save_dir: self.save_dir.clone(),
            timeout: Duration::from_millis(self.timeout_ms),
            channel: self.channel,
            analyze: self.analyze,
            analysis: self.analysis,
        }
    }

    /// Instantiate the configured camera backend.
    pub fn build_system(&self) -> Result<Box<dyn CameraSystem>, ConfigError> {
        match self.backend {
            Backend::Simulated if self.cameras.is_empty() => {
                Ok(Box::new(SimulatedCameraSystem::single_manta()))
            }
            Backend::Simulated => Ok(Box::new(SimulatedCameraSystem::new(self.cameras.clone()))),
            Backend::Images => {
                let dir = self.image_dir.as_ref().ok_or(ConfigError::MissingImageDir)?;
                Ok(Box::new(ImageFileCameraSystem::new(dir.clone())))
            }
        }
    }
}

/// Machine-readable summary of one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionReport {
    pub camera: Option<CameraInfo>,
    pub pixel_format: Option<String>,
    /// Capture time, formatted like the frame file name.
    pub timestamp: Option<String>,
    pub frame_path: Option<PathBuf>,
    pub frame_width: Option<usize>,
    pub frame_height: Option<usize>,
    pub analysis: Option<FwhmResult>,
    pub error: Option<String>,
}

impl AcquisitionReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_outcome(outcome: &AcquireOutcome) -> Self {
        Self {
            camera: Some(outcome.camera.clone()),
            pixel_format: Some(outcome.pixel_format.to_string()),
            timestamp: Some(outcome.timestamp.format(TIMESTAMP_FORMAT).to_string()),
            frame_path: Some(outcome.frame_path.clone()),
            frame_width: Some(outcome.frame.width),
            frame_height: Some(outcome.frame.height),
            analysis: outcome.analysis.clone(),
            error: None,
        }
    }

    pub fn set_error(&mut self, err: impl ToString) {
        self.error = Some(err.to_string());
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
