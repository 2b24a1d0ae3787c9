//! Replays image files as camera frames.
//!
//! Every supported image in a directory is one camera whose id is the file
//! stem. 16-bit images are delivered as `Mono16`, everything else is
//! converted to 8-bit luma.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use beam_profile_core::{CapturedFrame, PixelFormat};
use image::{ColorType, DynamicImage, ImageReader};

use crate::{CameraError, CameraInfo, CameraSession, CameraSystem, Transport};

const EXTENSIONS: &[&str] = &["png", "tif", "tiff", "bmp", "pgm", "pnm"];

/// Camera system backed by a directory of images.
#[derive(Clone, Debug)]
pub struct ImageFileCameraSystem {
    dir: PathBuf,
}

impl ImageFileCameraSystem {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn image_paths(&self) -> Result<Vec<PathBuf>, CameraError> {
        let mut paths: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && has_image_extension(p))
            .collect();
        paths.sort();
        Ok(paths)
    }

    fn path_for(&self, id: &str) -> Result<PathBuf, CameraError> {
        self.image_paths()?
            .into_iter()
            .find(|p| camera_id(p) == id)
            .ok_or_else(|| CameraError::NotFound(id.to_string()))
    }
}

impl CameraSystem for ImageFileCameraSystem {
    fn cameras(&self) -> Result<Vec<CameraInfo>, CameraError> {
        Ok(self.image_paths()?.iter().map(|p| info_for(p)).collect())
    }

    fn open(&self, camera: &CameraInfo) -> Result<Box<dyn CameraSession + '_>, CameraError> {
        let path = self.path_for(&camera.id)?;
        let image = ImageReader::open(&path)?.with_guessed_format()?.decode()?;
        log::debug!(
            "opened image camera '{}' ({}x{}, {:?})",
            camera.id,
            image.width(),
            image.height(),
            image.color()
        );
        Ok(Box::new(ImageFileSession {
            info: camera.clone(),
            image,
        }))
    }
}

struct ImageFileSession {
    info: CameraInfo,
    image: DynamicImage,
}

impl ImageFileSession {
    fn is_16_bit(&self) -> bool {
        matches!(
            self.image.color(),
            ColorType::L16 | ColorType::La16 | ColorType::Rgb16 | ColorType::Rgba16
        )
    }
}

impl CameraSession for ImageFileSession {
    fn info(&self) -> &CameraInfo {
        &self.info
    }

    fn pixel_format(&self) -> Result<PixelFormat, CameraError> {
        Ok(if self.is_16_bit() {
            PixelFormat::Mono16
        } else {
            PixelFormat::Mono8
        })
    }

    fn capture_frame(&mut self, _timeout: Duration) -> Result<CapturedFrame, CameraError> {
        let width = self.image.width() as usize;
        let height = self.image.height() as usize;
        let (format, data) = if self.is_16_bit() {
            (PixelFormat::Mono16, self.image.to_luma16().into_raw())
        } else {
            let luma = self.image.to_luma8();
            (
                PixelFormat::Mono8,
                luma.as_raw().iter().map(|&v| u16::from(v)).collect(),
            )
        };
        Ok(CapturedFrame::new(
            width,
            height,
            1,
            format,
            self.info.name.clone(),
            data,
        )?)
    }
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn camera_id(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn info_for(path: &Path) -> CameraInfo {
    CameraInfo {
        id: camera_id(path),
        name: path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
        interface_id: path
            .parent()
            .map(|p| p.display().to_string())
            .unwrap_or_default(),
        transport: Transport::File,
    }
}
