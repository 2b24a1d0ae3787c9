//! Camera access and frame persistence for single-shot acquisition.
//!
//! The vendor SDK is modelled by two traits:
//! - [`CameraSystem`] enumerates cameras and opens sessions,
//! - [`CameraSession`] is an open, exclusively held camera. Dropping the
//!   session releases the device, whatever path the caller leaves by.
//!
//! Two backends ship with the crate: [`SimulatedCameraSystem`] renders a
//! synthetic beam, [`ImageFileCameraSystem`] replays image files. A real SDK
//! binding implements the same traits.
//!
//! Frames are persisted as one `.npy` array per capture, named
//! `manta-frame_<pixel format>_<YYYY-MM-DDTHH-MM-SS>.npy`.

mod error;
mod image_files;
mod persist;
mod simulated;
mod system;

pub use error::CameraError;
pub use image_files::ImageFileCameraSystem;
pub use persist::{
    frame_file_name, load_frame, save_frame, PersistError, FRAME_FILE_EXTENSION,
    FRAME_FILE_PREFIX, TIMESTAMP_FORMAT,
};
pub use simulated::{BeamSpec, SimulatedCamera, SimulatedCameraSystem};
pub use system::{
    capture, select_camera, setup_camera, CameraInfo, CameraSession, CameraSystem, Capture,
    Transport, DEFAULT_CAPTURE_TIMEOUT,
};
