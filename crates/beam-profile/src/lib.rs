//! High-level facade crate for the `beam-profile-*` workspace.
//!
//! This crate provides:
//! - re-exports of the frame, profiler and camera crates,
//! - [`acquire`]: the capture → save → analyse sequence of the
//!   `manta-frame` tool as a library call,
//! - [`io`]: JSON configuration and report files.
//!
//! ## Quickstart
//!
//! ```
//! use beam_profile::acquire::{acquire, AcquireOptions};
//! use beam_profile::camera::SimulatedCameraSystem;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let dir = std::env::temp_dir().join("beam-profile-doc");
//! let system = SimulatedCameraSystem::single_manta();
//! let opts = AcquireOptions {
//!     save_dir: dir,
//!     analyze: true,
//!     ..AcquireOptions::default()
//! };
//!
//! let outcome = acquire(&system, &opts)?;
//! println!("saved {}", outcome.frame_path.display());
//! if let Some(fwhm) = outcome.analysis.as_ref().and_then(|a| a.fwhm()) {
//!     println!("FWHM = {fwhm:.2} px");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `beam_profile::core`: frames, ROI, pixel formats, logger.
//! - `beam_profile::peaks`: lineout, peak detection and `compute_fwhm`.
//! - `beam_profile::camera`: camera traits, backends, `.npy` persistence.

pub use beam_profile_camera as camera;
pub use beam_profile_core as core;
pub use beam_profile_peaks as peaks;

pub use beam_profile_core::{Frame, FrameView, PixelFormat, Roi};
pub use beam_profile_peaks::{compute_fwhm, FwhmResult, PeakProfiler, ProfileParams};

pub mod acquire;
pub mod io;
