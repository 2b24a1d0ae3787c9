//! Core types and utilities for beam profiling.
//!
//! This crate is intentionally small. It knows about intensity frames,
//! rectangular regions of interest and pixel formats, but does *not*
//! depend on any camera SDK or analysis routine.

mod frame;
mod logger;
mod pixel_format;
mod roi;

pub use frame::{max_value_for_bits, CapturedFrame, Frame, FrameError, FrameView};
pub use pixel_format::PixelFormat;
pub use roi::{Roi, RoiError};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
