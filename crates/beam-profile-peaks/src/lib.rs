//! Horizontal beam profiling: lineout, peak detection and FWHM.
//!
//! ## Quickstart
//!
//! ```
//! use beam_profile_core::{Frame, Roi};
//! use beam_profile_peaks::{compute_fwhm, ProfileParams};
//!
//! // A vertical bright stripe centred on column 32.
//! let frame = Frame::from_fn(64, 8, 8, |_, x| {
//!     let d = x as f64 - 32.0;
//!     (200.0 * (-d * d / 50.0).exp()).round() as u16
//! })
//! .unwrap();
//! let view = frame.as_view();
//!
//! let result = compute_fwhm(&view, &Roi::full(&view), &ProfileParams::default()).unwrap();
//! let fwhm = result.fwhm().expect("one peak");
//! assert!((fwhm - 11.77).abs() < 0.2);
//! ```
//!
//! Pipeline:
//! 1. Validate the frame, ROI and parameters.
//! 2. Average the ROI rows into a per-column lineout (optionally inverted so
//!    absorption dips become peaks).
//! 3. Find local maxima whose prominence reaches `prominence_min`.
//! 4. Keep the most prominent one, warning when there were several.
//! 5. Measure its width at half prominence with linear interpolation.

mod error;
mod find_peaks;
mod lineout;
mod profiler;
mod widths;

pub use error::ProfileError;
pub use find_peaks::{find_peaks, local_maxima, peak_prominences, LocalMaximum, Peak, Prominence};
pub use lineout::lineout;
pub use profiler::{
    compute_fwhm, FwhmResult, PeakProfiler, ProfileParams, SelectedPeak, DEFAULT_PROMINENCE_MIN,
    FWHM_REL_HEIGHT,
};
pub use widths::{peak_widths, PeakWidth};
