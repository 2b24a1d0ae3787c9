use beam_profile_core::{max_value_for_bits, FrameView, Roi};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::lineout::{check_view, lineout};
use crate::{find_peaks, peak_widths, Peak, PeakWidth, ProfileError};

/// Default minimum prominence, tuned for an 8-bit dynamic range.
pub const DEFAULT_PROMINENCE_MIN: f64 = 25.0;

/// Relative height used for full width at half maximum.
pub const FWHM_REL_HEIGHT: f64 = 0.5;

/// Parameters for [`PeakProfiler`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileParams {
    /// Minimum prominence a local maximum needs to count as a peak.
    pub prominence_min: f64,
    /// Bits per pixel; only used when `invert` is set.
    pub pixbit: u8,
    /// Replace each sample `s` by `2^pixbit - 1 - s` (dips become peaks).
    pub invert: bool,
}

impl Default for ProfileParams {
    fn default() -> Self {
        Self {
            prominence_min: DEFAULT_PROMINENCE_MIN,
            pixbit: 8,
            invert: false,
        }
    }
}

impl ProfileParams {
    pub fn validate(&self) -> Result<(), ProfileError> {
        if !self.prominence_min.is_finite() || self.prominence_min <= 0.0 {
            return Err(ProfileError::InvalidProminence(self.prominence_min));
        }
        if self.pixbit == 0 || self.pixbit > 16 {
            return Err(ProfileError::InvalidBitDepth(self.pixbit));
        }
        Ok(())
    }

    /// `2^pixbit - 1`.
    pub fn max_value(&self) -> u16 {
        max_value_for_bits(self.pixbit)
    }
}

/// The peak used for the width measurement.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectedPeak {
    pub peak: Peak,
    pub width: PeakWidth,
}

/// Output of one profiling pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FwhmResult {
    pub roi: Roi,
    /// Row-averaged intensity per ROI column (inverted if requested).
    pub lineout: Vec<f64>,
    /// Every peak that passed the prominence threshold, before selection.
    pub candidates: Vec<Peak>,
    /// Most prominent candidate with its half-prominence width.
    ///
    /// `None` when no local maximum reached `prominence_min`.
    pub selected: Option<SelectedPeak>,
    /// More than one candidate was found; only the most prominent is measured.
    pub multiple_peaks: bool,
}

impl FwhmResult {
    /// Full width at half prominence of the selected peak, in columns.
    pub fn fwhm(&self) -> Option<f64> {
        self.selected.map(|s| s.width.width)
    }

    /// Selected peak position in ROI-local columns.
    pub fn peak_index(&self) -> Option<usize> {
        self.selected.map(|s| s.peak.index)
    }

    /// Selected peak position in frame columns.
    pub fn peak_column(&self) -> Option<usize> {
        self.peak_index().map(|i| i + self.roi.col_min)
    }

    /// Interpolated half-height crossings in frame columns.
    pub fn crossing_columns(&self) -> Option<(f64, f64)> {
        let offset = self.roi.col_min as f64;
        self.selected
            .map(|s| (s.width.left_ip + offset, s.width.right_ip + offset))
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_none()
    }
}

/// Finds the most prominent horizontal peak in a frame and measures its FWHM.
///
/// Stateless: the same inputs always produce identical results.
#[derive(Clone, Debug)]
pub struct PeakProfiler {
    params: ProfileParams,
}

impl PeakProfiler {
    /// Validate `params` and build a profiler.
    pub fn new(params: ProfileParams) -> Result<Self, ProfileError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &ProfileParams {
        &self.params
    }

    /// Run lineout, peak detection, selection and width measurement on `roi`.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip(self, view),
            fields(width = view.width, height = view.height, roi = %roi)
        )
    )]
    pub fn profile(&self, view: &FrameView<'_>, roi: &Roi) -> Result<FwhmResult, ProfileError> {
        check_view(view)?;
        roi.validate_for(view)?;

        let invert = self.params.invert.then(|| self.params.max_value());
        let lineout = lineout(view, roi, invert)?;

        let candidates = find_peaks(&lineout, self.params.prominence_min);
        log::debug!(
            "lineout over ROI {roi}: {} columns, {} peak candidate(s)",
            lineout.len(),
            candidates.len()
        );

        let multiple_peaks = candidates.len() > 1;
        let Some(best) = most_prominent(&candidates) else {
            log::info!(
                "no peak with prominence >= {} in ROI {roi}",
                self.params.prominence_min
            );
            return Ok(FwhmResult {
                roi: *roi,
                lineout,
                candidates,
                selected: None,
                multiple_peaks,
            });
        };

        if multiple_peaks {
            log::warn!(
                "multiple peaks detected ({}); only the most prominent (column {}, prominence {:.2}) is used for the FWHM",
                candidates.len(),
                best.index + roi.col_min,
                best.prominence
            );
            log::warn!(
                "this is usually fine; raise prominence_min above {} if the extra peaks are noise",
                self.params.prominence_min
            );
        }

        let widths = peak_widths(&lineout, &[best.index], FWHM_REL_HEIGHT)?;
        let selected = widths.first().map(|&width| SelectedPeak { peak: best, width });

        Ok(FwhmResult {
            roi: *roi,
            lineout,
            candidates,
            selected,
            multiple_peaks,
        })
    }
}

/// Profile `view` over `roi` in one call.
pub fn compute_fwhm(
    view: &FrameView<'_>,
    roi: &Roi,
    params: &ProfileParams,
) -> Result<FwhmResult, ProfileError> {
    PeakProfiler::new(*params)?.profile(view, roi)
}

/// First candidate with the largest prominence.
fn most_prominent(candidates: &[Peak]) -> Option<Peak> {
    let mut best: Option<Peak> = None;
    for &p in candidates {
        if best.is_none_or(|b| p.prominence > b.prominence) {
            best = Some(p);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use beam_profile_core::Frame;

    fn gaussian(x: f64, center: f64, sigma: f64, amp: f64) -> f64 {
        let d = x - center;
        amp * (-d * d / (2.0 * sigma * sigma)).exp()
    }

    /// Frame whose every row is the same `profile(col)`.
    fn stripe_frame(width: usize, height: usize, bits: u8, profile: impl Fn(f64) -> f64) -> Frame {
        Frame::from_fn(width, height, bits, |_, x| profile(x as f64).round() as u16).unwrap()
    }

    fn peak(index: usize, prominence: f64) -> Peak {
        Peak {
            index,
            height: prominence,
            prominence,
            left_base: 0,
            right_base: 0,
            left_edge: index,
            right_edge: index,
        }
    }

    #[test]
    fn default_params() {
        let p = ProfileParams::default();
        assert_relative_eq!(p.prominence_min, 25.0);
        assert_eq!(p.pixbit, 8);
        assert!(!p.invert);
        assert_eq!(p.max_value(), 255);
    }

    #[test]
    fn rejects_invalid_params() {
        let bad_prom = ProfileParams {
            prominence_min: 0.0,
            ..ProfileParams::default()
        };
        assert_eq!(
            PeakProfiler::new(bad_prom).unwrap_err(),
            ProfileError::InvalidProminence(0.0)
        );

        let nan_prom = ProfileParams {
            prominence_min: f64::NAN,
            ..ProfileParams::default()
        };
        assert!(matches!(
            PeakProfiler::new(nan_prom),
            Err(ProfileError::InvalidProminence(_))
        ));

        let bad_bits = ProfileParams {
            pixbit: 17,
            ..ProfileParams::default()
        };
        assert_eq!(
            PeakProfiler::new(bad_bits).unwrap_err(),
            ProfileError::InvalidBitDepth(17)
        );
    }

    #[test]
    fn selection_keeps_first_of_equal_prominences() {
        let c = [peak(3, 10.0), peak(8, 30.0), peak(12, 30.0), peak(20, 5.0)];
        assert_eq!(most_prominent(&c).map(|p| p.index), Some(8));
        assert_eq!(most_prominent(&[]), None);
    }

    #[test]
    fn gaussian_stripe_fwhm() {
        let sigma = 6.0;
        let frame = stripe_frame(128, 4, 8, |x| gaussian(x, 64.0, sigma, 220.0));
        let view = frame.as_view();

        let res = compute_fwhm(&view, &Roi::full(&view), &ProfileParams::default()).unwrap();
        let expected = 2.0 * (2.0 * std::f64::consts::LN_2).sqrt() * sigma;
        assert_relative_eq!(res.fwhm().unwrap(), expected, epsilon = 0.1);
        assert_eq!(res.peak_column(), Some(64));
        assert!(!res.multiple_peaks);
        assert_eq!(res.candidates.len(), 1);
    }

    #[test]
    fn crossing_columns_are_frame_absolute() {
        let frame = stripe_frame(200, 2, 8, |x| gaussian(x, 120.0, 5.0, 200.0));
        let view = frame.as_view();
        let roi = Roi::new(0, 2, 80, 180);

        let res = compute_fwhm(&view, &roi, &ProfileParams::default()).unwrap();
        assert_eq!(res.peak_index(), Some(40));
        assert_eq!(res.peak_column(), Some(120));
        let (l, r) = res.crossing_columns().unwrap();
        assert!(l < 120.0 && r > 120.0);
        assert_relative_eq!(0.5 * (l + r), 120.0, epsilon = 1e-9);
    }

    #[test]
    fn no_peak_is_an_empty_result() {
        let frame = stripe_frame(64, 3, 8, |_| 100.0);
        let view = frame.as_view();
        let res = compute_fwhm(&view, &Roi::full(&view), &ProfileParams::default()).unwrap();
        assert!(res.is_empty());
        assert!(res.candidates.is_empty());
        assert_eq!(res.fwhm(), None);
        assert_eq!(res.lineout, vec![100.0; 64]);
    }

    #[test]
    fn weak_bump_below_threshold_is_ignored() {
        let frame = stripe_frame(64, 3, 8, |x| 50.0 + gaussian(x, 32.0, 4.0, 20.0));
        let view = frame.as_view();
        let res = compute_fwhm(&view, &Roi::full(&view), &ProfileParams::default()).unwrap();
        assert!(res.is_empty());

        let sensitive = ProfileParams {
            prominence_min: 10.0,
            ..ProfileParams::default()
        };
        let res = compute_fwhm(&view, &Roi::full(&view), &sensitive).unwrap();
        assert_eq!(res.peak_column(), Some(32));
    }

    #[test]
    fn invalid_roi_is_rejected_before_analysis() {
        let frame = stripe_frame(16, 4, 8, |_| 0.0);
        let view = frame.as_view();
        let err = compute_fwhm(&view, &Roi::new(0, 5, 0, 16), &ProfileParams::default())
            .unwrap_err();
        assert!(matches!(err, ProfileError::InvalidRoi(_)));
    }

    #[test]
    fn params_and_result_serialize() {
        let params: ProfileParams = serde_json::from_str(r#"{"invert": true}"#).unwrap();
        assert!(params.invert);
        assert_relative_eq!(params.prominence_min, DEFAULT_PROMINENCE_MIN);

        let frame = stripe_frame(40, 2, 8, |x| gaussian(x, 20.0, 3.0, 150.0));
        let view = frame.as_view();
        let res = compute_fwhm(&view, &Roi::full(&view), &ProfileParams::default()).unwrap();
        let json = serde_json::to_value(&res).unwrap();
        assert_eq!(json["roi"], serde_json::json!([0, 2, 0, 40]));
        assert_eq!(json["selected"]["peak"]["index"], 20);
    }
}
