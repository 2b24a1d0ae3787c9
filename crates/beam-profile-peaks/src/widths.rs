use serde::{Deserialize, Serialize};

use crate::find_peaks::{check_interior, peak_prominences};
use crate::ProfileError;

/// Width of a peak at a height relative to its prominence.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PeakWidth {
    /// `right_ip - left_ip`, in samples.
    pub width: f64,
    /// Signal level at which the width was evaluated.
    pub width_height: f64,
    /// Interpolated left crossing position.
    pub left_ip: f64,
    /// Interpolated right crossing position.
    pub right_ip: f64,
}

/// Width of every peak in `peaks` at `x[peak] - rel_height * prominence`.
///
/// From the peak, the signal is walked outwards (never past the peak's
/// bases) until it drops to the evaluation height; the crossing is then
/// linearly interpolated between neighbouring samples. `rel_height = 0.5`
/// gives the full width at half prominence.
pub fn peak_widths(
    x: &[f64],
    peaks: &[usize],
    rel_height: f64,
) -> Result<Vec<PeakWidth>, ProfileError> {
    if !rel_height.is_finite() || rel_height < 0.0 {
        return Err(ProfileError::InvalidRelHeight(rel_height));
    }
    for &p in peaks {
        check_interior(x, p)?;
    }
    let prominences = peak_prominences(x, peaks)?;

    let widths = peaks
        .iter()
        .zip(&prominences)
        .map(|(&peak, prom)| {
            let height = x[peak] - prom.prominence * rel_height;

            let mut i = peak;
            while prom.left_base < i && height < x[i] {
                i -= 1;
            }
            let mut left_ip = i as f64;
            if x[i] < height {
                left_ip += (height - x[i]) / (x[i + 1] - x[i]);
            }

            let mut i = peak;
            while i < prom.right_base && height < x[i] {
                i += 1;
            }
            let mut right_ip = i as f64;
            if x[i] < height {
                right_ip -= (height - x[i]) / (x[i - 1] - x[i]);
            }

            let width = right_ip - left_ip;
            if width == 0.0 {
                log::warn!("peak at sample {peak} has a width of 0");
            }
            PeakWidth {
                width,
                width_height: height,
                left_ip,
                right_ip,
            }
        })
        .collect();
    Ok(widths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn width_on_sample_boundaries() {
        let x = [0.0, 1.0, 2.0, 3.0, 4.0, 3.0, 2.0, 1.0, 0.0];
        let w = peak_widths(&x, &[4], 0.5).unwrap();
        assert_relative_eq!(w[0].width_height, 2.0);
        assert_relative_eq!(w[0].left_ip, 2.0);
        assert_relative_eq!(w[0].right_ip, 6.0);
        assert_relative_eq!(w[0].width, 4.0);
    }

    #[test]
    fn width_interpolates_between_samples() {
        let x = [0.0, 2.0, 8.0, 2.0, 0.0];
        let w = peak_widths(&x, &[2], 0.5).unwrap();
        assert_relative_eq!(w[0].width_height, 4.0);
        assert_relative_eq!(w[0].left_ip, 1.0 + 2.0 / 6.0, epsilon = 1e-12);
        assert_relative_eq!(w[0].right_ip, 3.0 - 2.0 / 6.0, epsilon = 1e-12);
        assert_relative_eq!(w[0].width, 4.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn height_is_relative_to_higher_base() {
        // left base 0, right base 4; prominence measured from 4.0
        let x = [0.0, 6.0, 10.0, 6.0, 4.0, 9.0, 12.0, 0.0];
        let w = peak_widths(&x, &[2], 0.5).unwrap();
        assert_relative_eq!(w[0].width_height, 7.0);
        assert_relative_eq!(w[0].left_ip, 1.25);
        assert_relative_eq!(w[0].right_ip, 2.75);
    }

    #[test]
    fn empty_peak_set_gives_empty_widths() {
        let x = [0.0, 1.0, 0.0];
        assert!(peak_widths(&x, &[], 0.5).unwrap().is_empty());
    }

    #[test]
    fn rejects_negative_rel_height() {
        let x = [0.0, 1.0, 0.0];
        assert_eq!(
            peak_widths(&x, &[1], -0.1).unwrap_err(),
            ProfileError::InvalidRelHeight(-0.1)
        );
    }
}
