use beam_profile_core::{FrameView, Roi};

use crate::ProfileError;

/// Per-column mean of `view` over the rows of `roi`.
///
/// With `invert = Some(max)` every sample `s` is taken as `max - s`, turning
/// dips into peaks. Column sums are accumulated as integers, so the result
/// is exact and does not depend on row order. The returned buffer is
/// independent of `view`.
pub fn lineout(
    view: &FrameView<'_>,
    roi: &Roi,
    invert: Option<u16>,
) -> Result<Vec<f64>, ProfileError> {
    check_view(view)?;
    roi.validate_for(view)?;

    let mut sums = vec![0u64; roi.width()];
    for y in roi.rows() {
        let row = &view.row(y)[roi.cols()];
        for (acc, &s) in sums.iter_mut().zip(row) {
            *acc += u64::from(s);
        }
    }

    let n = roi.height() as f64;
    let out = match invert {
        None => sums.iter().map(|&s| s as f64 / n).collect(),
        Some(max) => {
            let full = f64::from(max) * n;
            sums.iter().map(|&s| (full - s as f64) / n).collect()
        }
    };
    Ok(out)
}

pub(crate) fn check_view(view: &FrameView<'_>) -> Result<(), ProfileError> {
    if view.is_empty() {
        return Err(ProfileError::EmptyFrame);
    }
    let expected = view.width * view.height;
    if view.data.len() != expected {
        return Err(ProfileError::FrameBuffer {
            expected,
            got: view.data.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use beam_profile_core::{Frame, RoiError};

    fn ramp_frame() -> Frame {
        // value = 10 * row + col
        Frame::from_fn(4, 3, 8, |y, x| (10 * y + x) as u16).unwrap()
    }

    #[test]
    fn averages_columns_over_roi_rows() {
        let frame = ramp_frame();
        let view = frame.as_view();
        let out = lineout(&view, &Roi::new(1, 3, 1, 3), None).unwrap();
        assert_eq!(out, vec![16.0, 17.0]);
    }

    #[test]
    fn inverted_lineout_mirrors_samples() {
        let frame = ramp_frame();
        let view = frame.as_view();
        let out = lineout(&view, &Roi::full(&view), Some(255)).unwrap();
        assert_eq!(out, vec![245.0, 244.0, 243.0, 242.0]);
    }

    #[test]
    fn rejects_bad_roi() {
        let frame = ramp_frame();
        let view = frame.as_view();
        let err = lineout(&view, &Roi::new(0, 3, 2, 9), None).unwrap_err();
        assert!(matches!(
            err,
            ProfileError::InvalidRoi(RoiError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn rejects_empty_view() {
        let view = FrameView {
            width: 0,
            height: 0,
            bit_depth: 8,
            data: &[],
        };
        assert_eq!(
            lineout(&view, &Roi::new(0, 1, 0, 1), None).unwrap_err(),
            ProfileError::EmptyFrame
        );
    }

    #[test]
    fn rejects_short_buffer() {
        let data = [1u16, 2, 3];
        let view = FrameView {
            width: 2,
            height: 2,
            bit_depth: 8,
            data: &data,
        };
        assert_eq!(
            lineout(&view, &Roi::new(0, 1, 0, 1), None).unwrap_err(),
            ProfileError::FrameBuffer {
                expected: 4,
                got: 3
            }
        );
    }
}
