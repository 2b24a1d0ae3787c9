use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::FrameView;

/// Half-open rectangular region of interest, `[row_min, row_max, col_min, col_max]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[usize; 4]", into = "[usize; 4]")]
pub struct Roi {
    pub row_min: usize,
    pub row_max: usize,
    pub col_min: usize,
    pub col_max: usize,
}

/// ROI validation errors.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RoiError {
    #[error("ROI {roi} is empty (row_min < row_max and col_min < col_max required)")]
    Empty { roi: Roi },
    #[error("ROI {roi} exceeds frame bounds ({rows} rows x {cols} cols)")]
    OutOfBounds { roi: Roi, rows: usize, cols: usize },
}

impl Roi {
    pub fn new(row_min: usize, row_max: usize, col_min: usize, col_max: usize) -> Self {
        Self {
            row_min,
            row_max,
            col_min,
            col_max,
        }
    }

    /// ROI covering the whole frame.
    pub fn full(view: &FrameView<'_>) -> Self {
        Self::new(0, view.height, 0, view.width)
    }

    /// Single-row horizontal line at `row`, spanning all columns.
    pub fn row_line(view: &FrameView<'_>, row: usize) -> Self {
        Self::new(row, row + 1, 0, view.width)
    }

    pub fn rows(&self) -> Range<usize> {
        self.row_min..self.row_max
    }

    pub fn cols(&self) -> Range<usize> {
        self.col_min..self.col_max
    }

    pub fn height(&self) -> usize {
        self.row_max.saturating_sub(self.row_min)
    }

    pub fn width(&self) -> usize {
        self.col_max.saturating_sub(self.col_min)
    }

    /// Check `0 <= row_min < row_max <= rows` and `0 <= col_min < col_max <= cols`.
    pub fn validate(&self, rows: usize, cols: usize) -> Result<(), RoiError> {
        if self.row_min >= self.row_max || self.col_min >= self.col_max {
            return Err(RoiError::Empty { roi: *self });
        }
        if self.row_max > rows || self.col_max > cols {
            return Err(RoiError::OutOfBounds {
                roi: *self,
                rows,
                cols,
            });
        }
        Ok(())
    }

    pub fn validate_for(&self, view: &FrameView<'_>) -> Result<(), RoiError> {
        self.validate(view.height, view.width)
    }
}

impl From<[usize; 4]> for Roi {
    fn from(v: [usize; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<Roi> for [usize; 4] {
    fn from(r: Roi) -> Self {
        [r.row_min, r.row_max, r.col_min, r.col_max]
    }
}

impl fmt::Display for Roi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}]",
            self.row_min, self.row_max, self.col_min, self.col_max
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Frame;

    #[test]
    fn full_roi_is_valid() {
        let frame = Frame::new(5, 3, 8, vec![0; 15]).unwrap();
        let view = frame.as_view();
        let roi = Roi::full(&view);
        assert_eq!(roi, Roi::new(0, 3, 0, 5));
        assert!(roi.validate_for(&view).is_ok());
        assert_eq!((roi.height(), roi.width()), (3, 5));
    }

    #[test]
    fn rejects_empty_and_out_of_bounds() {
        assert!(matches!(
            Roi::new(2, 2, 0, 4).validate(10, 10),
            Err(RoiError::Empty { .. })
        ));
        assert!(matches!(
            Roi::new(3, 1, 0, 4).validate(10, 10),
            Err(RoiError::Empty { .. })
        ));
        assert_eq!(
            Roi::new(0, 11, 0, 4).validate(10, 10),
            Err(RoiError::OutOfBounds {
                roi: Roi::new(0, 11, 0, 4),
                rows: 10,
                cols: 10
            })
        );
    }

    #[test]
    fn serializes_as_array() {
        let roi = Roi::new(606, 607, 0, 1935);
        let json = serde_json::to_string(&roi).unwrap();
        assert_eq!(json, "[606,607,0,1935]");
        let back: Roi = serde_json::from_str(&json).unwrap();
        assert_eq!(back, roi);
    }
}
