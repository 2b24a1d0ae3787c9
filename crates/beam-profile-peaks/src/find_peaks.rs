//! Local maxima and topographic prominence on 1D signals.

use serde::{Deserialize, Serialize};

use crate::ProfileError;

/// A local maximum, possibly a flat plateau.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalMaximum {
    /// Plateau midpoint (rounded down).
    pub index: usize,
    pub left_edge: usize,
    pub right_edge: usize,
}

/// Prominence of one peak and the bases it was measured against.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Prominence {
    pub prominence: f64,
    pub left_base: usize,
    pub right_base: usize,
}

/// Detected peak with its diagnostic properties.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    pub index: usize,
    /// Signal value at `index`.
    pub height: f64,
    pub prominence: f64,
    pub left_base: usize,
    pub right_base: usize,
    pub left_edge: usize,
    pub right_edge: usize,
}

impl Peak {
    /// Number of samples in the peak's plateau (1 for a sharp peak).
    pub fn plateau_size(&self) -> usize {
        self.right_edge - self.left_edge + 1
    }
}

/// Find all local maxima of `x`.
///
/// A sample is a maximum when it is strictly larger than its left
/// neighbour and, after skipping samples of equal value, strictly larger
/// than the next differing sample on the right. The first and last samples
/// are never maxima.
pub fn local_maxima(x: &[f64]) -> Vec<LocalMaximum> {
    let mut out = Vec::new();
    if x.len() < 3 {
        return out;
    }

    let i_max = x.len() - 1;
    let mut i = 1;
    while i < i_max {
        if x[i - 1] < x[i] {
            let mut ahead = i + 1;
            while ahead < i_max && x[ahead] == x[i] {
                ahead += 1;
            }
            if x[ahead] < x[i] {
                let left_edge = i;
                let right_edge = ahead - 1;
                out.push(LocalMaximum {
                    index: (left_edge + right_edge) / 2,
                    left_edge,
                    right_edge,
                });
                // nothing before `ahead` can be a maximum
                i = ahead;
            }
        }
        i += 1;
    }
    out
}

/// Prominence of every peak in `peaks`.
///
/// From each peak the signal is walked outwards while it stays at or below
/// the peak value; the lowest sample seen on each side is that side's base.
/// The prominence is the peak value minus the higher of the two bases.
pub fn peak_prominences(x: &[f64], peaks: &[usize]) -> Result<Vec<Prominence>, ProfileError> {
    peaks
        .iter()
        .map(|&peak| {
            check_interior(x, peak)?;
            Ok(prominence_at(x, peak))
        })
        .collect()
}

/// Find peaks whose prominence is at least `prominence_min`.
///
/// No other criteria (distance, width, height) are applied.
pub fn find_peaks(x: &[f64], prominence_min: f64) -> Vec<Peak> {
    local_maxima(x)
        .into_iter()
        .filter_map(|m| {
            let p = prominence_at(x, m.index);
            (p.prominence >= prominence_min).then_some(Peak {
                index: m.index,
                height: x[m.index],
                prominence: p.prominence,
                left_base: p.left_base,
                right_base: p.right_base,
                left_edge: m.left_edge,
                right_edge: m.right_edge,
            })
        })
        .collect()
}

pub(crate) fn check_interior(x: &[f64], peak: usize) -> Result<(), ProfileError> {
    if peak == 0 || peak + 1 >= x.len() {
        return Err(ProfileError::PeakOutOfRange {
            index: peak,
            len: x.len(),
        });
    }
    Ok(())
}

fn prominence_at(x: &[f64], peak: usize) -> Prominence {
    let top = x[peak];

    let mut left_base = peak;
    let mut left_min = top;
    let mut i = peak;
    loop {
        if x[i] > top {
            break;
        }
        if x[i] < left_min {
            left_min = x[i];
            left_base = i;
        }
        if i == 0 {
            break;
        }
        i -= 1;
    }

    let mut right_base = peak;
    let mut right_min = top;
    for (j, &v) in x.iter().enumerate().skip(peak) {
        if v > top {
            break;
        }
        if v < right_min {
            right_min = v;
            right_base = j;
        }
    }

    Prominence {
        prominence: top - left_min.max(right_min),
        left_base,
        right_base,
    }
}
