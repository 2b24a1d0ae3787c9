//! `.npy` persistence of captured frames.

use std::fs;
use std::path::{Path, PathBuf};

use beam_profile_core::{max_value_for_bits, Frame, FrameError, PixelFormat};
use chrono::{Local, NaiveDateTime};
use ndarray::Array2;
use ndarray_npy::{read_npy, write_npy, ReadNpyError, WriteNpyError};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// `strftime` pattern of the timestamp embedded in file names.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S";

pub const FRAME_FILE_PREFIX: &str = "manta-frame";

pub const FRAME_FILE_EXTENSION: &str = "npy";

/// Errors raised while writing or reading frame files.
#[derive(thiserror::Error, Debug)]
pub enum PersistError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Write(#[from] WriteNpyError),
    #[error(transparent)]
    Read(#[from] ReadNpyError),
    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error("{path}: sample {value} does not fit the frame's {bits}-bit depth")]
    SampleOverflow {
        path: PathBuf,
        value: u16,
        bits: u8,
    },
}

/// `manta-frame_<label>_<timestamp>.npy`.
pub fn frame_file_name(label: &str, timestamp: &NaiveDateTime) -> String {
    format!(
        "{FRAME_FILE_PREFIX}_{label}_{}.{FRAME_FILE_EXTENSION}",
        timestamp.format(TIMESTAMP_FORMAT)
    )
}

/// Write `frame` into `dir` as a 2D `(rows, cols)` array.
///
/// Frames of 8 bits or fewer are stored as `u8`, deeper ones as `u16`.
/// Without a `timestamp` the save time is used and a warning is logged.
/// Returns the path of the new file.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(frame), fields(width = frame.width, height = frame.height))
)]
pub fn save_frame(
    frame: &Frame,
    dir: &Path,
    timestamp: Option<NaiveDateTime>,
    label: &str,
) -> Result<PathBuf, PersistError> {
    let timestamp = timestamp.unwrap_or_else(|| {
        log::warn!("no timestamp for frame was provided; using the time of saving");
        Local::now().naive_local()
    });

    fs::create_dir_all(dir)?;
    let path = dir.join(frame_file_name(label, &timestamp));
    let shape = (frame.height, frame.width);

    if frame.bit_depth <= 8 {
        let mut bytes = Vec::with_capacity(frame.data.len());
        for &v in &frame.data {
            let b = u8::try_from(v).map_err(|_| PersistError::SampleOverflow {
                path: path.clone(),
                value: v,
                bits: frame.bit_depth,
            })?;
            bytes.push(b);
        }
        write_npy(&path, &Array2::from_shape_vec(shape, bytes)?)?;
    } else {
        write_npy(&path, &Array2::from_shape_vec(shape, frame.data.clone())?)?;
    }

    log::info!("saved frame to {}", path.display());
    Ok(path)
}

/// Read a frame written by [`save_frame`] (or any 2D `u8`/`u16` `.npy`).
///
/// `u16` arrays take their bit depth from a `MonoNN` label in a
/// `manta-frame_<label>_<timestamp>.npy` file name, provided every sample
/// fits; otherwise they load as 16-bit.
pub fn load_frame(path: &Path) -> Result<Frame, PersistError> {
    match read_npy::<_, Array2<u8>>(path) {
        Ok(arr) => {
            let (h, w) = arr.dim();
            Ok(Frame::new(w, h, 8, arr.iter().map(|&v| u16::from(v)).collect())?)
        }
        Err(first) => match read_npy::<_, Array2<u16>>(path) {
            Ok(arr) => {
                let (h, w) = arr.dim();
                let data: Vec<u16> = arr.iter().copied().collect();
                let bits = label_bit_depth(path)
                    .filter(|&b| data.iter().all(|&v| v <= max_value_for_bits(b)))
                    .unwrap_or(16);
                Ok(Frame::new(w, h, bits, data)?)
            }
            Err(_) => Err(first.into()),
        },
    }
}

/// Bit depth of the pixel-format label embedded by [`frame_file_name`].
fn label_bit_depth(path: &Path) -> Option<u8> {
    let stem = path.file_stem()?.to_str()?;
    let rest = stem.strip_prefix(FRAME_FILE_PREFIX)?.strip_prefix('_')?;
    let (label, _timestamp) = rest.rsplit_once('_')?;
    match label.parse::<PixelFormat>().ok()? {
        PixelFormat::Other(_) => None,
        format => Some(format.bit_depth()),
    }
}
