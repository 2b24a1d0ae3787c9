use serde::{Deserialize, Serialize};

use crate::PixelFormat;

/// Errors raised while building or converting frames.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("invalid frame dimensions (width={width}, height={height}, channels={channels})")]
    InvalidDimensions {
        width: usize,
        height: usize,
        channels: usize,
    },
    #[error("invalid frame buffer length (expected {expected} samples, got {got})")]
    BufferLength { expected: usize, got: usize },
    #[error("bit depth must be in 1..=16, got {0}")]
    InvalidBitDepth(u8),
    #[error("channel {channel} out of range for a {channels}-channel frame")]
    ChannelOutOfRange { channel: usize, channels: usize },
    #[error("frame has {channels} channels; select one explicitly")]
    MultiChannel { channels: usize },
}

/// Borrowed single-channel intensity grid.
#[derive(Clone, Copy, Debug)]
pub struct FrameView<'a> {
    pub width: usize,
    pub height: usize,
    /// Significant bits per sample.
    pub bit_depth: u8,
    pub data: &'a [u16], // row-major, len = w*h
}

impl<'a> FrameView<'a> {
    /// Row `y` as a slice of `width` samples.
    #[inline]
    pub fn row(&self, y: usize) -> &'a [u16] {
        let start = y * self.width;
        &self.data[start..start + self.width]
    }

    #[inline]
    pub fn get(&self, y: usize, x: usize) -> Option<u16> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.data[y * self.width + x])
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Largest value a sample can hold at this bit depth.
    pub fn max_value(&self) -> u16 {
        max_value_for_bits(self.bit_depth)
    }
}

/// Owned single-channel intensity grid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub width: usize,
    pub height: usize,
    pub bit_depth: u8,
    pub data: Vec<u16>,
}

impl Frame {
    /// Build a frame from a row-major buffer, validating its size.
    pub fn new(
        width: usize,
        height: usize,
        bit_depth: u8,
        data: Vec<u16>,
    ) -> Result<Self, FrameError> {
        check_bit_depth(bit_depth)?;
        let expected = checked_len(width, height, 1)?;
        if data.len() != expected {
            return Err(FrameError::BufferLength {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            bit_depth,
            data,
        })
    }

    /// Build an 8-bit frame from raw `u8` samples.
    pub fn from_u8(width: usize, height: usize, pixels: &[u8]) -> Result<Self, FrameError> {
        Self::new(
            width,
            height,
            8,
            pixels.iter().map(|&p| u16::from(p)).collect(),
        )
    }

    /// Build a frame by evaluating `f(row, col)` for every pixel.
    pub fn from_fn(
        width: usize,
        height: usize,
        bit_depth: u8,
        mut f: impl FnMut(usize, usize) -> u16,
    ) -> Result<Self, FrameError> {
        check_bit_depth(bit_depth)?;
        let len = checked_len(width, height, 1)?;
        let mut data = Vec::with_capacity(len);
        for y in 0..height {
            for x in 0..width {
                data.push(f(y, x));
            }
        }
        Self::new(width, height, bit_depth, data)
    }

    pub fn as_view(&self) -> FrameView<'_> {
        FrameView {
            width: self.width,
            height: self.height,
            bit_depth: self.bit_depth,
            data: &self.data,
        }
    }
}

/// Raw camera output, possibly with interleaved channels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapturedFrame {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub pixel_format: PixelFormat,
    pub camera_name: String,
    pub data: Vec<u16>, // row-major, interleaved, len = w*h*channels
}

impl CapturedFrame {
    pub fn new(
        width: usize,
        height: usize,
        channels: usize,
        pixel_format: PixelFormat,
        camera_name: impl Into<String>,
        data: Vec<u16>,
    ) -> Result<Self, FrameError> {
        let expected = checked_len(width, height, channels)?;
        if data.len() != expected {
            return Err(FrameError::BufferLength {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            pixel_format,
            camera_name: camera_name.into(),
            data,
        })
    }

    /// Convert a single-channel capture into a [`Frame`].
    ///
    /// Multi-channel captures are rejected; use [`CapturedFrame::channel`].
    pub fn into_mono(self) -> Result<Frame, FrameError> {
        if self.channels != 1 {
            return Err(FrameError::MultiChannel {
                channels: self.channels,
            });
        }
        Frame::new(
            self.width,
            self.height,
            self.pixel_format.bit_depth(),
            self.data,
        )
    }

    /// Extract one channel as a [`Frame`].
    pub fn channel(&self, channel: usize) -> Result<Frame, FrameError> {
        if channel >= self.channels {
            return Err(FrameError::ChannelOutOfRange {
                channel,
                channels: self.channels,
            });
        }
        let data = self
            .data
            .iter()
            .skip(channel)
            .step_by(self.channels)
            .copied()
            .collect();
        Frame::new(
            self.width,
            self.height,
            self.pixel_format.bit_depth(),
            data,
        )
    }
}

/// `2^bits - 1`, saturating at `u16::MAX`.
pub fn max_value_for_bits(bits: u8) -> u16 {
    if bits >= 16 {
        u16::MAX
    } else {
        (1u16 << bits) - 1
    }
}

fn check_bit_depth(bit_depth: u8) -> Result<(), FrameError> {
    if bit_depth == 0 || bit_depth > 16 {
        return Err(FrameError::InvalidBitDepth(bit_depth));
    }
    Ok(())
}

fn checked_len(width: usize, height: usize, channels: usize) -> Result<usize, FrameError> {
    let invalid = FrameError::InvalidDimensions {
        width,
        height,
        channels,
    };
    if width == 0 || height == 0 || channels == 0 {
        return Err(invalid);
    }
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(channels))
        .ok_or(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_value_per_bit_depth() {
        assert_eq!(max_value_for_bits(1), 1);
        assert_eq!(max_value_for_bits(8), 255);
        assert_eq!(max_value_for_bits(12), 4095);
        assert_eq!(max_value_for_bits(16), u16::MAX);
    }

    #[test]
    fn new_rejects_wrong_buffer_length() {
        let err = Frame::new(3, 2, 8, vec![0; 5]).unwrap_err();
        assert_eq!(
            err,
            FrameError::BufferLength {
                expected: 6,
                got: 5
            }
        );
    }

    #[test]
    fn new_rejects_empty_dimensions() {
        assert!(matches!(
            Frame::new(0, 4, 8, Vec::new()),
            Err(FrameError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn view_rows_and_pixels() {
        let frame = Frame::from_fn(4, 3, 8, |y, x| (y * 10 + x) as u16).unwrap();
        let view = frame.as_view();
        assert_eq!(view.row(1), &[10, 11, 12, 13]);
        assert_eq!(view.get(2, 3), Some(23));
        assert_eq!(view.get(3, 0), None);
        assert_eq!(view.max_value(), 255);
    }

    #[test]
    fn into_mono_requires_single_channel() {
        let cap = CapturedFrame::new(2, 1, 3, PixelFormat::Mono8, "cam", vec![1, 2, 3, 4, 5, 6])
            .unwrap();
        assert_eq!(
            cap.clone().into_mono().unwrap_err(),
            FrameError::MultiChannel { channels: 3 }
        );

        let green = cap.channel(1).unwrap();
        assert_eq!(green.data, vec![2, 5]);
        assert!(matches!(
            cap.channel(3),
            Err(FrameError::ChannelOutOfRange {
                channel: 3,
                channels: 3
            })
        ));
    }

    #[test]
    fn mono_capture_keeps_pixel_format_depth() {
        let cap =
            CapturedFrame::new(2, 2, 1, PixelFormat::Mono12, "cam", vec![0, 4095, 7, 9]).unwrap();
        let frame = cap.into_mono().unwrap();
        assert_eq!(frame.bit_depth, 12);
        assert_eq!(frame.as_view().max_value(), 4095);
    }
}
