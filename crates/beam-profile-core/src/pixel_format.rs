use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Camera pixel format, as reported by the SDK.
///
/// Only monochrome formats carry a known bit depth; anything else is kept
/// verbatim and treated as 8-bit.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum PixelFormat {
    Mono8,
    Mono10,
    Mono12,
    Mono14,
    Mono16,
    Other(String),
}

impl PixelFormat {
    /// Significant bits per sample.
    pub fn bit_depth(&self) -> u8 {
        match self {
            Self::Mono8 | Self::Other(_) => 8,
            Self::Mono10 => 10,
            Self::Mono12 => 12,
            Self::Mono14 => 14,
            Self::Mono16 => 16,
        }
    }

    /// Short label used in file names, e.g. `Mono8`.
    pub fn label(&self) -> &str {
        match self {
            Self::Mono8 => "Mono8",
            Self::Mono10 => "Mono10",
            Self::Mono12 => "Mono12",
            Self::Mono14 => "Mono14",
            Self::Mono16 => "Mono16",
            Self::Other(s) => s,
        }
    }

    /// Monochrome format for a given bit depth, if there is one.
    pub fn mono(bits: u8) -> Option<Self> {
        match bits {
            8 => Some(Self::Mono8),
            10 => Some(Self::Mono10),
            12 => Some(Self::Mono12),
            14 => Some(Self::Mono14),
            16 => Some(Self::Mono16),
            _ => None,
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PixelFormat {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Packed variants (Mono12Packed, Mono12p) unpack to the same depth.
        let trimmed = s.trim();
        let base = trimmed
            .strip_suffix("Packed")
            .or_else(|| trimmed.strip_suffix('p'))
            .unwrap_or(trimmed);
        let parsed = match base.to_ascii_lowercase().as_str() {
            "mono8" => Self::Mono8,
            "mono10" => Self::Mono10,
            "mono12" => Self::Mono12,
            "mono14" => Self::Mono14,
            "mono16" => Self::Mono16,
            _ => Self::Other(trimmed.to_string()),
        };
        Ok(parsed)
    }
}

impl From<String> for PixelFormat {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(fmt) => fmt,
            Err(never) => match never {},
        }
    }
}

impl From<PixelFormat> for String {
    fn from(fmt: PixelFormat) -> Self {
        fmt.label().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mono_formats() {
        assert_eq!("Mono8".parse::<PixelFormat>().unwrap(), PixelFormat::Mono8);
        assert_eq!(
            "Mono12Packed".parse::<PixelFormat>().unwrap(),
            PixelFormat::Mono12
        );
        assert_eq!(
            "mono16".parse::<PixelFormat>().unwrap(),
            PixelFormat::Mono16
        );
        assert_eq!(
            "BayerRG8".parse::<PixelFormat>().unwrap(),
            PixelFormat::Other("BayerRG8".to_string())
        );
    }

    #[test]
    fn labels_and_depths() {
        assert_eq!(PixelFormat::Mono12.label(), "Mono12");
        assert_eq!(PixelFormat::Mono12.bit_depth(), 12);
        assert_eq!(PixelFormat::Other("RGB8".into()).bit_depth(), 8);
        assert_eq!(PixelFormat::mono(14), Some(PixelFormat::Mono14));
        assert_eq!(PixelFormat::mono(9), None);
    }

    #[test]
    fn serializes_as_label() {
        let json = serde_json::to_string(&PixelFormat::Mono10).unwrap();
        assert_eq!(json, "\"Mono10\"");
        let back: PixelFormat = serde_json::from_str(&json).unwrap();
        assert_eq!(back, PixelFormat::Mono10);
    }
}
