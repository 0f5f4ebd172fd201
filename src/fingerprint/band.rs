use serde::Serialize;

use super::constants::{HIGH_BAND_MAX_HZ, LOW_BAND_MAX_HZ, MID_BAND_MAX_HZ};

/// One of the four fixed frequency bands a peak is filed under.
///
/// The discriminant is the value written into the TLV record id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum FrequencyBand {
    Low = 0,
    Mid = 1,
    High = 2,
    VeryHigh = 3,
}

impl FrequencyBand {
    pub const ALL: [FrequencyBand; 4] = [Self::Low, Self::Mid, Self::High, Self::VeryHigh];

    /// Classify a frequency in Hz. Each band is closed below its upper edge.
    pub fn classify(frequency_hz: f64) -> Self {
        if frequency_hz < LOW_BAND_MAX_HZ {
            Self::Low
        } else if frequency_hz < MID_BAND_MAX_HZ {
            Self::Mid
        } else if frequency_hz < HIGH_BAND_MAX_HZ {
            Self::High
        } else {
            Self::VeryHigh
        }
    }

    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Low),
            1 => Some(Self::Mid),
            2 => Some(Self::High),
            3 => Some(Self::VeryHigh),
            _ => None,
        }
    }

    pub fn as_u32(self) -> u32 {
        self as u32
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Mid => "mid",
            Self::High => "high",
            Self::VeryHigh => "very-high",
        }
    }
}
