//! In-memory signature model: one audio window's peaks filed by band.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::band::FrequencyBand;
use super::peak::FrequencyPeak;

/// Sample rates the signature format can describe.
///
/// The discriminant is the id written into the header's sample-rate field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum SampleRate {
    Hz8000 = 1,
    #[default]
    Hz16000 = 3,
    Hz32000 = 4,
    Hz44100 = 5,
    Hz48000 = 6,
}

impl SampleRate {
    pub fn from_hz(hz: u32) -> Option<Self> {
        match hz {
            8000 => Some(Self::Hz8000),
            16000 => Some(Self::Hz16000),
            32000 => Some(Self::Hz32000),
            44100 => Some(Self::Hz44100),
            48000 => Some(Self::Hz48000),
            _ => None,
        }
    }

    pub fn from_wire_id(id: u32) -> Option<Self> {
        match id {
            1 => Some(Self::Hz8000),
            3 => Some(Self::Hz16000),
            4 => Some(Self::Hz32000),
            5 => Some(Self::Hz44100),
            6 => Some(Self::Hz48000),
            _ => None,
        }
    }

    pub fn hz(self) -> u32 {
        match self {
            Self::Hz8000 => 8000,
            Self::Hz16000 => 16000,
            Self::Hz32000 => 32000,
            Self::Hz44100 => 44100,
            Self::Hz48000 => 48000,
        }
    }

    pub fn wire_id(self) -> u32 {
        self as u32
    }
}

impl fmt::Display for SampleRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Hz", self.hz())
    }
}

/// Fingerprint of a single audio window.
///
/// Only bands holding at least one peak have an entry in `peaks_by_band`.
/// Peaks inside a band are kept in the order they were pushed, which the
/// encoder expects to be non-decreasing in `pass`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Signature {
    pub sample_rate: SampleRate,
    pub sample_count: u32,
    pub peaks_by_band: BTreeMap<FrequencyBand, Vec<FrequencyPeak>>,
}

impl Signature {
    pub fn new(sample_rate: SampleRate, sample_count: u32) -> Self {
        Self {
            sample_rate,
            sample_count,
            peaks_by_band: BTreeMap::new(),
        }
    }

    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate.hz()
    }

    pub fn push_peak(&mut self, band: FrequencyBand, peak: FrequencyPeak) {
        self.peaks_by_band.entry(band).or_default().push(peak);
    }

    pub fn peaks(&self, band: FrequencyBand) -> &[FrequencyPeak] {
        self.peaks_by_band
            .get(&band)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn peak_count(&self) -> usize {
        self.peaks_by_band.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.peak_count() == 0
    }

    /// Audio length covered by the signature, in whole milliseconds.
    pub fn duration_ms(&self) -> u64 {
        self.sample_count as u64 * 1000 / self.sample_rate_hz() as u64
    }
}
