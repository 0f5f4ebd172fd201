use serde::Serialize;

use super::constants::{
    AMPLITUDE_SCALE, BIN_TO_HZ_DIVISOR, MAGNITUDE_OFFSET, MAGNITUDE_SCALE, PASS_HOP,
};

/// A single spectral peak as stored in a signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct FrequencyPeak {
    /// FFT pass (time slice) the peak was found in.
    pub pass: u32,
    /// Quantized log-energy of the peak.
    pub magnitude: u16,
    /// Corrected FFT bin, in 1/64 bin units of a 1024-point half spectrum.
    pub corrected_bin: u16,
    /// Always the owning signature's sample rate.
    pub sample_rate_hz: u32,
}

impl FrequencyPeak {
    pub fn new(pass: u32, magnitude: u16, corrected_bin: u16, sample_rate_hz: u32) -> Self {
        Self {
            pass,
            magnitude,
            corrected_bin,
            sample_rate_hz,
        }
    }

    pub fn frequency_hz(&self) -> f64 {
        self.corrected_bin as f64 * (self.sample_rate_hz as f64 / BIN_TO_HZ_DIVISOR)
    }

    /// Linear PCM amplitude recovered from the log-scale magnitude.
    pub fn amplitude_pcm(&self) -> f64 {
        let energy = ((self.magnitude as f64 - MAGNITUDE_OFFSET) / MAGNITUDE_SCALE).exp();
        (energy * AMPLITUDE_SCALE / 2.0).sqrt() / 1024.0
    }

    pub fn seconds(&self) -> f64 {
        (self.pass as f64 * PASS_HOP as f64) / self.sample_rate_hz as f64
    }
}
