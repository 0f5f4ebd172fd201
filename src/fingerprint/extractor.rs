//! Spectral peak extraction from 16-bit PCM.
//!
//! The whole window goes through one FFT. Strict local maxima of the
//! magnitude spectrum above a noise floor become peaks, are scaled onto the
//! signature's bin and pass grid, and are filed into frequency bands.

use rustfft::{num_complex::Complex, FftPlanner};

use super::band::FrequencyBand;
use super::constants::{DEFAULT_MIN_MAGNITUDE, HOP_SIZE, PCM_FULL_SCALE, WINDOW_SIZE};
use super::error::{Result, SignatureError};
use super::peak::FrequencyPeak;
use super::signature::{SampleRate, Signature};

/// A peak in FFT coordinates, before it is stored in a signature.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpectralPeak {
    /// Frequency used for band classification.
    pub frequency: f64,
    pub frequency_bin: u64,
    pub magnitude: f64,
    pub time_index: usize,
}

#[derive(Clone, Copy, Debug)]
pub struct PeakExtractor {
    sample_rate: SampleRate,
    min_magnitude: f64,
}

impl PeakExtractor {
    pub fn new(sample_rate: SampleRate) -> Self {
        Self {
            sample_rate,
            min_magnitude: DEFAULT_MIN_MAGNITUDE,
        }
    }

    pub fn with_min_magnitude(mut self, min_magnitude: f64) -> Self {
        self.min_magnitude = min_magnitude;
        self
    }

    pub fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }

    /// Build the signature of one window of s16le mono PCM.
    pub fn signature(&self, pcm: &[u8]) -> Result<Signature> {
        let samples = pcm_to_samples(pcm)?;
        let peaks = self.find_peaks(&samples);
        let rate_hz = self.sample_rate.hz();

        let sample_count = u32::try_from(samples.len()).map_err(|_| {
            SignatureError::Encode(format!("{} samples in one window", samples.len()))
        })?;
        let mut signature = Signature::new(self.sample_rate, sample_count);
        let mut dropped = 0usize;

        for peak in &peaks {
            let (Ok(pass), Ok(corrected_bin)) = (
                u32::try_from(peak.time_index),
                u16::try_from(peak.frequency_bin),
            ) else {
                dropped += 1;
                continue;
            };
            let magnitude = peak.magnitude.min(u16::MAX as f64) as u16;
            signature.push_peak(
                FrequencyBand::classify(peak.frequency),
                FrequencyPeak::new(pass, magnitude, corrected_bin, rate_hz),
            );
        }

        if dropped > 0 {
            log::trace!("Dropped {} peaks outside the signature bin range", dropped);
        }
        log::debug!(
            "Extracted {} peaks from {} samples ({} bands)",
            signature.peak_count(),
            samples.len(),
            signature.peaks_by_band.len()
        );

        Ok(signature)
    }

    /// Locate strict local maxima of the window's magnitude spectrum.
    ///
    /// Every bin of the full FFT output is a candidate except the first and
    /// last, so a real input also yields its mirrored peaks above `N/2`.
    pub fn find_peaks(&self, samples: &[f64]) -> Vec<SpectralPeak> {
        if samples.len() < 3 {
            return Vec::new();
        }

        let magnitudes = magnitude_spectrum(samples);
        let rate = self.sample_rate.hz() as u64;
        let mut peaks = Vec::new();

        for i in 1..magnitudes.len() - 1 {
            let m = magnitudes[i];
            if m > self.min_magnitude && m > magnitudes[i - 1] && m > magnitudes[i + 1] {
                let frequency_bin = i as u64 * rate / WINDOW_SIZE as u64;
                let frequency = frequency_bin as f64 * rate as f64 / WINDOW_SIZE as f64;
                peaks.push(SpectralPeak {
                    frequency,
                    frequency_bin,
                    magnitude: m,
                    time_index: i / HOP_SIZE,
                });
            }
        }

        peaks
    }
}

/// Convert little-endian signed 16-bit PCM to samples in `[-1, 1)`.
///
/// A trailing odd byte is ignored.
pub fn pcm_to_samples(pcm: &[u8]) -> Result<Vec<f64>> {
    if pcm.is_empty() {
        return Err(SignatureError::EmptyInput);
    }
    Ok(pcm
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f64 / PCM_FULL_SCALE)
        .collect())
}

/// Magnitudes of every bin of an FFT over all samples.
fn magnitude_spectrum(samples: &[f64]) -> Vec<f64> {
    let mut buffer: Vec<Complex<f64>> = samples.iter().map(|&s| Complex::new(s, 0.0)).collect();
    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(buffer.len());
    fft.process(&mut buffer);

    buffer.iter().map(|c| c.norm()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn sine_pcm(freq_hz: f64, amplitude: f64, rate: u32, len: usize) -> Vec<u8> {
        (0..len)
            .flat_map(|n| {
                let v = amplitude * (2.0 * PI * freq_hz * n as f64 / rate as f64).sin();
                ((v * 32767.0) as i16).to_le_bytes()
            })
            .collect()
    }

    #[test]
    fn normalizes_pcm() {
        let pcm = [0x00, 0x80, 0xFF, 0x7F, 0x00, 0x00, 0x01];
        let samples = pcm_to_samples(&pcm).unwrap();
        assert_eq!(samples.len(), 3);
        assert_relative_eq!(samples[0], -1.0);
        assert_relative_eq!(samples[1], 32767.0 / 32768.0);
        assert_eq!(samples[2], 0.0);
    }

    #[test]
    fn empty_pcm_is_rejected() {
        assert_eq!(pcm_to_samples(&[]), Err(SignatureError::EmptyInput));
        let extractor = PeakExtractor::new(SampleRate::Hz16000);
        assert_eq!(extractor.signature(&[]), Err(SignatureError::EmptyInput));
    }

    #[test]
    fn silence_has_no_peaks() {
        let extractor = PeakExtractor::new(SampleRate::Hz16000);
        let sig = extractor.signature(&vec![0u8; 8192]).unwrap();
        assert!(sig.is_empty());
        assert_eq!(sig.sample_count, 4096);
        assert_eq!(sig.sample_rate, SampleRate::Hz16000);
    }

    #[test]
    fn finds_sine_peak() {
        // 4096 samples at 8 kHz: bin i is i * 8000 / 4096 Hz, so 1000 Hz sits on bin 512.
        let rate = 8000;
        let pcm = sine_pcm(1000.0, 0.9, rate, 4096);
        let samples = pcm_to_samples(&pcm).unwrap();
        let peaks = PeakExtractor::new(SampleRate::Hz8000).find_peaks(&samples);

        assert_eq!(peaks.len(), 2);
        let peak = peaks[0];
        assert_eq!(peak.frequency_bin, 512 * 8000 / 1024);
        assert_relative_eq!(peak.frequency, 4000.0 * 8000.0 / 1024.0);
        assert_eq!(peak.time_index, 512 / 128);
        assert!(peak.magnitude > 1000.0);
        assert_relative_eq!(peaks[1].magnitude, peak.magnitude, max_relative = 1e-9);
    }

    #[test]
    fn mirrored_peak_is_kept() {
        // Bin 400 of 4096 at 8 kHz and its mirror at bin 3696.
        let pcm = sine_pcm(400.0 * 8000.0 / 4096.0, 0.9, 8000, 4096);
        let samples = pcm_to_samples(&pcm).unwrap();
        let peaks = PeakExtractor::new(SampleRate::Hz8000).find_peaks(&samples);

        let bins: Vec<u64> = peaks.iter().map(|p| p.frequency_bin).collect();
        let times: Vec<usize> = peaks.iter().map(|p| p.time_index).collect();
        assert_eq!(bins, vec![3125, 28875]);
        assert_eq!(times, vec![3, 28]);
    }

    #[test]
    fn nyquist_bin_is_a_candidate() {
        // Alternating samples put all energy on bin N/2.
        let samples: Vec<f64> = (0..64).map(|n| if n % 2 == 0 { 0.9 } else { -0.9 }).collect();
        let peaks = PeakExtractor::new(SampleRate::Hz8000)
            .with_min_magnitude(1.0)
            .find_peaks(&samples);
        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].frequency_bin, 32 * 8000 / 1024);
    }

    #[test]
    fn threshold_rejects_quiet_peaks() {
        let pcm = sine_pcm(1000.0, 0.9, 8000, 4096);
        let samples = pcm_to_samples(&pcm).unwrap();
        let peaks = PeakExtractor::new(SampleRate::Hz8000)
            .with_min_magnitude(1.0e7)
            .find_peaks(&samples);
        assert!(peaks.is_empty());
    }

    #[test]
    fn signature_files_peaks_by_band() {
        let pcm = sine_pcm(1000.0, 0.9, 8000, 4096);
        let sig = PeakExtractor::new(SampleRate::Hz8000).signature(&pcm).unwrap();

        // Bin 512 and its mirror at 3584.
        assert_eq!(sig.peak_count(), 2);
        let peaks = sig.peaks(FrequencyBand::VeryHigh);
        assert_eq!(peaks.len(), 2);
        assert_eq!(peaks[0].pass, 4);
        assert_eq!(peaks[0].corrected_bin, 4000);
        assert_eq!(peaks[0].sample_rate_hz, 8000);
        assert_eq!(peaks[1].pass, 28);
        assert_eq!(peaks[1].corrected_bin, 28000);
    }

    #[test]
    fn small_bins_are_scaled_up_a_band() {
        // Bin 8 of 4096 at 8 kHz: frequency_bin 62, frequency 62 * 8000 / 1024 ~ 484 Hz.
        let pcm = sine_pcm(8.0 * 8000.0 / 4096.0, 0.9, 8000, 4096);
        let sig = PeakExtractor::new(SampleRate::Hz8000).signature(&pcm).unwrap();
        assert_eq!(sig.peaks(FrequencyBand::Mid).len(), 1);
        assert_eq!(sig.peaks(FrequencyBand::Mid)[0].pass, 0);
    }

    #[test]
    fn peaks_within_a_band_are_ordered() {
        // Bins 1024 and 1536 of 8192 at 8 kHz, mirrored at 7168 and 6656.
        let rate = 8000;
        let a = sine_pcm(1000.0, 0.45, rate, 8192);
        let b = sine_pcm(1500.0, 0.45, rate, 8192);
        let mixed: Vec<u8> = a
            .chunks_exact(2)
            .zip(b.chunks_exact(2))
            .flat_map(|(x, y)| {
                let s = i16::from_le_bytes([x[0], x[1]]) as i32
                    + i16::from_le_bytes([y[0], y[1]]) as i32;
                (s as i16).to_le_bytes()
            })
            .collect();

        let sig = PeakExtractor::new(SampleRate::Hz8000).signature(&mixed).unwrap();
        let passes: Vec<u32> = sig
            .peaks(FrequencyBand::VeryHigh)
            .iter()
            .map(|p| p.pass)
            .collect();
        assert_eq!(passes, vec![8, 12, 52, 56]);
    }

    #[test]
    fn out_of_range_bins_are_dropped() {
        // At 48 kHz, bin i maps to i * 46.875, so bins above 1398 overflow u16.
        // That covers bin 2000 and its mirror at 6192.
        let rate = 48000;
        let len = 8192;
        let pcm = sine_pcm(2000.0 * rate as f64 / len as f64, 0.9, rate, len);
        let sig = PeakExtractor::new(SampleRate::Hz48000).signature(&pcm).unwrap();
        assert!(sig.is_empty());
    }
}
