//! Wire-format and calibration constants for the signature format.
//!
//! Every magic number the format depends on lives here so the contract with
//! the recognition service can be audited in one place.

/// Scheme prefix of a signature data URI.
pub const DATA_URI_PREFIX: &str = "data:audio/vnd.shazam.sig;base64,";

/// First header magic, at offset 0.
pub const MAGIC1: u32 = 0xCAFE_2580;
/// Second header magic, at offset 12.
pub const MAGIC2: u32 = 0x9411_9C00;

/// Size of the fixed raw header in bytes.
pub const HEADER_SIZE: usize = 48;
/// Bytes of the header excluded from the CRC (magic1 + crc32 itself).
pub const CRC_OFFSET: usize = 8;
/// Tag preceding the inner content length.
pub const INNER_LENGTH_TAG: u32 = 0x4000_0000;
/// Size of the inner tag + length prefix ahead of the TLV stream.
pub const INNER_PREFIX_SIZE: usize = 8;
/// Constant trailer field at header offset 44.
pub const HEADER_FIXED_VALUE: u32 = (15 << 19) + 0x40000;
/// The sample-rate id occupies the top 5 bits of its header field.
pub const SAMPLE_RATE_SHIFT: u32 = 27;
/// Per-Hz offset folded into the sample-count header field.
pub const SAMPLE_COUNT_RATE_FACTOR: f64 = 0.24;

/// Base TLV identifier; a band's record id is `BAND_ID_BASE + band`.
pub const BAND_ID_BASE: u32 = 0x6003_0040;
/// Delta byte announcing an absolute 4-byte pass number.
pub const PASS_ESCAPE: u8 = 0xFF;
/// Smallest pass gap that must be written through the escape record.
pub const MAX_PASS_DELTA: u32 = 255;

/// Magnitude calibration: log-scale offset.
pub const MAGNITUDE_OFFSET: f64 = 6144.0;
/// Magnitude calibration: log-scale divisor.
pub const MAGNITUDE_SCALE: f64 = 1477.3;
/// Magnitude calibration: PCM amplitude scale (`1 << 17`).
pub const AMPLITUDE_SCALE: f64 = 131_072.0;
/// Samples advanced per FFT pass.
pub const PASS_HOP: u32 = 128;
/// Denominator turning a corrected bin into Hz (`2 * 1024 * 64`).
pub const BIN_TO_HZ_DIVISOR: f64 = 2.0 * 1024.0 * 64.0;

/// Upper edge (exclusive) of the low band, in Hz.
pub const LOW_BAND_MAX_HZ: f64 = 250.0;
/// Upper edge (exclusive) of the mid band, in Hz.
pub const MID_BAND_MAX_HZ: f64 = 520.0;
/// Upper edge (exclusive) of the high band, in Hz.
pub const HIGH_BAND_MAX_HZ: f64 = 1450.0;

/// Minimum FFT magnitude for a bin to count as a peak.
pub const DEFAULT_MIN_MAGNITUDE: f64 = 1000.0;
/// Nominal analysis window used to scale bin indices.
pub const WINDOW_SIZE: usize = 1024;
/// Bins per time index when deriving a peak's pass number.
pub const HOP_SIZE: usize = 128;
/// Full-scale value of a signed 16-bit sample.
pub const PCM_FULL_SCALE: f64 = 32768.0;
