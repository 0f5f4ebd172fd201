//! Binary signature codec.
//!
//! Layout (little-endian throughout):
//! - `[0..48]`  raw header, see [`RawHeader`]
//! - `[48..52]` inner length tag `0x40000000`
//! - `[52..56]` inner length: TLV stream length + 8
//! - `[56..]`   one TLV record per non-empty band
//!
//! A TLV record is `band id (u32) | payload length (u32) | payload | pad`,
//! where pad brings the payload to a multiple of 4 bytes. A payload is a run
//! of peak records, each a one-byte pass delta followed by magnitude (u16)
//! and corrected bin (u16). A delta byte of `0xFF` instead carries a new
//! absolute pass number (u32) and no peak.

use std::io::{self, Write};

use base64::prelude::{Engine, BASE64_STANDARD};
use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};

use super::band::FrequencyBand;
use super::constants::{
    BAND_ID_BASE, CRC_OFFSET, DATA_URI_PREFIX, HEADER_FIXED_VALUE, HEADER_SIZE,
    INNER_LENGTH_TAG, INNER_PREFIX_SIZE, MAGIC1, MAGIC2, MAX_PASS_DELTA, PASS_ESCAPE,
    SAMPLE_COUNT_RATE_FACTOR, SAMPLE_RATE_SHIFT,
};
use super::error::{Result, SignatureError};
use super::peak::FrequencyPeak;
use super::signature::{SampleRate, Signature};

/// The fixed 48-byte header at the start of every binary signature.
///
/// - `[0..4]`   magic1
/// - `[4..8]`   crc32 of bytes `[8..]` of the final buffer
/// - `[8..12]`  size_minus_header
/// - `[12..16]` magic2
/// - `[16..28]` reserved
/// - `[28..32]` shifted_sample_rate_id (`id << 27`, low bits reserved)
/// - `[32..40]` reserved
/// - `[40..44]` number_samples_plus_divided_rate
/// - `[44..48]` fixed_value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct RawHeader {
    magic1: u32,
    crc32: u32,
    size_minus_header: u32,
    magic2: u32,
    void1: [u32; 3],
    shifted_sample_rate_id: u32,
    void2: [u32; 2],
    number_samples_plus_divided_rate: u32,
    fixed_value: u32,
}

impl RawHeader {
    fn parse(buf: &[u8]) -> Self {
        let word = |i: usize| LittleEndian::read_u32(&buf[i * 4..i * 4 + 4]);
        Self {
            magic1: word(0),
            crc32: word(1),
            size_minus_header: word(2),
            magic2: word(3),
            void1: [word(4), word(5), word(6)],
            shifted_sample_rate_id: word(7),
            void2: [word(8), word(9)],
            number_samples_plus_divided_rate: word(10),
            fixed_value: word(11),
        }
    }

    fn write_into(&self, buf: &mut [u8]) {
        let words = [
            self.magic1,
            self.crc32,
            self.size_minus_header,
            self.magic2,
            self.void1[0],
            self.void1[1],
            self.void1[2],
            self.shifted_sample_rate_id,
            self.void2[0],
            self.void2[1],
            self.number_samples_plus_divided_rate,
            self.fixed_value,
        ];
        LittleEndian::write_u32_into(&words, &mut buf[..HEADER_SIZE]);
    }
}

/// Bounds-checked reader over a byte slice.
struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, len: usize, what: &str) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(SignatureError::format(format!(
                "truncated {what} at offset {}: need {len} bytes, {} left",
                self.pos,
                self.remaining()
            )));
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn skip_up_to(&mut self, len: usize) {
        self.pos += len.min(self.remaining());
    }

    fn read_u8(&mut self, what: &str) -> Result<u8> {
        Ok(self.take(1, what)?[0])
    }

    fn read_u16(&mut self, what: &str) -> Result<u16> {
        Ok(LittleEndian::read_u16(self.take(2, what)?))
    }

    fn read_u32(&mut self, what: &str) -> Result<u32> {
        Ok(LittleEndian::read_u32(self.take(4, what)?))
    }
}

/// Running pass baseline for one band payload.
#[derive(Debug, Default)]
struct PassState {
    current: u32,
}

fn padding_for(len: usize) -> usize {
    (4 - len % 4) % 4
}

/// Decode a binary signature.
pub fn decode(data: &[u8]) -> Result<Signature> {
    if data.len() < HEADER_SIZE {
        return Err(SignatureError::format(format!(
            "{} bytes is shorter than the {HEADER_SIZE}-byte header",
            data.len()
        )));
    }

    let header = RawHeader::parse(&data[..HEADER_SIZE]);
    if header.magic1 != MAGIC1 {
        return Err(SignatureError::format(format!(
            "invalid magic1: {:#010x}",
            header.magic1
        )));
    }
    if header.size_minus_header as usize != data.len() - HEADER_SIZE {
        return Err(SignatureError::format(format!(
            "invalid size: header declares {} bytes after the header, found {}",
            header.size_minus_header,
            data.len() - HEADER_SIZE
        )));
    }
    if header.magic2 != MAGIC2 {
        return Err(SignatureError::format(format!(
            "invalid magic2: {:#010x}",
            header.magic2
        )));
    }
    let crc = crc32fast::hash(&data[CRC_OFFSET..]);
    if header.crc32 != crc {
        return Err(SignatureError::format(format!(
            "crc32 mismatch: header has {:#010x}, content hashes to {crc:#010x}",
            header.crc32
        )));
    }

    let rate_id = header.shifted_sample_rate_id >> SAMPLE_RATE_SHIFT;
    let sample_rate = SampleRate::from_wire_id(rate_id)
        .ok_or_else(|| SignatureError::format(format!("unknown sample rate id: {rate_id}")))?;
    let sample_count = header.number_samples_plus_divided_rate as f64
        - sample_rate.hz() as f64 * SAMPLE_COUNT_RATE_FACTOR;
    if sample_count < 0.0 {
        return Err(SignatureError::format(format!(
            "sample count field {} is below the {sample_rate} offset",
            header.number_samples_plus_divided_rate
        )));
    }

    log::trace!(
        "Signature header: rate={}, samples={:.0}, size={}",
        sample_rate,
        sample_count,
        header.size_minus_header
    );

    let mut signature = Signature::new(sample_rate, sample_count.round() as u32);
    let mut cursor = ByteCursor::new(&data[HEADER_SIZE..]);

    let tag = cursor.read_u32("inner length tag")?;
    if tag != INNER_LENGTH_TAG {
        return Err(SignatureError::format(format!(
            "invalid inner length tag: {tag:#010x}"
        )));
    }
    let inner_len = cursor.read_u32("inner length")?;
    if inner_len != header.size_minus_header {
        return Err(SignatureError::format(format!(
            "inner length {inner_len} disagrees with header size {}",
            header.size_minus_header
        )));
    }

    while !cursor.is_empty() {
        let raw_id = cursor.read_u32("band id")?;
        let payload_len = cursor.read_u32("band payload length")? as usize;
        let payload = cursor.take(payload_len, "band payload")?;
        cursor.skip_up_to(padding_for(payload_len));

        match FrequencyBand::from_u32(raw_id.wrapping_sub(BAND_ID_BASE)) {
            Some(band) => decode_band(payload, band, &mut signature)?,
            None => log::warn!(
                "Skipping record with unknown band id {:#010x} ({} bytes)",
                raw_id,
                payload_len
            ),
        }
    }

    log::debug!(
        "Decoded signature: {} samples @ {}, {} peaks in {} bands",
        signature.sample_count,
        signature.sample_rate,
        signature.peak_count(),
        signature.peaks_by_band.len()
    );

    Ok(signature)
}

fn decode_band(payload: &[u8], band: FrequencyBand, signature: &mut Signature) -> Result<()> {
    let rate_hz = signature.sample_rate_hz();
    let mut cursor = ByteCursor::new(payload);
    let mut state = PassState::default();

    while !cursor.is_empty() {
        let delta = cursor.read_u8("pass delta")?;
        if delta == PASS_ESCAPE {
            state.current = cursor.read_u32("absolute pass")?;
            continue;
        }

        state.current = state.current.checked_add(delta as u32).ok_or_else(|| {
            SignatureError::format(format!("pass number overflow in {} band", band.label()))
        })?;
        let magnitude = cursor.read_u16("peak magnitude")?;
        let corrected_bin = cursor.read_u16("peak frequency bin")?;

        signature.push_peak(
            band,
            FrequencyPeak::new(state.current, magnitude, corrected_bin, rate_hz),
        );
    }

    Ok(())
}

/// Encode a signature into its binary form.
///
/// Peaks within each band must be sorted by ascending pass.
pub fn encode(signature: &Signature) -> Result<Vec<u8>> {
    let rate_hz = signature.sample_rate_hz();
    let sample_field =
        (signature.sample_count as f64 + rate_hz as f64 * SAMPLE_COUNT_RATE_FACTOR).round();
    if sample_field > u32::MAX as f64 {
        return Err(SignatureError::Encode(format!(
            "sample count {} does not fit the header field",
            signature.sample_count
        )));
    }

    let mut contents = Vec::new();
    for (band, peaks) in &signature.peaks_by_band {
        if peaks.is_empty() {
            continue;
        }
        let payload = encode_band(*band, peaks)?;
        write_record(&mut contents, *band, &payload)
            .map_err(|e| SignatureError::Encode(e.to_string()))?;
    }

    let size_minus_header = u32::try_from(contents.len() + INNER_PREFIX_SIZE).map_err(|_| {
        SignatureError::Encode(format!("{} bytes of peak data is too large", contents.len()))
    })?;

    let mut header = RawHeader {
        magic1: MAGIC1,
        size_minus_header,
        magic2: MAGIC2,
        shifted_sample_rate_id: signature.sample_rate.wire_id() << SAMPLE_RATE_SHIFT,
        number_samples_plus_divided_rate: sample_field as u32,
        fixed_value: HEADER_FIXED_VALUE,
        ..Default::default()
    };

    let mut buf = vec![0u8; HEADER_SIZE + INNER_PREFIX_SIZE];
    header.write_into(&mut buf);
    LittleEndian::write_u32(&mut buf[HEADER_SIZE..HEADER_SIZE + 4], INNER_LENGTH_TAG);
    LittleEndian::write_u32(&mut buf[HEADER_SIZE + 4..], size_minus_header);
    buf.extend_from_slice(&contents);

    header.crc32 = crc32fast::hash(&buf[CRC_OFFSET..]);
    header.write_into(&mut buf);

    log::debug!(
        "Encoded signature: {} bytes, {} peaks in {} bands",
        buf.len(),
        signature.peak_count(),
        signature.peaks_by_band.len()
    );

    Ok(buf)
}

fn encode_band(band: FrequencyBand, peaks: &[FrequencyPeak]) -> Result<Vec<u8>> {
    let mut payload = Vec::with_capacity(peaks.len() * 5);
    let mut state = PassState::default();

    for peak in peaks {
        if peak.pass < state.current {
            return Err(SignatureError::Encode(format!(
                "{} band peaks out of order: pass {} follows {}",
                band.label(),
                peak.pass,
                state.current
            )));
        }
        write_peak(&mut payload, &mut state, peak)
            .map_err(|e| SignatureError::Encode(e.to_string()))?;
    }

    Ok(payload)
}

fn write_peak(out: &mut Vec<u8>, state: &mut PassState, peak: &FrequencyPeak) -> io::Result<()> {
    if peak.pass - state.current >= MAX_PASS_DELTA {
        out.write_u8(PASS_ESCAPE)?;
        out.write_u32::<LittleEndian>(peak.pass)?;
        state.current = peak.pass;
    }
    out.write_u8((peak.pass - state.current) as u8)?;
    out.write_u16::<LittleEndian>(peak.magnitude)?;
    out.write_u16::<LittleEndian>(peak.corrected_bin)?;
    state.current = peak.pass;
    Ok(())
}

fn write_record(out: &mut Vec<u8>, band: FrequencyBand, payload: &[u8]) -> io::Result<()> {
    let len = u32::try_from(payload.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "band payload too large"))?;
    out.write_u32::<LittleEndian>(BAND_ID_BASE + band.as_u32())?;
    out.write_u32::<LittleEndian>(len)?;
    out.write_all(payload)?;
    out.write_all(&[0u8; 3][..padding_for(payload.len())])?;
    Ok(())
}

/// Encode a signature as a base64 data URI.
pub fn encode_to_uri(signature: &Signature) -> Result<String> {
    let binary = encode(signature)?;
    Ok(format!("{DATA_URI_PREFIX}{}", BASE64_STANDARD.encode(binary)))
}

/// Decode a data URI produced by [`encode_to_uri`].
pub fn decode_from_uri(uri: &str) -> Result<Signature> {
    let encoded = uri
        .strip_prefix(DATA_URI_PREFIX)
        .ok_or_else(|| SignatureError::format("missing signature data URI prefix"))?;
    let binary = BASE64_STANDARD
        .decode(encoded.trim())
        .map_err(|e| SignatureError::format(format!("invalid base64: {e}")))?;
    decode(&binary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peak(pass: u32, magnitude: u16, bin: u16) -> FrequencyPeak {
        FrequencyPeak::new(pass, magnitude, bin, 16000)
    }

    fn sample_signature() -> Signature {
        let mut sig = Signature::new(SampleRate::Hz16000, 1000);
        sig.push_peak(FrequencyBand::Low, peak(100, 7000, 512));
        sig.push_peak(FrequencyBand::Mid, peak(200, 6500, 256));
        sig
    }

    #[test]
    fn round_trips_sample_signature() {
        let sig = sample_signature();
        let decoded = decode(&encode(&sig).unwrap()).unwrap();
        assert_eq!(decoded, sig);
    }

    #[test]
    fn round_trips_each_band_alone_and_together() {
        let mut all = Signature::new(SampleRate::Hz44100, 441_000);
        for (i, band) in FrequencyBand::ALL.iter().enumerate() {
            let peaks: Vec<FrequencyPeak> = (0..20u32)
                .map(|n| {
                    FrequencyPeak::new(n * 7 + i as u32, 6000 + n as u16, 100 * n as u16, 44100)
                })
                .collect();

            let mut single = Signature::new(SampleRate::Hz44100, 441_000);
            for p in &peaks {
                single.push_peak(*band, *p);
                all.push_peak(*band, *p);
            }
            assert_eq!(decode(&encode(&single).unwrap()).unwrap(), single);
        }
        assert_eq!(decode(&encode(&all).unwrap()).unwrap(), all);
    }

    #[test]
    fn round_trips_every_sample_rate() {
        for hz in [8000, 16000, 32000, 44100, 48000] {
            let rate = SampleRate::from_hz(hz).unwrap();
            let mut sig = Signature::new(rate, 12_345);
            sig.push_peak(FrequencyBand::High, FrequencyPeak::new(3, 1, 2, hz));
            let decoded = decode(&encode(&sig).unwrap()).unwrap();
            assert_eq!(decoded.sample_rate, rate);
            assert_eq!(decoded.sample_count, 12_345);
            assert_eq!(decoded, sig);
        }
    }

    #[test]
    fn empty_signature_round_trips() {
        let sig = Signature::new(SampleRate::Hz8000, 0);
        let bytes = encode(&sig).unwrap();
        assert_eq!(bytes.len(), HEADER_SIZE + INNER_PREFIX_SIZE);
        assert_eq!(decode(&bytes).unwrap(), sig);
    }

    #[test]
    fn header_layout_is_exact() {
        let sig = sample_signature();
        let bytes = encode(&sig).unwrap();
        let word = |off: usize| LittleEndian::read_u32(&bytes[off..off + 4]);

        assert_eq!(word(0), MAGIC1);
        assert_eq!(word(4), crc32fast::hash(&bytes[8..]));
        assert_eq!(word(8) as usize, bytes.len() - HEADER_SIZE);
        assert_eq!(word(12), MAGIC2);
        assert_eq!(&bytes[16..28], &[0u8; 12]);
        assert_eq!(word(28), 3 << 27);
        assert_eq!(&bytes[32..40], &[0u8; 8]);
        assert_eq!(word(40), 1000 + 3840);
        assert_eq!(word(44), (15 << 19) + 0x40000);
        assert_eq!(word(48), 0x4000_0000);
        assert_eq!(word(52), word(8));
    }

    #[test]
    fn band_records_are_padded() {
        let sig = sample_signature();
        let bytes = encode(&sig).unwrap();

        // Low band first: id, length 5, payload, 3 bytes pad.
        assert_eq!(LittleEndian::read_u32(&bytes[56..60]), 0x6003_0040);
        assert_eq!(LittleEndian::read_u32(&bytes[60..64]), 5);
        assert_eq!(bytes[64], 100);
        assert_eq!(LittleEndian::read_u16(&bytes[65..67]), 7000);
        assert_eq!(LittleEndian::read_u16(&bytes[67..69]), 512);
        assert_eq!(&bytes[69..72], &[0, 0, 0]);
        assert_eq!(LittleEndian::read_u32(&bytes[72..76]), 0x6003_0041);
        assert_eq!(bytes.len(), 72 + 16);
    }

    #[test]
    fn large_pass_gap_uses_escape_record() {
        let mut sig = Signature::new(SampleRate::Hz16000, 16000);
        sig.push_peak(FrequencyBand::High, peak(10, 100, 200));
        sig.push_peak(FrequencyBand::High, peak(10 + 255, 101, 201));
        sig.push_peak(FrequencyBand::High, peak(10 + 255 + 254, 102, 202));

        let bytes = encode(&sig).unwrap();
        let payload_len = LittleEndian::read_u32(&bytes[60..64]) as usize;
        let payload = &bytes[64..64 + payload_len];

        // peak, escape + absolute pass, zero-delta peak, plain 254 delta peak
        assert_eq!(payload_len, 5 + 5 + 5 + 5);
        assert_eq!(payload[0], 10);
        assert_eq!(payload[5], PASS_ESCAPE);
        assert_eq!(LittleEndian::read_u32(&payload[6..10]), 265);
        assert_eq!(payload[10], 0);
        assert_eq!(payload[15], 254);

        let decoded = decode(&bytes).unwrap();
        let passes: Vec<u32> = decoded
            .peaks(FrequencyBand::High)
            .iter()
            .map(|p| p.pass)
            .collect();
        assert_eq!(passes, vec![10, 265, 519]);
        assert_eq!(decoded, sig);
    }

    #[test]
    fn first_peak_far_from_zero_escapes() {
        let mut sig = Signature::new(SampleRate::Hz16000, 16000);
        sig.push_peak(FrequencyBand::Low, peak(1000, 1, 1));
        let bytes = encode(&sig).unwrap();
        assert_eq!(bytes[64], PASS_ESCAPE);
        assert_eq!(decode(&bytes).unwrap(), sig);
    }

    #[test]
    fn equal_passes_encode_as_zero_delta() {
        let mut sig = Signature::new(SampleRate::Hz16000, 16000);
        sig.push_peak(FrequencyBand::Low, peak(5, 1, 1));
        sig.push_peak(FrequencyBand::Low, peak(5, 2, 2));
        let decoded = decode(&encode(&sig).unwrap()).unwrap();
        assert_eq!(decoded, sig);
    }

    #[test]
    fn unsorted_peaks_fail_to_encode() {
        let mut sig = Signature::new(SampleRate::Hz16000, 16000);
        sig.push_peak(FrequencyBand::Low, peak(5, 1, 1));
        sig.push_peak(FrequencyBand::Low, peak(4, 1, 1));
        assert!(matches!(encode(&sig), Err(SignatureError::Encode(_))));
    }

    #[test]
    fn rejects_empty_and_short_input() {
        assert!(matches!(decode(&[]), Err(SignatureError::Format(_))));
        assert!(matches!(decode(&[0u8; 10]), Err(SignatureError::Format(_))));
        assert!(matches!(decode(&[0u8; 47]), Err(SignatureError::Format(_))));
    }

    #[test]
    fn rejects_zeroed_buffer() {
        let err = decode(&[0u8; 100]).unwrap_err();
        assert!(err.to_string().contains("magic1"));
    }

    #[test]
    fn rejects_corrupted_magic1() {
        let mut bytes = encode(&sample_signature()).unwrap();
        bytes[0] ^= 0xFF;
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(err, SignatureError::Format(ref m) if m.contains("magic1")));
    }

    #[test]
    fn rejects_wrong_size() {
        let mut bytes = encode(&sample_signature()).unwrap();
        bytes.push(0);
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(err, SignatureError::Format(ref m) if m.contains("size")));

        let mut bytes = encode(&sample_signature()).unwrap();
        LittleEndian::write_u32(&mut bytes[8..12], 7);
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(err, SignatureError::Format(ref m) if m.contains("size")));
    }

    #[test]
    fn rejects_corrupted_magic2() {
        let mut bytes = encode(&sample_signature()).unwrap();
        bytes[12] ^= 0xFF;
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(err, SignatureError::Format(ref m) if m.contains("magic2")));
    }

    #[test]
    fn rejects_corrupted_content() {
        let mut bytes = encode(&sample_signature()).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(err, SignatureError::Format(ref m) if m.contains("crc32")));
    }

    /// Rewrites the size fields and crc so only the content is at fault.
    fn reseal(bytes: &mut Vec<u8>) {
        let size = (bytes.len() - HEADER_SIZE) as u32;
        LittleEndian::write_u32(&mut bytes[8..12], size);
        LittleEndian::write_u32(&mut bytes[52..56], size);
        let crc = crc32fast::hash(&bytes[8..]);
        LittleEndian::write_u32(&mut bytes[4..8], crc);
    }

    #[test]
    fn rejects_truncated_peak_record() {
        let mut sig = Signature::new(SampleRate::Hz16000, 16000);
        sig.push_peak(FrequencyBand::Low, peak(1, 2, 3));
        let mut bytes = encode(&sig).unwrap();
        // Claim a 4-byte payload: delta + magnitude + one byte of the bin.
        LittleEndian::write_u32(&mut bytes[60..64], 4);
        bytes.truncate(64 + 4);
        reseal(&mut bytes);
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(err, SignatureError::Format(ref m) if m.contains("frequency bin")));
    }

    #[test]
    fn rejects_truncated_band_payload() {
        let mut bytes = encode(&sample_signature()).unwrap();
        bytes.truncate(66);
        reseal(&mut bytes);
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(err, SignatureError::Format(ref m) if m.contains("band payload")));
    }

    #[test]
    fn rejects_truncated_record_header() {
        let mut bytes = encode(&sample_signature()).unwrap();
        bytes.extend_from_slice(&[0x40, 0x00]);
        reseal(&mut bytes);
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(err, SignatureError::Format(ref m) if m.contains("band id")));
    }

    #[test]
    fn skips_unknown_band_records() {
        let sig = sample_signature();
        let mut bytes = encode(&sig).unwrap();
        // A 5-byte record for band id 9, padded to 8.
        bytes.extend_from_slice(&(BAND_ID_BASE + 9).to_le_bytes());
        bytes.extend_from_slice(&5u32.to_le_bytes());
        bytes.extend_from_slice(&[1, 2, 0, 3, 0, 0, 0, 0]);
        reseal(&mut bytes);
        assert_eq!(decode(&bytes).unwrap(), sig);
    }

    #[test]
    fn rejects_unknown_sample_rate_id() {
        let mut bytes = encode(&sample_signature()).unwrap();
        LittleEndian::write_u32(&mut bytes[28..32], 31 << 27);
        reseal(&mut bytes);
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(err, SignatureError::Format(ref m) if m.contains("sample rate")));
    }

    #[test]
    fn ignores_low_bits_of_sample_rate_field() {
        let mut bytes = encode(&sample_signature()).unwrap();
        LittleEndian::write_u32(&mut bytes[28..32], (3 << 27) | 0x07FF_FFFF);
        reseal(&mut bytes);
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.sample_rate, SampleRate::Hz16000);
    }

    #[test]
    fn uri_has_prefix_and_decodes() {
        let sig = sample_signature();
        let uri = encode_to_uri(&sig).unwrap();
        assert!(uri.starts_with(DATA_URI_PREFIX));

        let binary = BASE64_STANDARD
            .decode(&uri[DATA_URI_PREFIX.len()..])
            .unwrap();
        let decoded = decode(&binary).unwrap();
        assert_eq!(decoded.sample_rate_hz(), 16000);
        assert_eq!(decode_from_uri(&uri).unwrap(), sig);
    }

    #[test]
    fn uri_without_prefix_is_rejected() {
        let err = decode_from_uri("data:text/plain;base64,AAAA").unwrap_err();
        assert!(matches!(err, SignatureError::Format(_)));
        let err = decode_from_uri(&format!("{DATA_URI_PREFIX}not base64!")).unwrap_err();
        assert!(matches!(err, SignatureError::Format(_)));
    }
}
