//! Fixed-duration PCM chunks pulled from a live byte source.
//!
//! A producer thread reads the source into a bounded channel. Each call to
//! [`AudioStream::next_chunk`] collects one chunk's worth of bytes, but gives
//! up after `read_timeout` without data, so a stalled source yields a short
//! chunk instead of blocking the caller.

use anyhow::{Context, Result};
use std::io::Read;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use crate::fingerprint::SampleRate;

/// Bytes per mono s16le sample.
const BYTES_PER_SAMPLE: usize = 2;
/// Size of a single read from the source.
const READ_BLOCK: usize = 4096;
/// Blocks buffered between the reader thread and the consumer.
const CHANNEL_BLOCKS: usize = 256;

/// A window of s16le mono PCM at a known position in the stream.
pub trait Chunk: Send {
    fn audio_data(&self) -> &[u8];
    /// Start of the chunk relative to the start of the stream.
    fn timestamp(&self) -> Duration;
    /// Length of the audio actually held, which is short for partial chunks.
    fn duration(&self) -> Duration;
    fn sample_rate(&self) -> SampleRate;
}

pub trait AudioStream {
    /// Record the next chunk. `Ok(None)` once the source is exhausted.
    fn next_chunk(&mut self) -> Result<Option<Box<dyn Chunk>>>;
}

#[derive(Clone, Debug)]
pub struct PcmChunk {
    data: Vec<u8>,
    timestamp: Duration,
    sample_rate: SampleRate,
}

impl PcmChunk {
    pub fn new(data: Vec<u8>, timestamp: Duration, sample_rate: SampleRate) -> Self {
        Self {
            data,
            timestamp,
            sample_rate,
        }
    }
}

impl Chunk for PcmChunk {
    fn audio_data(&self) -> &[u8] {
        &self.data
    }

    fn timestamp(&self) -> Duration {
        self.timestamp
    }

    fn duration(&self) -> Duration {
        let samples = (self.data.len() / BYTES_PER_SAMPLE) as u64;
        Duration::from_micros(samples * 1_000_000 / self.sample_rate.hz() as u64)
    }

    fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }
}

#[derive(Clone, Copy, Debug)]
pub struct StreamOptions {
    pub sample_rate: SampleRate,
    pub chunk_duration: Duration,
    pub read_timeout: Duration,
}

impl StreamOptions {
    pub fn chunk_bytes(&self) -> usize {
        let samples = self.sample_rate.hz() as u128 * self.chunk_duration.as_millis() / 1000;
        samples as usize * BYTES_PER_SAMPLE
    }
}

/// Chunks any byte source that can be moved onto a reader thread.
pub struct ReaderStream {
    rx: Receiver<std::io::Result<Vec<u8>>>,
    pending: Vec<u8>,
    closed: bool,
    chunk_index: u32,
    options: StreamOptions,
}

impl ReaderStream {
    pub fn spawn<R>(mut source: R, options: StreamOptions) -> Result<Self>
    where
        R: Read + Send + 'static,
    {
        let (tx, rx) = mpsc::sync_channel(CHANNEL_BLOCKS);

        thread::Builder::new()
            .name("audio-reader".into())
            .spawn(move || {
                let mut block = vec![0u8; READ_BLOCK];
                loop {
                    let sent = match source.read(&mut block) {
                        Ok(0) => break,
                        Ok(n) => tx.send(Ok(block[..n].to_vec())),
                        Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                        Err(e) => {
                            let _ = tx.send(Err(e));
                            break;
                        }
                    };
                    if sent.is_err() {
                        // consumer dropped
                        break;
                    }
                }
                log::debug!("Audio source exhausted");
            })
            .context("Failed to spawn audio reader thread")?;

        Ok(Self {
            rx,
            pending: Vec::new(),
            closed: false,
            chunk_index: 0,
            options,
        })
    }

    fn fill(&mut self, target: usize) -> Result<()> {
        while self.pending.len() < target && !self.closed {
            match self.rx.recv_timeout(self.options.read_timeout) {
                Ok(Ok(block)) => self.pending.extend_from_slice(&block),
                Ok(Err(e)) => return Err(e).context("Failed to read audio source"),
                Err(RecvTimeoutError::Timeout) => {
                    log::debug!(
                        "Audio source stalled; returning {} of {} bytes",
                        self.pending.len(),
                        target
                    );
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => self.closed = true,
            }
        }
        Ok(())
    }
}

impl AudioStream for ReaderStream {
    fn next_chunk(&mut self) -> Result<Option<Box<dyn Chunk>>> {
        let target = self.options.chunk_bytes();
        self.fill(target)?;

        if self.pending.is_empty() && self.closed {
            return Ok(None);
        }

        let mut take = self.pending.len().min(target);
        if !self.closed {
            // keep later chunks sample-aligned
            take -= take % BYTES_PER_SAMPLE;
        }
        let rest = self.pending.split_off(take);
        let data = std::mem::replace(&mut self.pending, rest);

        let timestamp = self.options.chunk_duration * self.chunk_index;
        self.chunk_index += 1;

        Ok(Some(Box::new(PcmChunk::new(
            data,
            timestamp,
            self.options.sample_rate,
        ))))
    }
}
