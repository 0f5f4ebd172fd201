use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "earmark", about = "Audio fingerprinting and song recognition client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Config file (defaults to earmark.toml or the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Analysis sample rate in Hz (8000, 16000, 32000, 44100, 48000)
    #[arg(long, global = true)]
    pub sample_rate: Option<u32>,

    /// Length of each fingerprinted window in seconds
    #[arg(long, global = true)]
    pub chunk_seconds: Option<u64>,

    /// Minimum FFT magnitude for a spectral peak
    #[arg(long, global = true)]
    pub min_magnitude: Option<f64>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the signature of every window of an audio file
    Fingerprint {
        /// Audio file (WAV, MP3, FLAC, OGG, raw s16le) or `-` for s16le on stdin
        input: PathBuf,

        /// Print only the data URIs
        #[arg(long, conflicts_with = "json")]
        uri_only: bool,

        /// Print one JSON object per window
        #[arg(long)]
        json: bool,
    },

    /// Decode a signature data URI or binary signature file
    Inspect {
        /// Data URI, or path to a file holding one or a raw binary signature
        signature: String,

        /// List every peak
        #[arg(long)]
        peaks: bool,

        /// Print the decoded signature as JSON
        #[arg(long)]
        json: bool,
    },

    /// Identify the song playing in an audio file or stream
    Recognize {
        /// Audio file (WAV, MP3, FLAC, OGG, raw s16le) or `-` for s16le on stdin
        input: PathBuf,

        /// Keep going after the first match
        #[arg(long)]
        all: bool,

        /// Stop after this many windows
        #[arg(long)]
        max_windows: Option<usize>,

        /// Print matches as JSON
        #[arg(long)]
        json: bool,
    },
}
