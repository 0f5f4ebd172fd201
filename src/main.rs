mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Duration;

use cli::{Cli, Command};
use earmark::audio::{self, stream::{AudioStream, Chunk, ReaderStream, StreamOptions}};
use earmark::config::{self, Config};
use earmark::fingerprint::constants::DATA_URI_PREFIX;
use earmark::fingerprint::{
    self, FrequencyBand, PeakExtractor, SampleRate, Signature, SignatureError,
};
use earmark::recognize::{RecognitionClient, RecognizeError};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    // Load config: explicit --config path, or auto-detect earmark.toml / global config
    let config_path = cli.config.clone().or_else(|| {
        let local = PathBuf::from("earmark.toml");
        if local.exists() {
            return Some(local);
        }
        if let Some(home) = dirs::home_dir() {
            let xdg = home.join(".config").join("earmark").join("config.toml");
            if xdg.exists() {
                return Some(xdg);
            }
        }
        if let Some(config_dir) = dirs::config_dir() {
            let platform = config_dir.join("earmark").join("config.toml");
            if platform.exists() {
                return Some(platform);
            }
        }
        None
    });
    let mut cfg = Config::default();
    if let Some(ref path) = config_path {
        if let Some(loaded) = config::load_config(path) {
            log::info!("Loaded config from {}", path.display());
            cfg = loaded;
        } else {
            log::warn!("Failed to load config from {}", path.display());
        }
    }

    // CLI flags win over the config file
    if let Some(rate) = cli.sample_rate {
        cfg.audio.sample_rate = rate;
    }
    if let Some(seconds) = cli.chunk_seconds {
        cfg.audio.chunk_seconds = seconds;
    }
    if let Some(min) = cli.min_magnitude {
        cfg.extractor.min_magnitude = min;
    }

    let sample_rate = SampleRate::from_hz(cfg.audio.sample_rate).with_context(|| {
        format!(
            "Unsupported sample rate {}Hz (use 8000, 16000, 32000, 44100 or 48000)",
            cfg.audio.sample_rate
        )
    })?;
    if cfg.audio.chunk_seconds == 0 {
        anyhow::bail!("Chunk length must be at least one second");
    }
    let options = StreamOptions {
        sample_rate,
        chunk_duration: Duration::from_secs(cfg.audio.chunk_seconds),
        read_timeout: Duration::from_millis(cfg.audio.read_timeout_ms),
    };

    match cli.command {
        Command::Fingerprint {
            input,
            uri_only,
            json,
        } => run_fingerprint(&input, options, &cfg, uri_only, json),
        Command::Inspect {
            signature,
            peaks,
            json,
        } => run_inspect(&signature, peaks, json),
        Command::Recognize {
            input,
            all,
            max_windows,
            json,
        } => run_recognize(&input, options, &cfg, all, max_windows, json),
    }
}

fn open_stream(input: &Path, options: StreamOptions) -> Result<Box<dyn AudioStream>> {
    if input.as_os_str() == "-" {
        log::info!("Reading s16le mono PCM at {} from stdin", options.sample_rate);
        return Ok(Box::new(ReaderStream::spawn(std::io::stdin(), options)?));
    }

    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }
    let pcm = audio::decode::load_pcm(input, options.sample_rate)?;
    Ok(Box::new(ReaderStream::spawn(std::io::Cursor::new(pcm), options)?))
}

fn run_fingerprint(
    input: &Path,
    options: StreamOptions,
    cfg: &Config,
    uri_only: bool,
    json: bool,
) -> Result<()> {
    log::info!("Input: {}", input.display());
    let mut stream = open_stream(input, options)?;

    let mut chunks: Vec<Box<dyn Chunk>> = Vec::new();
    while let Some(chunk) = stream.next_chunk()? {
        chunks.push(chunk);
    }
    log::info!("Fingerprinting {} windows...", chunks.len());

    let extractor = PeakExtractor::new(options.sample_rate)
        .with_min_magnitude(cfg.extractor.min_magnitude);
    let results: Vec<(Duration, Result<(Signature, String), SignatureError>)> = chunks
        .into_par_iter()
        .map(|chunk| {
            let result = extractor.signature(chunk.audio_data()).and_then(|sig| {
                let uri = fingerprint::encode_to_uri(&sig)?;
                Ok((sig, uri))
            });
            (chunk.timestamp(), result)
        })
        .collect();

    for (timestamp, result) in results {
        let (sig, uri) = match result {
            Ok(pair) => pair,
            Err(SignatureError::EmptyInput) => {
                log::warn!("Skipping empty window at {}", format_time(timestamp));
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        if json {
            let line = serde_json::json!({
                "timestamp_ms": timestamp.as_millis() as u64,
                "samplems": sig.duration_ms(),
                "peaks": sig.peak_count(),
                "uri": uri,
            });
            println!("{}", line);
        } else if uri_only {
            println!("{}", uri);
        } else {
            println!("{}  {} peaks  {}", format_time(timestamp), sig.peak_count(), uri);
        }
    }

    Ok(())
}

fn run_inspect(input: &str, show_peaks: bool, json: bool) -> Result<()> {
    let sig = if input.starts_with(DATA_URI_PREFIX) {
        fingerprint::decode_from_uri(input)?
    } else {
        let path = Path::new(input);
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read signature: {}", path.display()))?;
        if bytes.starts_with(DATA_URI_PREFIX.as_bytes()) {
            let text = String::from_utf8(bytes).context("Signature URI is not UTF-8")?;
            fingerprint::decode_from_uri(text.trim())?
        } else {
            fingerprint::decode(&bytes)?
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&sig)?);
        return Ok(());
    }

    println!("Sample rate: {}", sig.sample_rate);
    println!(
        "Samples:     {} ({:.2}s)",
        sig.sample_count,
        sig.sample_count as f64 / sig.sample_rate_hz() as f64
    );
    println!("Peaks:       {}", sig.peak_count());
    for band in FrequencyBand::ALL {
        let peaks = sig.peaks(band);
        if peaks.is_empty() {
            continue;
        }
        println!("  {:<10} {} peaks", band.label(), peaks.len());
        if show_peaks {
            for peak in peaks {
                println!(
                    "    pass {:>5}  {:>8.2}s  {:>9.2}Hz  mag {:>5}  amp {:.5}",
                    peak.pass,
                    peak.seconds(),
                    peak.frequency_hz(),
                    peak.magnitude,
                    peak.amplitude_pcm()
                );
            }
        }
    }

    Ok(())
}

fn run_recognize(
    input: &Path,
    options: StreamOptions,
    cfg: &Config,
    all: bool,
    max_windows: Option<usize>,
    json: bool,
) -> Result<()> {
    log::info!("Input: {}", input.display());
    let client = RecognitionClient::new(&cfg.service, cfg.extractor.min_magnitude)
        .context("Failed to create recognition client")?;
    let mut stream = open_stream(input, options)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("[{elapsed_precise}] {spinner} {msg}")
            .context("Invalid progress template")?,
    );
    pb.enable_steady_tick(Duration::from_millis(120));

    let mut windows = 0usize;
    let mut found = 0usize;

    while !window_limit_reached(windows, max_windows) {
        let Some(chunk) = stream.next_chunk()? else {
            break;
        };
        windows += 1;
        pb.set_message(format!(
            "window {} at {} ({:.1}s)",
            windows,
            format_time(chunk.timestamp()),
            chunk.duration().as_secs_f32()
        ));

        match client.recognize(chunk.as_ref()) {
            Ok(Some(song)) => {
                found += 1;
                if json {
                    pb.println(serde_json::to_string(&song)?);
                } else {
                    pb.println(song.to_string());
                }
                if !all {
                    break;
                }
            }
            Ok(None) => log::debug!("No match at {}", format_time(chunk.timestamp())),
            Err(RecognizeError::Signature(SignatureError::EmptyInput)) => {
                log::warn!("Skipping empty window at {}", format_time(chunk.timestamp()));
            }
            Err(e) => log::warn!("Recognition failed at {}: {}", format_time(chunk.timestamp()), e),
        }
    }

    pb.finish_and_clear();
    if found == 0 {
        log::info!("No match in {} windows", windows);
    }
    Ok(())
}

fn format_time(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn window_limit_reached(windows: usize, max_windows: Option<usize>) -> bool {
    max_windows.is_some_and(|max| windows >= max)
}
