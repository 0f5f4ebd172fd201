//! Blocking client for the remote recognition service.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::audio::stream::Chunk;
use crate::config::ServiceConfig;
use crate::fingerprint::{encode_to_uri, PeakExtractor, Signature, SignatureError};

use super::song::Song;

const TAG_ENDPOINT: &str = "https://amp.shazam.com/discovery/v5";
const TAG_QUERY: &str = "sync=true&webv3=true&sampling=true&connected=&shazamapiversion=v3\
    &sharehub=true&hubv5minorversion=v5.1&hidelb=true&video=v3";

#[derive(Error, Debug)]
pub enum RecognizeError {
    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status code: {0}")]
    Status(u16),

    #[error("Failed to decode response: {0}")]
    Reply(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct RecognizeRequest<'a> {
    signature: SignatureUri<'a>,
    samplems: u64,
}

#[derive(Serialize)]
struct SignatureUri<'a> {
    uri: &'a str,
}

#[derive(Deserialize)]
struct RecognizeReply {
    track: Option<Track>,
}

#[derive(Deserialize)]
struct Track {
    title: Option<String>,
    subtitle: Option<String>,
    images: Option<Images>,
    #[serde(default)]
    sections: Vec<Section>,
}

#[derive(Deserialize)]
struct Images {
    coverart: Option<String>,
}

#[derive(Deserialize)]
struct Section {
    #[serde(default)]
    metadata: Vec<MetadataEntry>,
}

#[derive(Deserialize)]
struct MetadataEntry {
    title: Option<String>,
    text: Option<String>,
}

pub struct RecognitionClient {
    http: reqwest::blocking::Client,
    url: String,
    user_agent: String,
    min_magnitude: f64,
}

impl RecognitionClient {
    /// Create a client bound to a fresh session URL.
    pub fn new(service: &ServiceConfig, min_magnitude: f64) -> Result<Self, RecognizeError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(service.timeout_secs))
            .build()?;
        let url = session_url(service, Uuid::new_v4(), Uuid::new_v4());
        log::debug!("Recognition session: {}", url);

        Ok(Self {
            http,
            url,
            user_agent: service.user_agent.clone(),
            min_magnitude,
        })
    }

    pub fn session_url(&self) -> &str {
        &self.url
    }

    /// Fingerprint a chunk and ask the service what is playing.
    ///
    /// `Ok(None)` means the service answered but found no match.
    pub fn recognize(&self, chunk: &dyn Chunk) -> Result<Option<Song>, RecognizeError> {
        let signature = PeakExtractor::new(chunk.sample_rate())
            .with_min_magnitude(self.min_magnitude)
            .signature(chunk.audio_data())?;
        self.recognize_signature(&signature, chunk.timestamp())
    }

    pub fn recognize_signature(
        &self,
        signature: &Signature,
        found_at: Duration,
    ) -> Result<Option<Song>, RecognizeError> {
        let body = request_body(signature)?;

        let response = self
            .http
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .body(body)
            .send()?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(RecognizeError::Status(status.as_u16()));
        }

        let text = response.text()?;
        parse_reply(&text, found_at)
    }
}

fn session_url(service: &ServiceConfig, first: Uuid, second: Uuid) -> String {
    format!(
        "{}/{}/{}/{}/-/tag/{}/{}?{}",
        TAG_ENDPOINT,
        service.language,
        service.country,
        service.device,
        first.hyphenated(),
        second.hyphenated(),
        TAG_QUERY
    )
}

fn request_body(signature: &Signature) -> Result<String, RecognizeError> {
    let uri = encode_to_uri(signature)?;
    let request = RecognizeRequest {
        signature: SignatureUri { uri: &uri },
        samplems: signature.duration_ms(),
    };
    Ok(serde_json::to_string(&request)?)
}

fn parse_reply(body: &str, found_at: Duration) -> Result<Option<Song>, RecognizeError> {
    let reply: RecognizeReply = serde_json::from_str(body)?;
    let Some(track) = reply.track else {
        return Ok(None);
    };

    let album = track
        .sections
        .iter()
        .flat_map(|s| &s.metadata)
        .find(|m| m.title.as_deref() == Some("Album"))
        .and_then(|m| m.text.clone());

    Ok(Some(Song {
        title: track.title,
        artist: track.subtitle,
        album,
        cover_art: track.images.and_then(|i| i.coverart),
        found_at,
    }))
}
