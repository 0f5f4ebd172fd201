use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// A track identified by the recognition service.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Song {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub cover_art: Option<String>,
    /// Stream position of the chunk that matched.
    #[serde(rename = "found_at_ms", serialize_with = "as_millis")]
    pub found_at: Duration,
}

fn as_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

impl fmt::Display for Song {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.found_at.as_secs();
        write!(
            f,
            "[{:02}:{:02}] {} - {}",
            secs / 60,
            secs % 60,
            self.artist.as_deref().unwrap_or("Unknown artist"),
            self.title.as_deref().unwrap_or("Unknown title")
        )?;
        if let Some(ref album) = self.album {
            write!(f, " ({})", album)?;
        }
        Ok(())
    }
}
