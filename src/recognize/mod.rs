pub mod client;
pub mod song;

pub use client::{RecognitionClient, RecognizeError};
pub use song::Song;
