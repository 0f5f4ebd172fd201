//! Audio fingerprinting client.
//!
//! [`fingerprint`] turns s16le mono PCM windows into compact spectral-peak
//! signatures and serializes them to the binary signature format and its
//! data-URI form. [`audio`] supplies those windows from files or live byte
//! streams, and [`recognize`] submits signatures to the recognition service.

pub mod audio;
pub mod config;
pub mod fingerprint;
pub mod recognize;
