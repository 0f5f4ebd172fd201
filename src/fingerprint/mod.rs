pub mod band;
pub mod codec;
pub mod constants;
pub mod error;
pub mod extractor;
pub mod peak;
pub mod signature;

pub use band::FrequencyBand;
pub use codec::{decode, decode_from_uri, encode, encode_to_uri};
pub use error::SignatureError;
pub use extractor::PeakExtractor;
pub use peak::FrequencyPeak;
pub use signature::{SampleRate, Signature};
