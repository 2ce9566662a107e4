//! Decoder and encoder runtime configuration.
pub use decoder::{DecoderFlags, DecoderOptions};
pub use encoder::EncoderOptions;

mod decoder;
mod encoder;
