pub mod decoder;
pub mod encoder;
pub mod format;

pub use decoder::{decode, parse, DecodeError, DecodedImage};
pub use encoder::{encode, EncodeError};
