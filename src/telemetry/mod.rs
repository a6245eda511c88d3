pub mod wire;
pub mod decoder;
pub mod summary;

pub use wire::{parse_document, DecodeError, RawDocument, WireEye};
pub use decoder::{decode, decode_eye};
pub use summary::{describe_errors, NO_CR_TEXT, NO_DATA_TEXT, NO_P4_TEXT};
