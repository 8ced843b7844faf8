// Decoder error types

use thiserror::Error;

use crate::cursor::FourCc;

/// Errors produced while walking or decoding a chunk stream
#[derive(Error, Debug)]
pub enum Error {
    #[error("not a RIFF container: found {found} at offset 0")]
    NotAContainer { found: FourCc },

    #[error("truncated chunk identifier at {offset:#x}")]
    TruncatedIdentifier { offset: usize },

    #[error("truncated chunk length at {offset:#x}")]
    TruncatedLength { offset: usize },

    #[error("insufficient data at {offset:#x}: need {needed} bytes, {available} available")]
    InsufficientData {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("expected LIST chunk, found {found} at {offset:#x}")]
    ExpectedListChunk { found: FourCc, offset: usize },

    #[error("invalid chunk length {found}, expected {expected}")]
    InvalidLength { expected: u32, found: u32 },

    #[error("varint decode failed at {offset:#x}")]
    DecodeFailure { offset: usize },

    #[error("unsupported destination type: {type_name}")]
    UnsupportedDestinationType { type_name: &'static str },

    #[error("unsupported sequence element type: {type_name}")]
    UnsupportedElementType { type_name: &'static str },

    #[error("chunk nesting exceeds max depth {max_depth}")]
    DepthExceeded { max_depth: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
