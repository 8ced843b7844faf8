//! riffle-core: decode RIFF-style chunk streams into annotated Rust types
//!
//! The crate keeps a small surface:
//! - Forward-only byte cursor and chunk header reader
//! - Recursive decoder that binds chunks to record fields, record sequences
//!   and scalar payloads (`#[derive(ChunkRecord)]` / `#[derive(FixedLayout)]`)
//! - Read-only chunk tree walk with text and JSON dumps for CLI use
//!
pub mod cursor;
pub mod decode;
pub mod error;
pub mod json;
pub mod shape;
pub mod tree;

pub use cursor::{ChunkHeader, Cursor, FourCc};
pub use decode::{DecodeOptions, Decoder, decode, decode_file, decode_with};
pub use error::{Error, Result};
pub use riffle_derive::{ChunkRecord, FixedLayout};
pub use shape::{Collection, Destination, Element, FieldDescriptor, Record, Slot, fixed_slot};
pub use tree::{Body, Chunk, Tree, read_tree};
