// Forward-only byte cursor and chunk header grammar
use std::fmt;

use crate::error::{Error, Result};

/// Four-character chunk code
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FourCc(pub [u8; 4]);

impl FourCc {
    pub const RIFF: FourCc = FourCc(*b"RIFF");
    pub const LIST: FourCc = FourCc(*b"LIST");

    pub const fn new(code: [u8; 4]) -> Self {
        Self(code)
    }

    /// True for the identifiers whose payload starts with a form type.
    pub fn is_list_like(&self) -> bool {
        *self == Self::LIST || *self == Self::RIFF
    }
}

impl fmt::Display for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{:02x}", b)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FourCc(\"{}\")", self)
    }
}

impl PartialEq<[u8; 4]> for FourCc {
    fn eq(&self, other: &[u8; 4]) -> bool {
        self.0 == *other
    }
}

/// Chunk header: identifier plus content length (header excluded)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub id: FourCc,
    pub len: u32,
}

impl ChunkHeader {
    pub const SIZE: u32 = 8;

    pub fn is_list(&self) -> bool {
        self.id.is_list_like()
    }

    /// Length of the content a nested decoder sees once the form type of a
    /// list-like chunk has been consumed.
    pub fn content_len(&self) -> u32 {
        if self.is_list() {
            self.len.saturating_sub(4)
        } else {
            self.len
        }
    }
}

#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn read_fourcc(&mut self) -> Result<FourCc> {
        let bytes = self.take::<4>().ok_or(Error::TruncatedIdentifier { offset: self.pos })?;
        Ok(FourCc(bytes))
    }

    pub fn read_len(&mut self) -> Result<u32> {
        let bytes = self.take::<4>().ok_or(Error::TruncatedLength { offset: self.pos })?;
        Ok(u32::from_le_bytes(bytes))
    }

    pub fn read_header(&mut self) -> Result<ChunkHeader> {
        let id = self.read_fourcc()?;
        let len = self.read_len()?;
        Ok(ChunkHeader { id, len })
    }

    pub fn read_slice(&mut self, len: usize) -> Result<&'a [u8]> {
        self.check(len)?;
        let s = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(s)
    }

    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.check(len)?;
        self.pos += len;
        Ok(())
    }

    /// Consume the alignment byte after `content_len` bytes of content.
    /// Writers commonly drop the pad after the final chunk, so running out of
    /// data here is not an error.
    pub fn skip_padding(&mut self, content_len: u32) -> u32 {
        if content_len % 2 == 1 && !self.is_empty() {
            self.pos += 1;
        }
        content_len % 2
    }

    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes: [u8; N] = self.data.get(self.pos..self.pos + N)?.try_into().ok()?;
        self.pos += N;
        Some(bytes)
    }

    fn check(&self, len: usize) -> Result<()> {
        if len > self.remaining() {
            return Err(Error::InsufficientData {
                offset: self.pos,
                needed: len,
                available: self.remaining(),
            });
        }
        Ok(())
    }
}

const MAX_VARINT_LEN64: usize = 10;

/// LEB128 decode of an unsigned integer from the front of `buf`.
///
/// Returns the value and the number of bytes consumed, or `None` when `buf`
/// ends inside the varint or the value overflows 64 bits.
pub fn uvarint(buf: &[u8]) -> Option<(u64, usize)> {
    let mut x: u64 = 0;
    let mut shift = 0u32;
    for (i, &b) in buf.iter().enumerate() {
        if i == MAX_VARINT_LEN64 {
            return None;
        }
        if b < 0x80 {
            if i == MAX_VARINT_LEN64 - 1 && b > 1 {
                return None;
            }
            return Some((x | ((b as u64) << shift), i + 1));
        }
        x |= ((b & 0x7F) as u64) << shift;
        shift += 7;
    }
    None
}

/// Zig-zag signed counterpart of [`uvarint`].
pub fn varint(buf: &[u8]) -> Option<(i64, usize)> {
    let (ux, n) = uvarint(buf)?;
    let mut x = (ux >> 1) as i64;
    if ux & 1 != 0 {
        x = !x;
    }
    Some((x, n))
}
