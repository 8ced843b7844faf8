// Recursive chunk-to-destination decoder
use std::fs;
use std::path::Path;

use tracing::{debug, trace, warn};

use crate::cursor::{ChunkHeader, Cursor, FourCc, uvarint, varint};
use crate::error::{Error, Result};
use crate::shape::{Collection, Destination, Record, Slot};

#[derive(Debug, Clone, Copy)]
pub struct DecodeOptions {
    pub max_depth: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self { max_depth: 64 }
    }
}

pub fn decode<T: Destination + ?Sized>(data: &[u8], dest: &mut T) -> Result<()> {
    decode_with(data, dest, &DecodeOptions::default())
}

pub fn decode_with<T: Destination + ?Sized>(
    data: &[u8],
    dest: &mut T,
    opts: &DecodeOptions,
) -> Result<()> {
    let mut decoder = Decoder::new(data, *opts);
    decoder.decode_root(dest.slot())
}

pub fn decode_file<T: Destination + ?Sized>(path: &Path, dest: &mut T) -> Result<()> {
    let data = fs::read(path)?;
    decode(&data, dest)
}

#[derive(Debug)]
pub struct Decoder<'a> {
    cursor: Cursor<'a>,
    opts: DecodeOptions,
}

impl<'a> Decoder<'a> {
    pub fn new(data: &'a [u8], opts: DecodeOptions) -> Self {
        Self {
            cursor: Cursor::new(data),
            opts,
        }
    }

    pub fn pos(&self) -> usize {
        self.cursor.pos()
    }

    pub fn decode_root(&mut self, slot: Slot<'_>) -> Result<()> {
        let marker = self.cursor.read_fourcc()?;
        if marker != FourCc::RIFF {
            return Err(Error::NotAContainer { found: marker });
        }
        let overall = self.cursor.read_len()?;
        let form = self.cursor.read_fourcc()?;
        debug!(%form, len = overall, dest = slot.kind(), "decoding RIFF stream");
        self.decode_slot(slot, overall.saturating_sub(4), 0)
    }

    pub fn decode_slot(&mut self, slot: Slot<'_>, len: u32, depth: usize) -> Result<()> {
        match slot {
            Slot::Record(record) => self.decode_record(record, len, depth),
            Slot::Collection(items) => self.decode_collection(items, len, depth),
            Slot::Fixed(bytes) => self.decode_fixed(bytes, len),
            Slot::Text(text) => {
                let raw = self.cursor.read_slice(len as usize)?;
                *text = match std::str::from_utf8(raw) {
                    Ok(s) => s.to_owned(),
                    // one char per byte, so the raw payload is never lost
                    Err(_) => raw.iter().map(|&b| char::from(b)).collect(),
                };
                Ok(())
            }
            Slot::Blob(blob) => {
                let raw = self.cursor.read_slice(len as usize)?;
                blob.clear();
                blob.extend_from_slice(raw);
                Ok(())
            }
            Slot::U32(value) => {
                *value = self.decode_u32(len)?;
                Ok(())
            }
            Slot::I64(value) => {
                *value = self.decode_i64(len)?;
                Ok(())
            }
            Slot::Unsupported(type_name) => Err(Error::UnsupportedDestinationType { type_name }),
            Slot::UnsupportedElement(type_name) => Err(Error::UnsupportedElementType { type_name }),
        }
    }

    /// Match chunks against the record's tagged fields until `len` bytes are
    /// spent. Unknown identifiers are skipped; after every chunk the field
    /// search restarts at the first field.
    pub fn decode_record(&mut self, record: &mut dyn Record, len: u32, depth: usize) -> Result<()> {
        self.enter(depth)?;
        let fields = record.fields();
        let mut remaining = i64::from(len);
        if remaining <= 0 {
            return Ok(());
        }
        let mut header = self.next_header(&mut remaining)?;
        let mut i = 0;
        while remaining > 0 {
            if fields.get(i).is_some_and(|f| f.id == header.id) {
                let content = header.content_len();
                trace!(id = %header.id, len = content, field = fields[i].name, "matched chunk");
                let start = self.cursor.pos();
                self.decode_slot(record.field_slot(i), content, depth + 1)?;
                self.finish_chunk(start, content);
                remaining -= i64::from(content) + i64::from(content % 2);
                if remaining <= 0 {
                    return Ok(());
                }
                header = self.next_header(&mut remaining)?;
                i = 0;
                continue;
            }
            i += 1;
            if i >= fields.len() {
                let content = header.content_len();
                trace!(id = %header.id, len = content, "skipping unknown chunk");
                self.cursor.skip(content as usize)?;
                let pad = self.cursor.skip_padding(content);
                remaining -= i64::from(content) + i64::from(pad);
                if remaining <= 0 {
                    return Ok(());
                }
                header = self.next_header(&mut remaining)?;
                i = 0;
            }
        }
        Ok(())
    }

    pub fn decode_collection(
        &mut self,
        items: &mut dyn Collection,
        len: u32,
        depth: usize,
    ) -> Result<()> {
        self.enter(depth)?;
        let mut remaining = i64::from(len);
        while remaining > 0 {
            let offset = self.cursor.pos();
            let header = self.cursor.read_header()?;
            if !header.is_list() {
                return Err(Error::ExpectedListChunk {
                    found: header.id,
                    offset,
                });
            }
            let form = self.cursor.read_fourcc()?;
            remaining -= 4;
            if remaining <= 0 {
                break;
            }
            remaining -= i64::from(ChunkHeader::SIZE);
            if remaining <= 0 {
                break;
            }
            let content = header.content_len();
            trace!(%form, len = content, element = items.element_type(), "decoding element");
            let start = self.cursor.pos();
            items.decode_element(&mut |element: &mut dyn Record| {
                self.decode_record(element, content, depth + 1)
            })?;
            self.finish_chunk(start, content);
            remaining -= i64::from(content) + i64::from(content % 2);
        }
        Ok(())
    }

    // Raw copy into a POD value. The chunk may be shorter than the value;
    // whatever it holds is copied and the rest of the value is left alone.
    fn decode_fixed(&mut self, bytes: &mut [u8], len: u32) -> Result<()> {
        let len = len as usize;
        let size = bytes.len();
        let take = size.min(len);
        let raw = self.cursor.read_slice(take)?;
        bytes[..take].copy_from_slice(raw);
        if take < size {
            warn!(
                offset = self.cursor.pos(),
                expected = size,
                got = take,
                "short fixed-layout chunk, tail left unset"
            );
        }
        self.cursor.skip(len - take)
    }

    // Fixed-width chunks are read through a varint decode, not a plain LE read.
    fn decode_u32(&mut self, len: u32) -> Result<u32> {
        if len != 4 {
            return Err(Error::InvalidLength {
                expected: 4,
                found: len,
            });
        }
        let offset = self.cursor.pos();
        let raw = self.cursor.read_slice(4)?;
        let (value, _) = uvarint(raw).ok_or(Error::DecodeFailure { offset })?;
        Ok(value as u32)
    }

    fn decode_i64(&mut self, len: u32) -> Result<i64> {
        if len != 8 {
            return Err(Error::InvalidLength {
                expected: 8,
                found: len,
            });
        }
        let offset = self.cursor.pos();
        let raw = self.cursor.read_slice(8)?;
        let (value, _) = varint(raw).ok_or(Error::DecodeFailure { offset })?;
        Ok(value)
    }

    // Read a header, consuming the form type of list-like chunks, and charge
    // both against the caller's budget.
    fn next_header(&mut self, remaining: &mut i64) -> Result<ChunkHeader> {
        let header = self.cursor.read_header()?;
        if header.is_list() {
            let _form = self.cursor.read_fourcc()?;
            *remaining -= 4;
        }
        *remaining -= i64::from(ChunkHeader::SIZE);
        Ok(header)
    }

    // A nested record that ends on an odd child has already eaten the pad
    // byte shared with its enclosing list, so only skip it when the cursor
    // stopped exactly at the end of the content.
    fn finish_chunk(&mut self, start: usize, content: u32) {
        if self.cursor.pos() == start + content as usize {
            self.cursor.skip_padding(content);
        }
    }

    fn enter(&self, depth: usize) -> Result<()> {
        if depth > self.opts.max_depth {
            return Err(Error::DepthExceeded {
                max_depth: self.opts.max_depth,
            });
        }
        Ok(())
    }
}
