// Read-only chunk tree walk, independent of any destination type
use std::fmt::{self, Write as _};

use tracing::trace;

use crate::cursor::{ChunkHeader, Cursor, FourCc};
use crate::decode::DecodeOptions;
use crate::error::{Error, Result};

/// Every chunk of a `RIFF` buffer, borrowed from the input
#[derive(Debug, Clone)]
pub struct Tree<'a> {
    pub form: FourCc,
    pub len: u32,
    pub chunks: Vec<Chunk<'a>>,
}

#[derive(Debug, Clone)]
pub struct Chunk<'a> {
    pub id: FourCc,
    /// Offset of the chunk header in the input
    pub offset: usize,
    pub len: u32,
    pub body: Body<'a>,
}

#[derive(Debug, Clone)]
pub enum Body<'a> {
    List { form: FourCc, children: Vec<Chunk<'a>> },
    Leaf(&'a [u8]),
}

pub fn read_tree<'a>(data: &'a [u8], opts: &DecodeOptions) -> Result<Tree<'a>> {
    let mut cursor = Cursor::new(data);
    let marker = cursor.read_fourcc()?;
    if marker != FourCc::RIFF {
        return Err(Error::NotAContainer { found: marker });
    }
    let len = cursor.read_len()?;
    let form = cursor.read_fourcc()?;
    let chunks = read_chunks(&mut cursor, len.saturating_sub(4), 0, opts)?;
    Ok(Tree { form, len, chunks })
}

fn read_chunks<'a>(
    cursor: &mut Cursor<'a>,
    budget: u32,
    depth: usize,
    opts: &DecodeOptions,
) -> Result<Vec<Chunk<'a>>> {
    if depth > opts.max_depth {
        return Err(Error::DepthExceeded {
            max_depth: opts.max_depth,
        });
    }
    let mut out = Vec::new();
    let mut remaining = i64::from(budget);
    while remaining >= i64::from(ChunkHeader::SIZE) && !cursor.is_empty() {
        let offset = cursor.pos();
        let header = cursor.read_header()?;
        trace!(id = %header.id, len = header.len, offset, "chunk");
        let body = if header.is_list() {
            let form = cursor.read_fourcc()?;
            let children = read_chunks(cursor, header.content_len(), depth + 1, opts)?;
            Body::List { form, children }
        } else {
            Body::Leaf(cursor.read_slice(header.len as usize)?)
        };
        let pad = cursor.skip_padding(header.len);
        remaining -= i64::from(ChunkHeader::SIZE) + i64::from(header.len) + i64::from(pad);
        out.push(Chunk {
            id: header.id,
            offset,
            len: header.len,
            body,
        });
    }
    Ok(out)
}

impl Tree<'_> {
    /// Count of chunks at every level
    pub fn chunk_count(&self) -> usize {
        fn count(chunks: &[Chunk<'_>]) -> usize {
            chunks
                .iter()
                .map(|c| match &c.body {
                    Body::List { children, .. } => 1 + count(children),
                    Body::Leaf(_) => 1,
                })
                .sum()
        }
        count(&self.chunks)
    }

    /// First chunk with `id`, searched depth-first
    pub fn find(&self, id: FourCc) -> Option<&Chunk<'_>> {
        fn find<'t, 'a>(chunks: &'t [Chunk<'a>], id: FourCc) -> Option<&'t Chunk<'a>> {
            for c in chunks {
                if c.id == id {
                    return Some(c);
                }
                if let Body::List { children, .. } = &c.body
                    && let Some(hit) = find(children, id)
                {
                    return Some(hit);
                }
            }
            None
        }
        find(&self.chunks, id)
    }

    pub fn pretty(&self) -> String {
        let mut out = String::new();
        writeln!(out, "RIFF '{}' ({} bytes)", self.form, self.len).ok();
        for c in &self.chunks {
            fmt_chunk(c, 2, &mut out).ok();
        }
        out
    }
}

fn fmt_chunk(c: &Chunk<'_>, indent: usize, out: &mut String) -> fmt::Result {
    let pad = " ".repeat(indent);
    match &c.body {
        Body::List { form, children } => {
            writeln!(out, "{pad}{} '{}' ({} bytes) @{:#x}", c.id, form, c.len, c.offset)?;
            for child in children {
                fmt_chunk(child, indent + 2, out)?;
            }
            Ok(())
        }
        Body::Leaf(data) => writeln!(
            out,
            "{pad}{} ({} bytes) @{:#x}{}",
            c.id,
            data.len(),
            c.offset,
            if c.len % 2 == 1 { " +pad" } else { "" }
        ),
    }
}
