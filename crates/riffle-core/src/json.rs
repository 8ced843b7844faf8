use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use walkdir::WalkDir;

use crate::decode::DecodeOptions;
use crate::error::Result;
use crate::tree::{Body, Chunk, Tree, read_tree};

/// Extensions treated as RIFF containers when dumping a directory
pub const RIFF_EXTENSIONS: &[&str] = &["wav", "avi", "rmi", "sf2", "dls", "webp", "ani", "riff"];

#[derive(Clone, Copy, Debug)]
pub struct JsonOpts {
    pub max_depth: usize,
    pub bytes_summary: bool,
    /// Render printable leaf payloads as a `text` field
    pub text_preview: bool,
}

impl Default for JsonOpts {
    fn default() -> Self {
        Self {
            max_depth: 16,
            bytes_summary: true,
            text_preview: true,
        }
    }
}

pub fn tree_to_json_value(tree: &Tree<'_>, opts: JsonOpts) -> serde_json::Value {
    fn write_chunk(c: &Chunk<'_>, depth: usize, opts: &JsonOpts) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        map.insert("id".to_string(), json!(c.id.to_string()));
        map.insert("offset".to_string(), json!(c.offset));
        map.insert("len".to_string(), json!(c.len));
        match &c.body {
            Body::List { form, children } => {
                map.insert("form".to_string(), json!(form.to_string()));
                let kids = if depth >= opts.max_depth {
                    json!({"$truncated": true, "$omitted": children.len()})
                } else {
                    serde_json::Value::Array(
                        children
                            .iter()
                            .map(|k| write_chunk(k, depth + 1, opts))
                            .collect(),
                    )
                };
                map.insert("children".to_string(), kids);
            }
            Body::Leaf(data) => {
                if opts.text_preview
                    && let Some(text) = printable_text(data)
                {
                    map.insert("text".to_string(), json!(text));
                }
                let bytes = if opts.bytes_summary {
                    json!({"$type": "bytes", "len": data.len()})
                } else {
                    json!(data)
                };
                map.insert("data".to_string(), bytes);
            }
        }
        serde_json::Value::Object(map)
    }

    json!({
        "$form": tree.form.to_string(),
        "len": tree.len,
        "chunks": tree
            .chunks
            .iter()
            .map(|c| write_chunk(c, 1, &opts))
            .collect::<Vec<_>>(),
    })
}

// Leaf payloads like INFO strings are NUL-terminated ASCII.
fn printable_text(data: &[u8]) -> Option<&str> {
    let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    let (text, rest) = data.split_at(end);
    if text.is_empty()
        || rest.iter().any(|&b| b != 0)
        || !text.iter().all(|b| b.is_ascii_graphic() || *b == b' ')
    {
        return None;
    }
    std::str::from_utf8(text).ok()
}

pub fn parse_file_to_json_value(
    path: &Path,
    decode_opts: &DecodeOptions,
    opts: JsonOpts,
) -> Result<serde_json::Value> {
    let data = fs::read(path)?;
    let tree = read_tree(&data, decode_opts)?;
    Ok(tree_to_json_value(&tree, opts))
}

pub fn dump_file_json(path: &Path, decode_opts: &DecodeOptions, opts: JsonOpts) -> Result<String> {
    let v = parse_file_to_json_value(path, decode_opts, opts)?;
    Ok(serde_json::to_string_pretty(&v)?)
}

// Directory helpers
pub fn find_riff_files(dir: &Path) -> Vec<PathBuf> {
    let mut out: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .flatten()
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .and_then(|s| s.to_str())
                .is_some_and(|ext| RIFF_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        })
        .collect();
    out.sort();
    out
}

/// Map of file path (relative to `dir`) to its dump, or `{"$error": ...}`.
pub fn dump_dir_map_json(dir: &Path, decode_opts: &DecodeOptions, opts: JsonOpts) -> Result<String> {
    let mut map = serde_json::Map::new();
    for f in find_riff_files(dir) {
        let name = f
            .strip_prefix(dir)
            .unwrap_or(&f)
            .to_string_lossy()
            .replace('\\', "/");
        let v = match parse_file_to_json_value(&f, decode_opts, opts) {
            Ok(v) => v,
            Err(e) => json!({"$error": e.to_string()}),
        };
        map.insert(name, v);
    }
    Ok(serde_json::to_string_pretty(&serde_json::Value::Object(map))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info_riff() -> Vec<u8> {
        let mut w = Vec::new();
        w.extend_from_slice(b"RIFF");
        w.extend_from_slice(&28u32.to_le_bytes());
        w.extend_from_slice(b"WAVE");
        w.extend_from_slice(b"LIST");
        w.extend_from_slice(&16u32.to_le_bytes());
        w.extend_from_slice(b"INFO");
        w.extend_from_slice(b"INAM");
        w.extend_from_slice(&4u32.to_le_bytes());
        w.extend_from_slice(b"Hi!\0");
        w
    }

    #[test]
    fn json_shape() {
        let data = info_riff();
        let tree = read_tree(&data, &DecodeOptions::default()).unwrap();
        let v = tree_to_json_value(&tree, JsonOpts::default());
        assert_eq!(v["$form"], json!("WAVE"));
        assert_eq!(v.pointer("/chunks/0/form"), Some(&json!("INFO")));
        assert_eq!(v.pointer("/chunks/0/children/0/text"), Some(&json!("Hi!")));
        assert_eq!(
            v.pointer("/chunks/0/children/0/data"),
            Some(&json!({"$type": "bytes", "len": 4}))
        );
    }

    #[test]
    fn full_bytes_and_depth_cut() {
        let data = info_riff();
        let tree = read_tree(&data, &DecodeOptions::default()).unwrap();
        let opts = JsonOpts {
            max_depth: 1,
            bytes_summary: false,
            text_preview: false,
        };
        let v = tree_to_json_value(&tree, opts);
        assert_eq!(
            v.pointer("/chunks/0/children"),
            Some(&json!({"$truncated": true, "$omitted": 1}))
        );
        let opts = JsonOpts {
            bytes_summary: false,
            text_preview: false,
            ..JsonOpts::default()
        };
        let v = tree_to_json_value(&tree, opts);
        assert_eq!(
            v.pointer("/chunks/0/children/0/data"),
            Some(&json!([72, 105, 33, 0]))
        );
        assert!(v.pointer("/chunks/0/children/0/text").is_none());
    }

    #[test]
    fn printable_text_rules() {
        assert_eq!(printable_text(b"abc\0\0"), Some("abc"));
        assert_eq!(printable_text(b"abc"), Some("abc"));
        assert_eq!(printable_text(b"\0"), None);
        assert_eq!(printable_text(b"ab\0c"), None);
        assert_eq!(printable_text(&[0x01, 0x02]), None);
    }

    #[test]
    fn dir_dump_reports_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("good.wav"), info_riff()).unwrap();
        std::fs::write(dir.path().join("bad.wav"), b"nope").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();
        let s = dump_dir_map_json(dir.path(), &DecodeOptions::default(), JsonOpts::default())
            .unwrap();
        let v: serde_json::Value = serde_json::from_str(&s).unwrap();
        assert_eq!(v["good.wav"]["$form"], json!("WAVE"));
        assert!(v["bad.wav"]["$error"].as_str().unwrap().contains("not a RIFF"));
        assert!(v.get("notes.txt").is_none());
    }
}
