//! Integrity-checked binary container for merged documents
//!
//! Layout (all integers little-endian):
//! ```text
//! magic      4   "CPAK"
//! flags      1   bit0 = separator present, bits 1-7 must be zero
//! sep_len    4   u32, only if bit0
//! separator  n   UTF-8, only if bit0
//! hash      32   SHA-256 of the content bytes
//! len        8   u64 content length
//! content    n   UTF-8
//! ```
//! Nothing may follow the content.

use crate::document::MergedDocument;
use crate::error::PackError;
use crate::hash::{hash_bytes, ContentHash, HASH_LEN};
use crate::Result;
use bytes::{Buf, BufMut};
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::debug;

const MAGIC: [u8; 4] = *b"CPAK";
const FLAG_SEPARATOR: u8 = 0b0000_0001;

/// Decoded container fields, before the content is verified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub separator: Option<String>,
    pub hash: ContentHash,
    /// Raw content bytes as stored
    pub content: Vec<u8>,
}

impl Container {
    /// Build a container for `doc`, computing its content hash
    pub fn seal(doc: &MergedDocument) -> Self {
        Self {
            separator: doc.separator.clone(),
            hash: hash_bytes(doc.content.as_bytes()),
            content: doc.content.as_bytes().to_vec(),
        }
    }

    /// Serialize to the on-disk layout
    pub fn encode(&self) -> Vec<u8> {
        encode_parts(self.separator.as_deref(), &self.hash, &self.content)
    }

    /// Parse the on-disk layout without checking the hash
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut buf = bytes;

        let magic = take(&mut buf, MAGIC.len(), "magic")?;
        if magic != MAGIC {
            return Err(PackError::Decode(format!(
                "bad magic bytes {:02x?}, expected {:02x?}",
                magic, MAGIC
            )));
        }

        let flags = take(&mut buf, 1, "flags")?[0];
        if flags & !FLAG_SEPARATOR != 0 {
            return Err(PackError::Decode(format!("unknown flag bits {:#010b}", flags)));
        }

        let separator = if flags & FLAG_SEPARATOR != 0 {
            ensure_remaining(buf, 4, "separator length")?;
            let len = buf.get_u32_le() as usize;
            let raw = take(&mut buf, len, "separator")?;
            let sep = std::str::from_utf8(raw)
                .map_err(|e| PackError::Decode(format!("separator is not UTF-8: {}", e)))?;
            Some(sep.to_string())
        } else {
            None
        };

        let mut digest = [0u8; HASH_LEN];
        digest.copy_from_slice(take(&mut buf, HASH_LEN, "hash")?);

        ensure_remaining(buf, 8, "content length")?;
        let len = usize::try_from(buf.get_u64_le())
            .map_err(|_| PackError::Decode("content length does not fit in memory".to_string()))?;
        let content = take(&mut buf, len, "content")?.to_vec();

        if buf.has_remaining() {
            return Err(PackError::Decode(format!(
                "{} trailing bytes after content",
                buf.remaining()
            )));
        }

        Ok(Self {
            separator,
            hash: ContentHash::from_bytes(digest),
            content,
        })
    }

    /// Check the stored hash and turn the container back into a document
    pub fn verify(self) -> Result<MergedDocument> {
        let actual = hash_bytes(&self.content);
        if actual != self.hash {
            return Err(PackError::Integrity {
                expected: self.hash,
                actual,
            });
        }

        let content = String::from_utf8(self.content)
            .map_err(|e| PackError::Decode(format!("content is not UTF-8: {}", e)))?;
        Ok(MergedDocument::new(self.separator, content))
    }
}

fn encode_parts(separator: Option<&str>, hash: &ContentHash, content: &[u8]) -> Vec<u8> {
    let sep_len = separator.map_or(0, |s| 4 + s.len());
    let mut out = Vec::with_capacity(MAGIC.len() + 1 + sep_len + HASH_LEN + 8 + content.len());

    out.put_slice(&MAGIC);
    match separator {
        Some(sep) => {
            out.put_u8(FLAG_SEPARATOR);
            out.put_u32_le(sep.len() as u32);
            out.put_slice(sep.as_bytes());
        }
        None => out.put_u8(0),
    }
    out.put_slice(hash.as_bytes());
    out.put_u64_le(content.len() as u64);
    out.put_slice(content);
    out
}

fn ensure_remaining(buf: &[u8], needed: usize, field: &str) -> Result<()> {
    if buf.len() < needed {
        return Err(PackError::Decode(format!(
            "truncated {}: need {} bytes, {} left",
            field,
            needed,
            buf.len()
        )));
    }
    Ok(())
}

fn take<'a>(buf: &mut &'a [u8], len: usize, field: &str) -> Result<&'a [u8]> {
    ensure_remaining(buf, len, field)?;
    let (head, tail) = buf.split_at(len);
    *buf = tail;
    Ok(head)
}

/// Write `doc` to `destination`, returning the stored content hash
///
/// Parent directories are created as needed. The bytes land in a temporary
/// file next to the destination which is synced and then renamed over it.
pub fn write(doc: &MergedDocument, destination: &Path) -> Result<ContentHash> {
    if destination.is_dir() {
        let err = std::io::Error::new(
            std::io::ErrorKind::Other,
            "destination is a directory, not a file",
        );
        return Err(PackError::io(destination, err));
    }

    let parent = match destination.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|e| PackError::io(parent, e))?;

    let hash = hash_bytes(doc.content.as_bytes());
    let bytes = encode_parts(doc.separator.as_deref(), &hash, doc.content.as_bytes());

    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(|e| PackError::io(parent, e))?;
    tmp.write_all(&bytes)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| PackError::io(tmp.path(), e))?;
    tmp.persist(destination)
        .map_err(|e| PackError::io(destination, e.error))?;

    debug!(
        path = %destination.display(),
        bytes = bytes.len(),
        hash = %hash,
        "Wrote container"
    );
    Ok(hash)
}

/// Read and verify the container at `source`
pub fn read(source: &Path) -> Result<MergedDocument> {
    open(source)?.verify()
}

/// Read and decode the container at `source` without verifying it
pub fn open(source: &Path) -> Result<Container> {
    if !source.exists() {
        return Err(PackError::NotFound(format!(
            "container \"{}\" does not exist",
            source.display()
        )));
    }
    if source.is_dir() {
        return Err(PackError::io(
            source,
            std::io::Error::new(std::io::ErrorKind::Other, "source is a directory, not a file"),
        ));
    }

    let bytes = fs::read(source).map_err(|e| PackError::io(source, e))?;
    debug!(path = %source.display(), bytes = bytes.len(), "Read container");
    Container::decode(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    fn sample() -> MergedDocument {
        MergedDocument::new(Some("----".to_string()), "hello\n----world\n".to_string())
    }

    /// Offset of the first content byte in an encoded container
    fn content_offset(doc: &MergedDocument) -> usize {
        let sep = doc.separator.as_ref().map_or(0, |s| 4 + s.len());
        MAGIC.len() + 1 + sep + HASH_LEN + 8
    }

    #[test]
    fn test_write_read_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out.bin");

        let doc = sample();
        let hash = write(&doc, &out).unwrap();
        assert_eq!(hash, crate::hash::hash_str(&doc.content));

        let back = read(&out).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_roundtrip_without_separator() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("single.bin");

        let doc = MergedDocument::new(None, "x\n".to_string());
        write(&doc, &out).unwrap();
        assert_eq!(read(&out).unwrap(), doc);
    }

    #[test]
    fn test_roundtrip_empty_content_and_unicode_separator() {
        let doc = MergedDocument::new(Some("→§←".to_string()), String::new());
        let decoded = Container::decode(&Container::seal(&doc).encode()).unwrap();
        assert_eq!(decoded.verify().unwrap(), doc);
    }

    #[test]
    fn test_flipped_content_byte_is_integrity_failure() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out.bin");
        let doc = sample();
        write(&doc, &out).unwrap();

        let mut bytes = fs::read(&out).unwrap();
        let offset = content_offset(&doc);
        bytes[offset] ^= 0x01;
        fs::write(&out, &bytes).unwrap();

        let err = read(&out).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Integrity);
    }

    #[test]
    fn test_every_content_byte_mutation_is_detected() {
        let doc = sample();
        let encoded = Container::seal(&doc).encode();
        let start = content_offset(&doc);

        for i in start..encoded.len() {
            for flip in [0x01u8, 0x80, 0xff] {
                let mut bytes = encoded.clone();
                bytes[i] ^= flip;
                let err = Container::decode(&bytes).unwrap().verify().unwrap_err();
                assert_eq!(err.kind(), ErrorKind::Integrity, "byte {} flip {:#x}", i, flip);
            }
        }
    }

    #[test]
    fn test_flipped_hash_byte_is_integrity_failure() {
        let doc = sample();
        let mut bytes = Container::seal(&doc).encode();
        let hash_offset = content_offset(&doc) - 8 - HASH_LEN;
        bytes[hash_offset + 5] ^= 0xaa;

        let err = Container::decode(&bytes).unwrap().verify().unwrap_err();
        match err {
            PackError::Integrity { expected, actual } => {
                assert_ne!(expected, actual);
                assert_eq!(actual, crate::hash::hash_str(&doc.content));
            }
            other => panic!("expected Integrity, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_magic_is_decode_failure() {
        let mut bytes = Container::seal(&sample()).encode();
        bytes[0] = b'X';
        let err = Container::decode(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn test_unknown_flags_are_decode_failure() {
        let mut bytes = Container::seal(&sample()).encode();
        bytes[4] |= 0b1000_0000;
        assert_eq!(Container::decode(&bytes).unwrap_err().kind(), ErrorKind::Decode);
    }

    #[test]
    fn test_truncated_input_is_decode_failure() {
        let bytes = Container::seal(&sample()).encode();
        for cut in [0, 3, 5, 8, 20, bytes.len() - 1] {
            let err = Container::decode(&bytes[..cut]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Decode, "cut at {}", cut);
        }
    }

    #[test]
    fn test_trailing_bytes_are_decode_failure() {
        let mut bytes = Container::seal(&sample()).encode();
        bytes.push(0);
        assert_eq!(Container::decode(&bytes).unwrap_err().kind(), ErrorKind::Decode);
    }

    #[test]
    fn test_oversized_length_is_decode_failure() {
        let doc = sample();
        let mut bytes = Container::seal(&doc).encode();
        let len_offset = content_offset(&doc) - 8;
        bytes[len_offset..len_offset + 8].copy_from_slice(&u64::MAX.to_le_bytes());
        assert_eq!(Container::decode(&bytes).unwrap_err().kind(), ErrorKind::Decode);
    }

    #[test]
    fn test_write_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("nested/deeper/out.bin");

        write(&sample(), &out).unwrap();
        assert!(out.is_file());
    }

    #[test]
    fn test_write_overwrites_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out.bin");
        fs::write(&out, b"old junk").unwrap();

        let doc = MergedDocument::new(None, "new\n".to_string());
        write(&doc, &out).unwrap();
        assert_eq!(read(&out).unwrap(), doc);
    }

    #[test]
    fn test_write_to_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let err = write(&sample(), temp_dir.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_read_missing_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let err = read(&temp_dir.path().join("nope.bin")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_read_directory_is_io_failure() {
        let temp_dir = TempDir::new().unwrap();
        let err = read(temp_dir.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_open_exposes_stored_hash() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out.bin");
        let hash = write(&sample(), &out).unwrap();

        let container = open(&out).unwrap();
        assert_eq!(container.hash, hash);
        assert_eq!(container.separator.as_deref(), Some("----"));
    }
}
