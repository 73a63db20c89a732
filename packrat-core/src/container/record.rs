use crate::error::{PackratError, Result};
use std::io::{Read, Write};

/// Upper bound on an encoded relative path; a larger prefix means corruption.
pub const MAX_PATH_LEN: usize = 64 * 1024;
/// Upper bound on a stored digest.
pub const MAX_HASH_LEN: usize = 64;

/// On-disk record describing one logical file in the archive.
///
/// Layout, little-endian: u32 path length + UTF-8 path bytes, u64 size,
/// u32 digest length + digest bytes, u64 absolute offset of the file's
/// content. The digest is empty for entries the writer classified unique;
/// records sharing `data_offset` and `size` share physical bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileMeta {
    pub rel_path: String,
    pub size: u64,
    pub hash: Vec<u8>,
    pub data_offset: u64,
}

impl FileMeta {
    pub fn write_to<W: Write>(&self, mut w: W) -> Result<()> {
        let path = self.rel_path.as_bytes();
        if path.len() > MAX_PATH_LEN {
            return Err(PackratError::Format(format!(
                "path too long: {} bytes",
                path.len()
            )));
        }
        w.write_all(&(path.len() as u32).to_le_bytes())?;
        w.write_all(path)?;
        w.write_all(&self.size.to_le_bytes())?;
        w.write_all(&(self.hash.len() as u32).to_le_bytes())?;
        w.write_all(&self.hash)?;
        w.write_all(&self.data_offset.to_le_bytes())?;
        Ok(())
    }

    pub fn read_from<R: Read>(mut r: R) -> Result<Self> {
        let path_len = read_u32(&mut r)? as usize;
        if path_len > MAX_PATH_LEN {
            return Err(PackratError::Format(format!(
                "path length out of range: {path_len}"
            )));
        }
        let mut path = vec![0u8; path_len];
        r.read_exact(&mut path)?;
        let rel_path = String::from_utf8(path)
            .map_err(|e| PackratError::Format(format!("path is not UTF-8: {e}")))?;

        let size = read_u64(&mut r)?;

        let hash_len = read_u32(&mut r)? as usize;
        if hash_len > MAX_HASH_LEN {
            return Err(PackratError::Format(format!(
                "digest length out of range: {hash_len}"
            )));
        }
        let mut hash = vec![0u8; hash_len];
        r.read_exact(&mut hash)?;

        let data_offset = read_u64(&mut r)?;

        Ok(Self {
            rel_path,
            size,
            hash,
            data_offset,
        })
    }

    /// True when this entry was stored as part of a duplicate group.
    pub fn is_duplicate(&self) -> bool {
        !self.hash.is_empty()
    }
}

pub(crate) fn read_u32<R: Read>(mut r: R) -> std::io::Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

pub(crate) fn read_u64<R: Read>(mut r: R) -> std::io::Result<u64> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn record_round_trips() {
        let meta = FileMeta {
            rel_path: "logs/2024/app.log".to_string(),
            size: 4096,
            hash: vec![0xab; 32],
            data_offset: 12345,
        };
        let mut buf = Vec::new();
        meta.write_to(&mut buf).unwrap();

        let got = FileMeta::read_from(Cursor::new(buf)).unwrap();
        assert_eq!(got, meta);
        assert!(got.is_duplicate());
    }

    #[test]
    fn empty_hash_round_trips() {
        let meta = FileMeta {
            rel_path: "unique.bin".to_string(),
            size: 0,
            hash: Vec::new(),
            data_offset: 0,
        };
        let mut buf = Vec::new();
        meta.write_to(&mut buf).unwrap();

        let got = FileMeta::read_from(Cursor::new(buf)).unwrap();
        assert_eq!(got, meta);
        assert!(!got.is_duplicate());
    }

    #[test]
    fn oversized_path_prefix_is_rejected() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&(MAX_PATH_LEN as u32 + 1).to_le_bytes());
        buf.extend_from_slice(&[0u8; 16]);
        assert!(matches!(
            FileMeta::read_from(Cursor::new(buf)),
            Err(PackratError::Format(_))
        ));
    }

    #[test]
    fn oversized_digest_prefix_is_rejected() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&1u32.to_le_bytes());
        buf.push(b'x');
        buf.extend_from_slice(&0u64.to_le_bytes());
        buf.extend_from_slice(&(MAX_HASH_LEN as u32 + 1).to_le_bytes());
        assert!(matches!(
            FileMeta::read_from(Cursor::new(buf)),
            Err(PackratError::Format(_))
        ));
    }
}
