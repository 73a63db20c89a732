use crate::error::{PackratError, Result};
use std::io::{Read, Seek, SeekFrom, Write};

/// The footer is a single fixed-width integer: the absolute offset where the
/// metadata index (its record count) begins.
pub const FOOTER_LEN: u64 = 8;

pub fn write_footer<W: Write>(mut w: W, index_offset: u64) -> Result<()> {
    w.write_all(&index_offset.to_le_bytes())?;
    Ok(())
}

/// Locate the metadata index by reading the fixed-width trailing offset.
/// O(1) in the archive size: one seek from EOF.
///
/// The offset must leave room for at least the record-count field between it
/// and the footer; anything else is a malformed or truncated archive.
pub fn read_footer_at_eof<F: Read + Seek>(f: &mut F) -> Result<u64> {
    let len = f.seek(SeekFrom::End(0))?;
    if len < FOOTER_LEN {
        return Err(PackratError::Format(
            "archive too small for footer".to_string(),
        ));
    }
    f.seek(SeekFrom::End(-(FOOTER_LEN as i64)))?;
    let mut buf = [0u8; 8];
    f.read_exact(&mut buf)?;
    let offset = u64::from_le_bytes(buf);

    match offset.checked_add(8) {
        Some(end) if end <= len - FOOTER_LEN => Ok(offset),
        _ => Err(PackratError::Format(format!(
            "index offset {offset} out of range (archive is {len} bytes)"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn footer_round_trips() {
        // Minimal valid archive: a zero record count and a footer at it.
        let mut buf = Vec::new();
        buf.extend_from_slice(&0u64.to_le_bytes());
        write_footer(&mut buf, 0).unwrap();

        let mut cur = Cursor::new(buf);
        assert_eq!(read_footer_at_eof(&mut cur).unwrap(), 0);
    }

    #[test]
    fn too_small_archive_is_rejected() {
        let mut cur = Cursor::new(vec![0u8; 4]);
        assert!(matches!(
            read_footer_at_eof(&mut cur),
            Err(PackratError::Format(_))
        ));
    }

    #[test]
    fn offset_pointing_past_index_room_is_rejected() {
        // 16-byte file whose footer points at itself: no room for a count.
        let mut buf = vec![0u8; 8];
        write_footer(&mut buf, 8).unwrap();
        let mut cur = Cursor::new(buf);
        assert!(matches!(
            read_footer_at_eof(&mut cur),
            Err(PackratError::Format(_))
        ));
    }

    #[test]
    fn huge_offset_is_rejected() {
        let mut buf = vec![0u8; 8];
        write_footer(&mut buf, u64::MAX).unwrap();
        let mut cur = Cursor::new(buf);
        assert!(matches!(
            read_footer_at_eof(&mut cur),
            Err(PackratError::Format(_))
        ));
    }
}
