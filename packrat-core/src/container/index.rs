use crate::container::record::{FileMeta, read_u64};
use crate::error::{PackratError, Result};
use std::io::{Read, Write};

/// Smallest possible encoded record: two length prefixes, size, offset.
const MIN_RECORD_LEN: u64 = 4 + 8 + 4 + 8;

/// Append the record count followed by every record, in order.
pub fn write_index<W: Write>(mut w: W, records: &[FileMeta]) -> Result<()> {
    w.write_all(&(records.len() as u64).to_le_bytes())?;
    for meta in records {
        meta.write_to(&mut w)?;
    }
    Ok(())
}

/// Read the index. `remaining` is the byte count from the record-count field
/// to the footer, which bounds how many records can possibly be encoded.
/// A count of zero is a valid, empty archive.
pub fn read_index<R: Read>(mut r: R, remaining: u64) -> Result<Vec<FileMeta>> {
    let count = read_u64(&mut r)?;
    let max = remaining.saturating_sub(8) / MIN_RECORD_LEN;
    if count > max {
        return Err(PackratError::Format(format!(
            "record count {count} exceeds index capacity ({max})"
        )));
    }

    let mut records = Vec::with_capacity(count as usize);
    for _ in 0..count {
        records.push(FileMeta::read_from(&mut r)?);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample() -> Vec<FileMeta> {
        vec![
            FileMeta {
                rel_path: "c.txt".into(),
                size: 5,
                hash: Vec::new(),
                data_offset: 0,
            },
            FileMeta {
                rel_path: "a.txt".into(),
                size: 5,
                hash: vec![1; 32],
                data_offset: 5,
            },
            FileMeta {
                rel_path: "b.txt".into(),
                size: 5,
                hash: vec![1; 32],
                data_offset: 5,
            },
        ]
    }

    #[test]
    fn index_round_trips() {
        let records = sample();
        let mut buf = Vec::new();
        write_index(&mut buf, &records).unwrap();

        let got = read_index(Cursor::new(&buf), buf.len() as u64).unwrap();
        assert_eq!(got, records);
    }

    #[test]
    fn zero_records_is_valid() {
        let mut buf = Vec::new();
        write_index(&mut buf, &[]).unwrap();
        assert_eq!(buf.len(), 8);

        let got = read_index(Cursor::new(&buf), buf.len() as u64).unwrap();
        assert!(got.is_empty());
    }

    #[test]
    fn absurd_count_is_rejected() {
        let buf = u64::MAX.to_le_bytes().to_vec();
        assert!(matches!(
            read_index(Cursor::new(&buf), 8),
            Err(PackratError::Format(_))
        ));
    }
}
