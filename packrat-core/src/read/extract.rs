use crate::container::footer::{FOOTER_LEN, read_footer_at_eof};
use crate::container::index::read_index;
use crate::container::record::FileMeta;
use crate::error::{PackratError, Result};
use crate::hash::digest::{HashAlgorithm, StreamingDigest};
use crate::pack::writer::effective_chunk_size;
use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Component, Path, PathBuf};

#[derive(Clone, Copy, Default)]
pub struct ExtractOptions {
    /// Copy buffer size in bytes; 0 means the 4 MiB default.
    pub chunk_size: u64,
}

#[derive(Clone, Copy, Default)]
pub struct VerifyOptions {
    /// Digest algorithm the archive was packed with. Stored digests carry no
    /// algorithm tag, so this must match the pack-time choice.
    pub algorithm: HashAlgorithm,
    /// Copy buffer size in bytes; 0 means the 4 MiB default.
    pub chunk_size: u64,
}

/// Restore every file listed in the archive's index under `dest`.
///
/// Entries sharing a data offset are each re-read independently; every
/// record yields one output file. The first failure aborts, leaving any
/// files already extracted in place.
pub fn extract(archive: &Path, dest: &Path, opts: Option<&ExtractOptions>) -> Result<()> {
    let chunk_size = effective_chunk_size(opts.map(|o| o.chunk_size).unwrap_or(0));

    let mut f = File::open(archive)?;
    let (records, index_offset) = load_index(&mut f)?;
    tracing::debug!(
        records = records.len(),
        "extracting {} into {}",
        archive.display(),
        dest.display()
    );

    fs::create_dir_all(dest)?;
    for meta in &records {
        extract_file(&mut f, meta, dest, index_offset, chunk_size)?;
    }
    Ok(())
}

/// Read the footer and decode the metadata index.
///
/// Returns the records together with the index offset, which doubles as the
/// exclusive upper bound of the data section.
pub(crate) fn load_index(f: &mut File) -> Result<(Vec<FileMeta>, u64)> {
    let len = f.seek(SeekFrom::End(0))?;
    let index_offset = read_footer_at_eof(f)?;
    f.seek(SeekFrom::Start(index_offset))?;
    let remaining = len - FOOTER_LEN - index_offset;
    let records = read_index(&mut *f, remaining)?;
    Ok((records, index_offset))
}

fn extract_file(
    f: &mut File,
    meta: &FileMeta,
    dest: &Path,
    data_end: u64,
    chunk_size: usize,
) -> Result<()> {
    check_data_range(meta, data_end)?;

    let out_path = safe_join(dest, &meta.rel_path)?;
    if let Some(parent) = out_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut out = File::create(&out_path)?;
    if meta.size == 0 {
        return Ok(());
    }

    f.seek(SeekFrom::Start(meta.data_offset))?;
    let mut buf = vec![0u8; chunk_size];
    let mut remaining = meta.size;
    while remaining > 0 {
        let want = buf.len().min(remaining as usize);
        let n = f.read(&mut buf[..want])?;
        if n == 0 {
            return Err(PackratError::Format(format!(
                "archive truncated while extracting {}",
                meta.rel_path
            )));
        }
        out.write_all(&buf[..n])?;
        remaining -= n as u64;
    }
    Ok(())
}

fn check_data_range(meta: &FileMeta, data_end: u64) -> Result<()> {
    match meta.data_offset.checked_add(meta.size) {
        Some(end) if end <= data_end => Ok(()),
        _ => Err(PackratError::Format(format!(
            "data range for {} escapes the data section",
            meta.rel_path
        ))),
    }
}

fn safe_join(root: &Path, rel: &str) -> Result<PathBuf> {
    let p = Path::new(rel);
    let escapes = p.is_absolute()
        || p.components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)));
    if escapes || rel.is_empty() {
        return Err(PackratError::Format(format!("unsafe path: {rel}")));
    }
    Ok(root.join(p))
}

/// Check every record's data range and re-hash duplicate-group content
/// against the stored digests.
///
/// Records for unique entries carry no digest, so only their bounds are
/// checked.
pub fn verify(archive: &Path, opts: Option<&VerifyOptions>) -> Result<()> {
    let algorithm = opts.map(|o| o.algorithm).unwrap_or_default();
    let chunk_size = effective_chunk_size(opts.map(|o| o.chunk_size).unwrap_or(0));

    let mut f = File::open(archive)?;
    let (records, index_offset) = load_index(&mut f)?;

    let mut buf = vec![0u8; chunk_size];
    for meta in &records {
        check_data_range(meta, index_offset)?;
        if meta.hash.is_empty() {
            continue;
        }

        f.seek(SeekFrom::Start(meta.data_offset))?;
        let mut digest = StreamingDigest::new(algorithm);
        let mut remaining = meta.size;
        while remaining > 0 {
            let want = buf.len().min(remaining as usize);
            let n = f.read(&mut buf[..want])?;
            if n == 0 {
                return Err(PackratError::Format(format!(
                    "archive truncated while verifying {}",
                    meta.rel_path
                )));
            }
            digest.update(&buf[..n]);
            remaining -= n as u64;
        }
        if digest.finalize() != meta.hash {
            return Err(PackratError::Format(format!(
                "digest mismatch for {}",
                meta.rel_path
            )));
        }
    }
    Ok(())
}
