use crate::container::footer::write_footer;
use crate::container::index::write_index;
use crate::container::record::FileMeta;
use crate::error::{PackratError, Result};
use crate::scan::collector::{FileCollector, ScanOptions};
use crate::scan::entry::FileEntry;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::Path;

pub const DEFAULT_CHUNK_SIZE: u64 = 4 * 1024 * 1024;

#[derive(Clone, Default)]
pub struct PackOptions {
    /// Copy buffer size in bytes; 0 means the 4 MiB default. Content is
    /// streamed through this buffer, so memory stays bounded regardless of
    /// file size.
    pub chunk_size: u64,
    /// When true, stage the archive in a temporary file next to the
    /// destination and rename it into place only after a fully successful
    /// pack. Off by default: a failed pack then leaves whatever bytes were
    /// already written.
    pub atomic: bool,
}

pub(crate) fn effective_chunk_size(chunk_size: u64) -> usize {
    if chunk_size == 0 {
        DEFAULT_CHUNK_SIZE as usize
    } else {
        chunk_size as usize
    }
}

/// Scan `root`, classify, and pack the result into `out`.
pub fn pack_tree(
    root: &Path,
    out: &Path,
    scan_opts: Option<&ScanOptions>,
    pack_opts: Option<&PackOptions>,
) -> Result<()> {
    let collector = FileCollector::scan(root, scan_opts)?;
    pack(
        out,
        collector.unique_files(),
        collector.duplicate_groups(),
        pack_opts,
    )
}

/// Write `unique` entries and `duplicate_groups` into a single archive:
/// unique content first, then one physical copy per distinct duplicate
/// digest, then the metadata index, then the trailing index offset.
///
/// The first I/O failure aborts the whole pack.
pub fn pack(
    out: &Path,
    unique: &[FileEntry],
    duplicate_groups: &[Vec<FileEntry>],
    opts: Option<&PackOptions>,
) -> Result<()> {
    let chunk_size = effective_chunk_size(opts.map(|o| o.chunk_size).unwrap_or(0));
    let atomic = opts.map(|o| o.atomic).unwrap_or(false);

    tracing::debug!(
        unique = unique.len(),
        duplicate_groups = duplicate_groups.len(),
        atomic,
        "packing {}",
        out.display()
    );

    if atomic {
        let dir = match out.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        write_archive(tmp.as_file_mut(), unique, duplicate_groups, chunk_size)?;
        tmp.persist(out).map_err(|e| e.error)?;
    } else {
        let mut f = File::create(out)?;
        write_archive(&mut f, unique, duplicate_groups, chunk_size)?;
    }
    Ok(())
}

fn write_archive(
    f: &mut File,
    unique: &[FileEntry],
    duplicate_groups: &[Vec<FileEntry>],
    chunk_size: usize,
) -> Result<()> {
    let total = unique.len() + duplicate_groups.iter().map(|g| g.len()).sum::<usize>();
    let mut records: Vec<FileMeta> = Vec::with_capacity(total);

    write_unique_files(f, unique, &mut records, chunk_size)?;
    write_duplicate_files(f, duplicate_groups, &mut records, chunk_size)?;

    let index_offset = f.stream_position()?;
    write_index(&mut *f, &records)?;
    write_footer(&mut *f, index_offset)?;
    f.flush()?;

    tracing::debug!(records = records.len(), index_offset, "archive written");
    Ok(())
}

fn write_unique_files(
    f: &mut File,
    unique: &[FileEntry],
    records: &mut Vec<FileMeta>,
    chunk_size: usize,
) -> Result<()> {
    for entry in unique {
        let offset = f.stream_position()?;
        copy_file_into(f, &entry.abs_path, chunk_size)?;
        records.push(FileMeta {
            rel_path: entry.rel_path.clone(),
            size: entry.size,
            // The digest is not persisted for unique entries, even when the
            // classifier happened to compute one.
            hash: Vec::new(),
            data_offset: offset,
        });
    }
    Ok(())
}

fn write_duplicate_files(
    f: &mut File,
    duplicate_groups: &[Vec<FileEntry>],
    records: &mut Vec<FileMeta>,
    chunk_size: usize,
) -> Result<()> {
    // digest -> offset of the bytes already written
    let mut digest_offsets: HashMap<&[u8], u64> = HashMap::new();

    for group in duplicate_groups {
        // First entry in the group is the data source.
        let Some(source) = group.first() else {
            continue;
        };
        let digest = source.digest().ok_or_else(|| {
            PackratError::Format(format!(
                "duplicate entry has no digest: {}",
                source.rel_path
            ))
        })?;

        let offset = match digest_offsets.get(digest) {
            Some(&off) => off,
            None => {
                let off = f.stream_position()?;
                copy_file_into(f, &source.abs_path, chunk_size)?;
                digest_offsets.insert(digest, off);
                off
            }
        };

        for member in group {
            records.push(FileMeta {
                rel_path: member.rel_path.clone(),
                size: member.size,
                hash: digest.to_vec(),
                data_offset: offset,
            });
        }
    }
    Ok(())
}

/// Stream one source file into the archive at the current write cursor.
fn copy_file_into(f: &mut File, src_path: &Path, chunk_size: usize) -> Result<()> {
    let mut src = File::open(src_path)?;
    let mut buf = vec![0u8; chunk_size];
    loop {
        let n = src.read(&mut buf)?;
        if n == 0 {
            break;
        }
        f.write_all(&buf[..n])?;
    }
    Ok(())
}
