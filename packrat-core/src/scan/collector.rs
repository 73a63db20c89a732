use crate::error::{PackratError, Result};
use crate::hash::digest::{HashAlgorithm, hash_file};
use crate::scan::entry::FileEntry;
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Clone, Copy, Debug, Default)]
pub struct ScanOptions {
    pub algorithm: HashAlgorithm,
}

/// Snapshot classification of a directory tree into unique files and
/// duplicate-content groups. One instance = one scan; no re-scan.
///
/// Files are bucketed by size first: files of different length cannot be
/// byte-identical, so singleton buckets skip hashing entirely. Entries in
/// multi-entry buckets are hashed and sub-bucketed by digest; a digest held
/// by one entry lands in the unique list, a digest shared by two or more
/// forms a duplicate group whose first member (discovery order) is the data
/// source.
pub struct FileCollector {
    root: PathBuf,
    unique: Vec<FileEntry>,
    duplicate_groups: Vec<Vec<FileEntry>>,
}

impl FileCollector {
    pub fn scan(root: &Path, opts: Option<&ScanOptions>) -> Result<Self> {
        let algorithm = opts.map(|o| o.algorithm).unwrap_or_default();
        if !root.is_dir() {
            return Err(PackratError::Format(format!(
                "scan root is not a directory: {}",
                root.display()
            )));
        }

        let entries = discover(root)?;
        let (unique, duplicate_groups) = classify(entries, algorithm)?;
        tracing::debug!(
            unique = unique.len(),
            duplicate_groups = duplicate_groups.len(),
            "classified {}",
            root.display()
        );

        Ok(Self {
            root: root.to_path_buf(),
            unique,
            duplicate_groups,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn unique_files(&self) -> &[FileEntry] {
        &self.unique
    }

    pub fn duplicate_groups(&self) -> &[Vec<FileEntry>] {
        &self.duplicate_groups
    }

    pub fn into_parts(self) -> (Vec<FileEntry>, Vec<Vec<FileEntry>>) {
        (self.unique, self.duplicate_groups)
    }
}

/// Enumerate every regular file under `root`, hidden files included,
/// symlinks not followed. Sorted by relative path so discovery order is
/// stable across runs.
fn discover(root: &Path) -> Result<Vec<FileEntry>> {
    let mut entries = Vec::new();
    for e in WalkDir::new(root).follow_links(false) {
        let e = e.map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        if !e.file_type().is_file() {
            continue;
        }
        let md = e
            .metadata()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        let rel_path = e
            .path()
            .strip_prefix(root)
            .map_err(|_| {
                PackratError::Format(format!("path escapes scan root: {}", e.path().display()))
            })?
            .to_string_lossy()
            .into_owned();
        entries.push(FileEntry::new(e.path().to_path_buf(), rel_path, md.len()));
    }
    entries.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
    Ok(entries)
}

fn classify(
    entries: Vec<FileEntry>,
    algorithm: HashAlgorithm,
) -> Result<(Vec<FileEntry>, Vec<Vec<FileEntry>>)> {
    let mut size_groups: HashMap<u64, Vec<FileEntry>> = HashMap::new();
    for entry in entries {
        size_groups.entry(entry.size).or_default().push(entry);
    }

    let mut sizes: Vec<u64> = size_groups.keys().copied().collect();
    sizes.sort_unstable();

    let mut unique = Vec::new();
    let mut duplicate_groups = Vec::new();

    for size in sizes {
        let Some(bucket) = size_groups.remove(&size) else {
            continue;
        };

        // Singleton size bucket: unique without paying for a hash.
        if bucket.len() == 1 {
            unique.extend(bucket);
            continue;
        }

        // Equal size is only a candidate signal; exact equality is decided
        // by digest. Hashing is read-only and independent per file.
        let hashed: Vec<(Vec<u8>, FileEntry)> = bucket
            .into_par_iter()
            .map(|mut entry| -> Result<(Vec<u8>, FileEntry)> {
                let digest = hash_file(&entry.abs_path, algorithm)?;
                entry.set_digest(digest.clone());
                Ok((digest, entry))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut order: Vec<Vec<u8>> = Vec::new();
        let mut by_digest: HashMap<Vec<u8>, Vec<FileEntry>> = HashMap::new();
        for (digest, entry) in hashed {
            let slot = by_digest.entry(digest.clone()).or_default();
            if slot.is_empty() {
                order.push(digest);
            }
            slot.push(entry);
        }

        for digest in order {
            let Some(group) = by_digest.remove(&digest) else {
                continue;
            };
            if group.len() == 1 {
                unique.extend(group);
            } else {
                duplicate_groups.push(group);
            }
        }
    }

    Ok((unique, duplicate_groups))
}
