use std::path::PathBuf;

/// One regular file discovered under the scan root.
///
/// The filesystem facts are fixed at discovery time. The content digest is
/// attached separately, at most once, and only for entries whose size
/// collides with another entry's.
#[derive(Clone, Debug)]
pub struct FileEntry {
    /// Base filename, display only.
    pub name: String,
    /// Fully resolved path used to read the file's bytes.
    pub abs_path: PathBuf,
    /// Path relative to the scan root; identity within one archive.
    pub rel_path: String,
    /// Byte length at scan time.
    pub size: u64,
    digest: Option<Vec<u8>>,
}

impl FileEntry {
    pub fn new(abs_path: PathBuf, rel_path: String, size: u64) -> Self {
        let name = abs_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            name,
            abs_path,
            rel_path,
            size,
            digest: None,
        }
    }

    /// Attach the content digest. The collector sets this at most once.
    pub(crate) fn set_digest(&mut self, digest: Vec<u8>) {
        debug_assert!(self.digest.is_none(), "digest assigned twice");
        self.digest = Some(digest);
    }

    pub fn digest(&self) -> Option<&[u8]> {
        self.digest.as_deref()
    }
}
