use crate::error::Result;
use sha2::Digest as _;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Read buffer for streaming a file through the digest.
pub const HASH_BUF_SIZE: usize = 8 * 1024;

/// Content digest selection. Both variants produce 32-byte output.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum HashAlgorithm {
    #[default]
    Blake3,
    Sha256,
}

enum Inner {
    Blake3(blake3::Hasher),
    Sha256(sha2::Sha256),
}

/// Incremental digest over an arbitrary byte stream.
pub struct StreamingDigest {
    inner: Inner,
}

impl StreamingDigest {
    pub fn new(algo: HashAlgorithm) -> Self {
        let inner = match algo {
            HashAlgorithm::Blake3 => Inner::Blake3(blake3::Hasher::new()),
            HashAlgorithm::Sha256 => Inner::Sha256(sha2::Sha256::new()),
        };
        Self { inner }
    }

    pub fn update(&mut self, data: &[u8]) {
        match &mut self.inner {
            Inner::Blake3(h) => {
                h.update(data);
            }
            Inner::Sha256(h) => h.update(data),
        }
    }

    pub fn finalize(self) -> Vec<u8> {
        match self.inner {
            Inner::Blake3(h) => h.finalize().as_bytes().to_vec(),
            Inner::Sha256(h) => h.finalize().to_vec(),
        }
    }
}

/// Stream `path` through `algo` in fixed-size chunks and return the digest.
///
/// Identical byte content yields an identical digest regardless of file size
/// or chunk boundaries. An unreadable file is an error, never an empty
/// digest.
pub fn hash_file(path: &Path, algo: HashAlgorithm) -> Result<Vec<u8>> {
    let mut f = File::open(path)?;
    let mut digest = StreamingDigest::new(algo);
    let mut buf = [0u8; HASH_BUF_SIZE];
    loop {
        let n = f.read(&mut buf)?;
        if n == 0 {
            break;
        }
        digest.update(&buf[..n]);
    }
    Ok(digest.finalize())
}
