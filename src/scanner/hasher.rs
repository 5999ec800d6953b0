//! SHA-256 file hasher with streaming support.
//!
//! # Overview
//!
//! [`Hasher`] reads a file in fixed-size chunks and feeds them to a
//! SHA-256 digest, so memory use does not grow with file size. All reads go
//! through a [`FileSystem`], which makes the hasher usable against the
//! in-memory filesystem in tests.
//!
//! # Example
//!
//! ```
//! use dupescan::scanner::{hash_to_hex, Hasher, MemoryFs};
//! use std::path::Path;
//!
//! let fs = MemoryFs::new();
//! fs.add_file("/a.txt", "hello");
//!
//! let hash = Hasher::new().hash_file(&fs, Path::new("/a.txt")).unwrap();
//! assert_eq!(
//!     hash_to_hex(&hash),
//!     "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
//! );
//! ```

use std::io::{self, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

use super::fs::FileSystem;
use super::HashError;

/// A SHA-256 digest.
pub type Hash = [u8; 32];

/// Number of bytes read per chunk (8 KiB).
pub const CHUNK_SIZE: usize = 8 * 1024;

/// Streaming content hasher.
#[derive(Debug, Clone)]
pub struct Hasher {
    buffer_size: usize,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a hasher that reads [`CHUNK_SIZE`] bytes at a time.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer_size: CHUNK_SIZE,
        }
    }

    /// Use a different read chunk size. Zero is bumped to one byte.
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    /// Hash everything `reader` yields until EOF.
    ///
    /// # Errors
    ///
    /// Returns the first read error other than [`io::ErrorKind::Interrupted`],
    /// which is retried.
    pub fn hash_reader<R: Read + ?Sized>(&self, reader: &mut R) -> io::Result<Hash> {
        let mut hasher = Sha256::new();
        let mut buffer = vec![0u8; self.buffer_size];

        loop {
            let n = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            hasher.update(&buffer[..n]);
        }

        Ok(hasher.finalize().into())
    }

    /// Hash the contents of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns a [`HashError`] carrying `path` if the file cannot be opened
    /// or a read fails part way.
    pub fn hash_file(&self, fs: &dyn FileSystem, path: &Path) -> Result<Hash, HashError> {
        let mut reader = fs.open(path).map_err(|e| HashError::from_io(path, e))?;
        let hash = self
            .hash_reader(&mut reader)
            .map_err(|e| HashError::from_io(path, e))?;
        log::trace!("Hashed {}: {}", path.display(), hash_to_hex(&hash));
        Ok(hash)
    }

    /// Hash an in-memory byte slice.
    #[must_use]
    pub fn hash_bytes(&self, data: &[u8]) -> Hash {
        Sha256::digest(data).into()
    }
}

/// Lowercase hexadecimal form of a digest.
#[must_use]
pub fn hash_to_hex(hash: &Hash) -> String {
    hash.iter().map(|b| format!("{b:02x}")).collect()
}
