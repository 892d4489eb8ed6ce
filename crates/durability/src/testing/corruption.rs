//! Edit log corruption utilities
//!
//! Simulates the damage recovery mode is meant to absorb.
//!
//! # Corruption Types
//!
//! - Truncation: removes bytes from the tail (crash during write)
//! - Garbage: appends arbitrary bytes (partial write)
//! - Bit rot: flips bits at a chosen offset (storage degradation)

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Corrupts a single edit log file in place
#[derive(Debug, Clone)]
pub struct EditLogCorruptor {
    path: PathBuf,
}

impl EditLogCorruptor {
    /// Target the log at `path`
    pub fn new(path: impl AsRef<Path>) -> Self {
        EditLogCorruptor {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Current file length
    pub fn len(&self) -> std::io::Result<u64> {
        Ok(std::fs::metadata(&self.path)?.len())
    }

    /// Whether the file is empty
    pub fn is_empty(&self) -> std::io::Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Remove `bytes` from the end of the file, returning the new length
    pub fn truncate_tail(&self, bytes: u64) -> std::io::Result<u64> {
        let new_len = self.len()?.saturating_sub(bytes);
        self.truncate_to(new_len)?;
        Ok(new_len)
    }

    /// Cut the file to exactly `len` bytes
    pub fn truncate_to(&self, len: u64) -> std::io::Result<()> {
        let file = OpenOptions::new().write(true).open(&self.path)?;
        file.set_len(len)?;
        file.sync_all()
    }

    /// Append `garbage` to the end of the file
    pub fn append_garbage(&self, garbage: &[u8]) -> std::io::Result<()> {
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        file.write_all(garbage)?;
        file.sync_all()
    }

    /// XOR the byte at `offset` with `mask`
    pub fn flip_bits(&self, offset: u64, mask: u8) -> std::io::Result<()> {
        let mut bytes = std::fs::read(&self.path)?;
        let index = usize::try_from(offset)
            .ok()
            .filter(|i| *i < bytes.len())
            .ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "offset past end of file")
            })?;
        bytes[index] ^= mask;
        std::fs::write(&self.path, bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_truncate_and_append() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("edits");
        std::fs::write(&path, [1u8; 20]).unwrap();

        let corruptor = EditLogCorruptor::new(&path);
        assert_eq!(corruptor.truncate_tail(5).unwrap(), 15);
        corruptor.append_garbage(&[9, 9]).unwrap();
        assert_eq!(corruptor.len().unwrap(), 17);
        assert_eq!(corruptor.truncate_tail(100).unwrap(), 0);
        assert!(corruptor.is_empty().unwrap());
    }

    #[test]
    fn test_flip_bits() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("edits");
        std::fs::write(&path, [0u8; 4]).unwrap();

        let corruptor = EditLogCorruptor::new(&path);
        corruptor.flip_bits(2, 0x81).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), vec![0, 0, 0x81, 0]);
        assert!(corruptor.flip_bits(4, 1).is_err());
    }
}
