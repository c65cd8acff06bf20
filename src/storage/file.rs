//! File-backed transactional store
//!
//! A whole-file snapshot store: the full key-value map lives in memory
//! behind a mutex, and every committing write rewrites the snapshot file
//! through a temp-file-then-rename sequence, so a crash mid-write leaves
//! the previous snapshot intact.
//!
//! ## Concurrency
//! A [`Transaction`] holds the store mutex for its whole lifetime, so
//! transactions are serializable against each other. Writes stage inside
//! the transaction and only reach the shared image (and the file) on
//! `commit`; dropping a transaction without committing discards them.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};

use crate::error::{CubbyError, Result};

/// Magic bytes identifying a snapshot file
const MAGIC: &[u8; 4] = b"CBKV";

/// Snapshot format version
const VERSION: u16 = 1;

/// Header size: magic (4) + version (2) + crc (4) + body length (8)
const HEADER_SIZE: usize = 18;

type Image = HashMap<Vec<u8>, Vec<u8>>;

/// One key-value pair in the snapshot body
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SnapshotEntry {
    key: Vec<u8>,
    value: Vec<u8>,
}

/// The transactional key-value file store
pub struct FileStore {
    /// Snapshot file path
    path: PathBuf,

    /// In-memory image of the snapshot (exclusive access per transaction)
    entries: Mutex<Image>,
}

impl FileStore {
    /// Open or create a store backed by the given snapshot file
    ///
    /// On startup:
    /// 1. Create the parent directory if it doesn't exist
    /// 2. Load and validate the snapshot if one exists
    /// 3. Start empty otherwise
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let entries = if path.exists() {
            Self::load_snapshot(&path)?
        } else {
            Image::new()
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Begin a transaction
    ///
    /// Blocks until any in-flight transaction on this store finishes.
    pub fn begin_transaction(&self) -> Transaction<'_> {
        Transaction {
            store: self,
            image: self.entries.lock(),
            staged: HashMap::new(),
        }
    }

    /// Number of entries currently stored
    pub fn entry_count(&self) -> usize {
        self.entries.lock().len()
    }

    /// Snapshot file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    // =========================================================================
    // Snapshot I/O
    // =========================================================================

    /// Load and validate a snapshot file
    fn load_snapshot(path: &Path) -> Result<Image> {
        let bytes = fs::read(path)?;

        if bytes.len() < HEADER_SIZE {
            return Err(CubbyError::SnapshotCorruption(format!(
                "truncated header: expected {} bytes, got {}",
                HEADER_SIZE,
                bytes.len()
            )));
        }

        if &bytes[0..4] != MAGIC {
            return Err(CubbyError::SnapshotCorruption(
                "bad magic bytes".to_string(),
            ));
        }

        let version = u16::from_be_bytes([bytes[4], bytes[5]]);
        if version != VERSION {
            return Err(CubbyError::SnapshotCorruption(format!(
                "unsupported snapshot version: {}",
                version
            )));
        }

        let expected_crc = u32::from_be_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]);
        let body_len = u64::from_be_bytes([
            bytes[10], bytes[11], bytes[12], bytes[13], bytes[14], bytes[15], bytes[16], bytes[17],
        ]) as usize;

        if bytes.len() < HEADER_SIZE + body_len {
            return Err(CubbyError::SnapshotCorruption(format!(
                "truncated body: expected {} bytes, got {}",
                body_len,
                bytes.len() - HEADER_SIZE
            )));
        }

        let body = &bytes[HEADER_SIZE..HEADER_SIZE + body_len];
        let actual_crc = crc32fast::hash(body);
        if actual_crc != expected_crc {
            return Err(CubbyError::SnapshotCorruption(format!(
                "checksum mismatch: expected {:#010x}, got {:#010x}",
                expected_crc, actual_crc
            )));
        }

        let entries: Vec<SnapshotEntry> = bincode::deserialize(body)
            .map_err(|e| CubbyError::SnapshotCorruption(format!("undecodable body: {}", e)))?;

        Ok(entries
            .into_iter()
            .map(|entry| (entry.key, entry.value))
            .collect())
    }

    /// Write the full image to the snapshot file
    ///
    /// Writes to `{path}.tmp`, fsyncs, then renames over the snapshot.
    fn persist(&self, image: &Image) -> Result<()> {
        let entries: Vec<SnapshotEntry> = image
            .iter()
            .map(|(key, value)| SnapshotEntry {
                key: key.clone(),
                value: value.clone(),
            })
            .collect();

        let body = bincode::serialize(&entries)
            .map_err(|e| CubbyError::Storage(format!("snapshot serialization failed: {}", e)))?;

        let mut snapshot = Vec::with_capacity(HEADER_SIZE + body.len());
        snapshot.extend_from_slice(MAGIC);
        snapshot.extend_from_slice(&VERSION.to_be_bytes());
        snapshot.extend_from_slice(&crc32fast::hash(&body).to_be_bytes());
        snapshot.extend_from_slice(&(body.len() as u64).to_be_bytes());
        snapshot.extend_from_slice(&body);

        let tmp_path = self.path.with_extension("tmp");
        let mut tmp = File::create(&tmp_path)?;
        tmp.write_all(&snapshot)?;
        tmp.sync_all()?;
        fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }
}

/// A transaction against a [`FileStore`]
///
/// Reads see staged writes from this transaction first, then the shared
/// image. The store lock is held until the transaction is committed or
/// dropped.
pub struct Transaction<'a> {
    store: &'a FileStore,
    image: MutexGuard<'a, Image>,
    staged: Image,
}

impl Transaction<'_> {
    /// Get the value stored under a key
    pub fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.staged
            .get(key)
            .or_else(|| self.image.get(key))
            .cloned()
    }

    /// Stage a key-value pair for this transaction
    pub fn set(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.staged.insert(key, value);
    }

    /// Commit staged writes and persist the snapshot
    ///
    /// A read-only transaction commits without touching the file.
    pub fn commit(mut self) -> Result<()> {
        if self.staged.is_empty() {
            return Ok(());
        }

        for (key, value) in self.staged.drain() {
            self.image.insert(key, value);
        }

        self.store.persist(&self.image)
    }
}
