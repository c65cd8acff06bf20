//! Storage Module
//!
//! The transactional key-value file store the dispatcher talks to.
//!
//! ## Responsibilities
//! - Keep an in-memory image of the key-value map
//! - Serialize transactions against each other
//! - Persist a checksummed snapshot on every committing write
//! - Detect snapshot corruption on startup
//!
//! ## Snapshot File Format
//! ```text
//! ┌────────────────────────────────────────┐
//! │ Header                                 │
//! │ ┌──────────┬──────────┬───────┬──────┐ │
//! │ │Magic (4) │Version(2)│CRC (4)│Len(8)│ │
//! │ └──────────┴──────────┴───────┴──────┘ │
//! ├────────────────────────────────────────┤
//! │ Body                                   │
//! │   bincode-serialized entry list        │
//! │   (CRC32 covers the body)              │
//! └────────────────────────────────────────┘
//! ```

mod file;

pub use file::{FileStore, Transaction};
