//! # CubbyKV
//!
//! A minimal key-value store served over a local unix socket, with:
//! - A line-based text protocol (`store` / `get` / `done`)
//! - Base64 transport encoding and `\:` escaping for literal delimiters
//! - A transactional, checksummed file-backed store
//! - One worker thread per connection with graceful shutdown drain
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Unix-Socket Server                       │
//! │              (one request per connection)                    │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ one frame
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                        Codec                                 │
//! │     base64 transport + escape-aware field parsing            │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ Command
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      Dispatcher                              │
//! │        one storage transaction per store/get                 │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!                       ▼
//!               ┌─────────────┐
//!               │  FileStore  │
//!               │ (snapshot)  │
//!               └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod storage;
pub mod dispatch;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{CubbyError, Result};
pub use config::Config;
pub use dispatch::{Dispatcher, Outcome};
pub use storage::FileStore;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of CubbyKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
