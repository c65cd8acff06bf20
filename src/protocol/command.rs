//! Command definitions
//!
//! Represents commands from clients.

/// A parsed command
///
/// Keys and values are arbitrary byte sequences. They may contain the
/// field delimiter, the escape character, or newlines; the codec is
/// responsible for round-tripping them exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Persist a value under a key
    Store { key: Vec<u8>, value: Vec<u8> },

    /// Retrieve the value stored under a key
    Get { key: Vec<u8> },

    /// Terminate the server loop
    Shutdown,
}

impl Command {
    /// Get the command's wire name
    pub fn name(&self) -> &'static str {
        match self {
            Command::Store { .. } => "store",
            Command::Get { .. } => "get",
            Command::Shutdown => "done",
        }
    }
}
