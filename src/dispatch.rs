//! Command Dispatcher
//!
//! Executes one decoded command against the storage collaborator and
//! produces either a reply payload or a termination signal.
//!
//! ## Per-connection state machine
//! - `Store` → one committing transaction, no reply
//! - `Get` → one transaction, reply with the encoded lookup result
//! - `Shutdown` → no transaction, signal the accept loop to stop
//! - undecodable frame → no transaction, no reply, connection closes

use std::sync::Arc;

use crate::error::Result;
use crate::protocol::{self, Command, Response};
use crate::storage::FileStore;

/// What the caller should do after a command was dispatched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Close the connection without writing anything
    NoReply,

    /// Write this reply frame, then close the connection
    Reply(Vec<u8>),

    /// Close the connection and stop accepting new ones
    Shutdown,
}

/// Routes commands to the store
///
/// Holds the handle to the storage collaborator; there is no ambient or
/// global store instance.
pub struct Dispatcher {
    store: Arc<FileStore>,
}

impl Dispatcher {
    /// Create a dispatcher over the given store
    pub fn new(store: Arc<FileStore>) -> Self {
        Self { store }
    }

    /// Decode one transport frame and dispatch it
    ///
    /// Decode failures (invalid transport encoding, unrecognized command)
    /// are absorbed: the frame is dropped and the connection closes
    /// without a reply. Storage failures propagate to the caller.
    pub fn dispatch_frame(&self, frame: &[u8]) -> Result<Outcome> {
        match protocol::decode_frame(frame) {
            Ok(command) => self.dispatch(command),
            Err(e) if e.is_decode_error() => {
                tracing::debug!("Dropping undecodable frame: {}", e);
                Ok(Outcome::NoReply)
            }
            Err(e) => Err(e),
        }
    }

    /// Execute one decoded command
    ///
    /// Exactly one storage transaction per `Store`/`Get`; none for
    /// `Shutdown`.
    pub fn dispatch(&self, command: Command) -> Result<Outcome> {
        tracing::trace!("Dispatching {} command", command.name());

        match command {
            Command::Store { key, value } => {
                let mut txn = self.store.begin_transaction();
                txn.set(key, value);
                txn.commit()?;
                Ok(Outcome::NoReply)
            }
            Command::Get { key } => {
                let txn = self.store.begin_transaction();
                let value = txn.get(&key);
                txn.commit()?;
                Ok(Outcome::Reply(Response { value }.to_frame()))
            }
            Command::Shutdown => Ok(Outcome::Shutdown),
        }
    }
}
