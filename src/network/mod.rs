//! Network Module
//!
//! Unix-socket server and client handling.
//!
//! ## Architecture
//! - Single acceptor thread, non-blocking accept polling a shutdown flag
//! - One worker thread per accepted connection
//! - One request per connection: read a frame, dispatch, maybe reply, close
//! - Graceful drain of in-flight connections on shutdown

mod server;
mod connection;
mod client;

pub use server::Server;
pub use connection::{Connection, ConnectionOutcome};
pub use client::Client;
