//! Client
//!
//! Blocking client for the one-request-per-connection protocol. Each
//! operation opens a fresh connection, sends a single encoded frame, and
//! waits for the server to finish before returning.

use std::io::{BufReader, Read, Write};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;

use crate::error::Result;
use crate::protocol::{self, Command, Response};

/// Client for a CubbyKV server
pub struct Client {
    /// Filesystem path of the server socket
    socket_path: PathBuf,
}

impl Client {
    /// Create a client for the server at the given socket path
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
        }
    }

    /// Persist a value under a key
    ///
    /// Waits for the server to close the connection, which it only does
    /// after the storage transaction committed, so a subsequent `get`
    /// observes the write.
    pub fn store(&self, key: &[u8], value: &[u8]) -> Result<()> {
        let mut stream = self.send(&Command::Store {
            key: key.to_vec(),
            value: value.to_vec(),
        })?;
        wait_for_close(&mut stream)
    }

    /// Fetch the value stored under a key
    ///
    /// Returns the empty byte string for a key that was never stored.
    pub fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        let stream = self.send(&Command::Get { key: key.to_vec() })?;

        let mut reader = BufReader::new(stream);
        match protocol::read_frame(&mut reader)? {
            Some(frame) => Response::payload_from_frame(&frame),
            None => Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "server closed the connection before a reply arrived",
            )
            .into()),
        }
    }

    /// Ask the server to stop accepting connections
    pub fn shutdown(&self) -> Result<()> {
        let mut stream = self.send(&Command::Shutdown)?;
        wait_for_close(&mut stream)
    }

    /// Open a connection and write one command frame
    fn send(&self, command: &Command) -> Result<UnixStream> {
        let mut stream = UnixStream::connect(&self.socket_path)?;
        let frame = protocol::encode_frame(command);
        protocol::write_frame(&mut stream, &frame)?;
        stream.flush()?;
        Ok(stream)
    }
}

/// Block until the server closes its end of the connection
fn wait_for_close(stream: &mut UnixStream) -> Result<()> {
    let mut scratch = [0u8; 16];
    while stream.read(&mut scratch)? > 0 {}
    Ok(())
}
