//! Connection Handler
//!
//! Handles individual client connections. A connection carries exactly
//! one request: read one frame, dispatch it, write at most one reply
//! frame, close.

use std::io::{BufReader, BufWriter};
use std::os::unix::net::UnixStream;
use std::sync::Arc;
use std::time::Duration;

use crate::dispatch::{Dispatcher, Outcome};
use crate::error::{CubbyError, Result};
use crate::protocol::{read_frame, write_frame};

/// How a completed connection affects the server loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionOutcome {
    /// Connection finished; keep accepting
    Closed,

    /// Client sent `done`; stop accepting after this connection
    ShutdownRequested,
}

/// Handles a single client connection
pub struct Connection {
    /// Stream reader (buffered for line reads)
    reader: BufReader<UnixStream>,

    /// Stream writer (buffered for the reply)
    writer: BufWriter<UnixStream>,

    /// Reference to the command dispatcher
    dispatcher: Arc<Dispatcher>,

    /// Connection sequence number for logging
    conn_id: u64,
}

impl Connection {
    /// Create a new connection handler
    ///
    /// Sets up buffered I/O over cloned read/write handles.
    pub fn new(stream: UnixStream, dispatcher: Arc<Dispatcher>, conn_id: u64) -> Result<Self> {
        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            dispatcher,
            conn_id,
        })
    }

    /// Configure connection timeouts
    ///
    /// The read timeout keeps an unresponsive client from pinning a
    /// worker indefinitely. Zero disables a timeout.
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        let read_stream = self.reader.get_ref();
        let write_stream = self.writer.get_ref();

        if read_ms > 0 {
            read_stream.set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            write_stream.set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }

        Ok(())
    }

    /// Handle the connection (blocking until the request is served)
    ///
    /// All per-connection failures are isolated here or reported to the
    /// worker; none of them may take down the accept loop.
    pub fn handle(&mut self) -> Result<ConnectionOutcome> {
        tracing::debug!("Connection {} established", self.conn_id);

        // Read the single request frame
        let frame = match read_frame(&mut self.reader) {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                // Client connected and left without sending anything
                tracing::debug!("Connection {} closed without a frame", self.conn_id);
                return Ok(ConnectionOutcome::Closed);
            }
            Err(CubbyError::Io(ref e))
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                ) =>
            {
                // Read timeout (TimedOut on some platforms, WouldBlock on others)
                tracing::debug!("Read timeout on connection {}", self.conn_id);
                return Ok(ConnectionOutcome::Closed);
            }
            Err(CubbyError::Io(ref e))
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::ConnectionReset | std::io::ErrorKind::ConnectionAborted
                ) =>
            {
                tracing::debug!("Connection {} reset by client", self.conn_id);
                return Ok(ConnectionOutcome::Closed);
            }
            Err(e) => {
                tracing::warn!("Error reading from connection {}: {}", self.conn_id, e);
                return Err(e);
            }
        };

        // Dispatch; decode failures were absorbed, storage failures surface
        let outcome = self.dispatcher.dispatch_frame(&frame)?;

        match outcome {
            Outcome::NoReply => Ok(ConnectionOutcome::Closed),
            Outcome::Reply(reply) => {
                if let Err(e) = write_frame(&mut self.writer, &reply) {
                    // The client may disconnect before the reply lands
                    // (broken pipe/reset); that is their business, not a
                    // server failure.
                    if let CubbyError::Io(ref io_err) = e {
                        match io_err.kind() {
                            std::io::ErrorKind::BrokenPipe
                            | std::io::ErrorKind::ConnectionReset
                            | std::io::ErrorKind::ConnectionAborted => {
                                tracing::debug!(
                                    "Connection {} went away before the reply: {}",
                                    self.conn_id,
                                    e
                                );
                                return Ok(ConnectionOutcome::Closed);
                            }
                            _ => {}
                        }
                    }
                    tracing::warn!("Error writing to connection {}: {}", self.conn_id, e);
                    return Err(e);
                }
                Ok(ConnectionOutcome::Closed)
            }
            Outcome::Shutdown => {
                tracing::info!("Connection {} requested shutdown", self.conn_id);
                Ok(ConnectionOutcome::ShutdownRequested)
            }
        }
    }
}
