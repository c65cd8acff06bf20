//! Unix-Socket Server
//!
//! Accepts connections and dispatches them to worker threads.
//!
//! The accept loop runs non-blocking and polls a shutdown flag between
//! attempts, so a `done` command processed on a worker thread stops the
//! loop without needing to interrupt a blocking accept. In-flight
//! connections are drained before `run` returns.

use std::fs;
use std::os::unix::net::{UnixListener, UnixStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::sync::WaitGroup;

use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::network::connection::{Connection, ConnectionOutcome};

/// How often the accept loop checks the shutdown flag when idle
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Unix-socket server for CubbyKV
pub struct Server {
    /// Server configuration
    config: Config,

    /// Shared command dispatcher (owns the store handle)
    dispatcher: Arc<Dispatcher>,

    /// Set by a worker when a `done` command arrives
    shutdown: Arc<AtomicBool>,
}

impl Server {
    /// Create a new server with the given config and dispatcher
    pub fn new(config: Config, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            config,
            dispatcher,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start the server (blocking)
    ///
    /// Returns once a `done` command has been processed and all in-flight
    /// connections have completed. Per-connection errors are logged and
    /// never terminate the accept loop.
    pub fn run(&mut self) -> Result<()> {
        let socket_path = self.config.socket_path.clone();

        // A previous run may have left its socket file behind
        if socket_path.exists() {
            fs::remove_file(&socket_path)?;
        }

        let listener = UnixListener::bind(&socket_path)?;
        listener.set_nonblocking(true)?;
        tracing::info!("Listening on {}", socket_path.display());

        let drain = WaitGroup::new();
        let mut next_conn_id: u64 = 0;

        while !self.shutdown.load(Ordering::SeqCst) {
            match listener.accept() {
                Ok((stream, _addr)) => {
                    next_conn_id += 1;
                    self.spawn_worker(stream, next_conn_id, drain.clone());
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => {
                    tracing::warn!("Failed to accept connection: {}", e);
                }
            }
        }

        // Stop accepting, let in-flight connections finish
        drop(listener);
        tracing::info!("Shutdown requested, draining in-flight connections");
        drain.wait();

        let _ = fs::remove_file(&socket_path);
        tracing::info!("Server stopped");
        Ok(())
    }

    /// Signal the server to shut down after the current accept iteration
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    /// Hand one accepted connection to a worker thread
    fn spawn_worker(&self, stream: UnixStream, conn_id: u64, guard: WaitGroup) {
        let dispatcher = Arc::clone(&self.dispatcher);
        let shutdown = Arc::clone(&self.shutdown);
        let read_timeout_ms = self.config.read_timeout_ms;
        let write_timeout_ms = self.config.write_timeout_ms;

        thread::spawn(move || {
            match serve_connection(stream, dispatcher, conn_id, read_timeout_ms, write_timeout_ms) {
                Ok(ConnectionOutcome::ShutdownRequested) => {
                    shutdown.store(true, Ordering::SeqCst);
                }
                Ok(ConnectionOutcome::Closed) => {}
                Err(e) => {
                    tracing::warn!("Connection {} failed: {}", conn_id, e);
                }
            }
            drop(guard);
        });
    }
}

/// Serve a single connection on the current (worker) thread
fn serve_connection(
    stream: UnixStream,
    dispatcher: Arc<Dispatcher>,
    conn_id: u64,
    read_timeout_ms: u64,
    write_timeout_ms: u64,
) -> Result<ConnectionOutcome> {
    // Accepted sockets inherit the listener's non-blocking mode; the
    // worker does plain blocking reads with a timeout instead.
    stream.set_nonblocking(false)?;

    let mut connection = Connection::new(stream, dispatcher, conn_id)?;
    connection.set_timeouts(read_timeout_ms, write_timeout_ms)?;
    connection.handle()
}
