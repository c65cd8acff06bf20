//! CubbyKV Server Binary
//!
//! Starts the unix-socket server for CubbyKV.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use cubbykv::network::Server;
use cubbykv::{Config, Dispatcher, FileStore};

/// CubbyKV Server
#[derive(Parser, Debug)]
#[command(name = "cubbykv-server")]
#[command(about = "Minimal key-value store over a unix socket")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./cubbykv_data")]
    data_dir: String,

    /// Unix socket path to listen on
    #[arg(short, long, default_value = "/tmp/cubbykv.sock")]
    socket: String,

    /// Connection read timeout in milliseconds (0 disables)
    #[arg(long, default_value = "5000")]
    read_timeout_ms: u64,

    /// Connection write timeout in milliseconds (0 disables)
    #[arg(long, default_value = "5000")]
    write_timeout_ms: u64,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,cubbykv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("CubbyKV Server v{}", cubbykv::VERSION);
    tracing::info!("Data directory: {}", args.data_dir);
    tracing::info!("Socket path: {}", args.socket);

    // Build config from args
    let config = Config::builder()
        .data_dir(&args.data_dir)
        .socket_path(&args.socket)
        .read_timeout_ms(args.read_timeout_ms)
        .write_timeout_ms(args.write_timeout_ms)
        .build();

    // Open the store
    let snapshot_path = config.data_dir.join("store.db");
    let store = match FileStore::open(snapshot_path) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            tracing::error!("Failed to open store: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Store opened with {} entries", store.entry_count());

    // Start server; runs until a `done` command arrives
    let dispatcher = Arc::new(Dispatcher::new(store));
    let mut server = Server::new(config, dispatcher);
    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
