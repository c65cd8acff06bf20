//! CubbyKV CLI Client
//!
//! Command-line interface for interacting with a running CubbyKV server.

use std::io::Write;

use clap::{Parser, Subcommand};

use cubbykv::network::Client;

/// CubbyKV CLI
#[derive(Parser, Debug)]
#[command(name = "cubbykv-cli")]
#[command(about = "CLI for the CubbyKV key-value store")]
#[command(version)]
struct Args {
    /// Server socket path
    #[arg(short, long, default_value = "/tmp/cubbykv.sock")]
    socket: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Persist a value under a key
    Store {
        /// The key to store under
        key: String,

        /// The value to store
        value: String,
    },

    /// Fetch the value stored under a key
    Get {
        /// The key to look up
        key: String,
    },

    /// Ask the server to shut down
    Done,
}

fn main() {
    let args = Args::parse();
    let client = Client::new(&args.socket);

    let result = match args.command {
        Commands::Store { key, value } => client.store(key.as_bytes(), value.as_bytes()),
        Commands::Get { key } => client.get(key.as_bytes()).and_then(|value| {
            // Values are arbitrary bytes; write them raw rather than
            // through a lossy string conversion.
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&value)?;
            stdout.write_all(b"\n")?;
            Ok(())
        }),
        Commands::Done => client.shutdown(),
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
