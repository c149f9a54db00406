//! tinyftp Client Binary
//!
//! Interactive client: reads commands from stdin.

use std::io;

use clap::Parser;
use tinyftp::store::DirStore;
use tinyftp::{Client, Config, Termination};
use tracing_subscriber::{fmt, EnvFilter};

/// tinyftp Client
#[derive(Parser, Debug)]
#[command(name = "tinyftp-client")]
#[command(about = "Minimal file-transfer client (commands: put, get, change, help, bye)")]
#[command(version)]
struct Args {
    /// Server address (host:port)
    #[arg(short, long, default_value = tinyftp::config::DEFAULT_ADDR)]
    server: String,

    /// Local directory for uploads and downloads
    #[arg(short, long, default_value = ".")]
    dir: String,

    /// Chunk size in bytes; must match the server
    #[arg(short, long, default_value_t = tinyftp::config::DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// End downloads at the first all-zero chunk, as legacy peers do
    #[arg(long)]
    legacy_sentinel: bool,
}

fn main() {
    // Logs go to stderr so they don't interleave with the prompt
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,tinyftp=info"));

    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let termination = if args.legacy_sentinel {
        Termination::Sentinel
    } else {
        Termination::DeclaredLength
    };

    let config = Config::builder()
        .server_addr(&args.server)
        .root_dir(&args.dir)
        .chunk_size(args.chunk_size)
        .termination(termination)
        .build();

    let store = match DirStore::open(&config.root_dir) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to open local directory: {}", e);
            std::process::exit(1);
        }
    };

    let mut client = match Client::connect(&config, store) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("Failed to connect to {}: {}", config.server_addr, e);
            std::process::exit(1);
        }
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    if let Err(e) = client.run(&mut stdin.lock(), &mut stdout.lock()) {
        tracing::error!("Session aborted: {}", e);
        std::process::exit(1);
    }
}
