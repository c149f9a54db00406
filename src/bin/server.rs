//! tinyftp Server Binary
//!
//! Serves a directory over the tinyftp protocol.

use clap::Parser;
use tinyftp::store::DirStore;
use tinyftp::{Config, Server, Termination};
use tracing_subscriber::{fmt, EnvFilter};

/// tinyftp Server
#[derive(Parser, Debug)]
#[command(name = "tinyftp-server")]
#[command(about = "Minimal file-transfer server")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = tinyftp::config::DEFAULT_ADDR)]
    listen: String,

    /// Directory whose files are served
    #[arg(short, long, default_value = ".")]
    root: String,

    /// Chunk size in bytes; must match the client
    #[arg(short, long, default_value_t = tinyftp::config::DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// End uploads at the first all-zero chunk, as legacy peers do
    #[arg(long)]
    legacy_sentinel: bool,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tinyftp=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("tinyftp server v{}", tinyftp::VERSION);
    tracing::info!("Root directory: {}", args.root);

    let termination = if args.legacy_sentinel {
        Termination::Sentinel
    } else {
        Termination::DeclaredLength
    };

    // Build config from args
    let config = Config::builder()
        .listen_addr(&args.listen)
        .root_dir(&args.root)
        .chunk_size(args.chunk_size)
        .termination(termination)
        .build();

    let store = match DirStore::open(&config.root_dir) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to open root directory: {}", e);
            std::process::exit(1);
        }
    };

    let mut server = match Server::bind(config, store) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
