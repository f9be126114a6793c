#![warn(clippy::pedantic)]

//! # zksolc-fetch
//!
//! Command-line host for the `zksolc-downloader` library. It resolves a zksolc
//! version against the published manifest, downloads the binary into a
//! compilers directory and verifies it.
//!
//! ## Subcommands
//!
//! - `install` - Download and verify a compiler version
//! - `path` - Print where the resolved binary lives
//! - `verify` - Run `--version` on an already downloaded binary
//! - `status` - Show the resolved session without downloading
//!
//! ## Examples
//!
//! ```bash
//! zksolc-fetch install              # latest
//! zksolc-fetch install 1.3.5
//! zksolc-fetch install latest --compiler-path https://mirror.example.com/zksolc
//! zksolc-fetch path 1.3.13
//! ```

mod commands;
mod context;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{install, path, status, verify};

/// Fetches and verifies zksolc compiler binaries.
#[derive(Parser)]
#[command(
    name = "zksolc-fetch",
    author,
    version,
    about = "Fetch and verify zksolc compiler binaries",
    after_help = "\
ENVIRONMENT VARIABLES:
    ZKSOLC_COMPILERS_DIR            Compilers directory (default: <cache dir>/zksolc-fetch/compilers)
    ZKSOLC_BIN_REPOSITORY           Binary repository root
    ZKSOLC_VERSION_INFO_URL         Version manifest URL
    ZKSOLC_VERSION_INFO_TTL_SECS    Manifest cache period in seconds (default: 86400)
    ZKSOLC_VERIFY_TIMEOUT_SECS      Timeout for `zksolc --version` (default: none)
    RUST_LOG                        Log filter (default: info)"
)]
pub struct Cli {
    /// Enable debug logging.
    #[clap(long, short = 'v', global = true, action = clap::ArgAction::SetTrue)]
    pub verbose: bool,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Download and verify a compiler version.
    ///
    /// Skips the download when the binary is already present unless
    /// --force is given.
    Install(install::InstallArgs),

    /// Print the path of the resolved compiler binary.
    Path(path::PathArgs),

    /// Verify an already downloaded compiler binary.
    Verify(verify::VerifyArgs),

    /// Show the resolved version, source, and download state.
    Status(status::StatusArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:?}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Install(args) => install::execute(&args).await,
        Commands::Path(args) => path::execute(&args).await,
        Commands::Verify(args) => verify::execute(&args).await,
        Commands::Status(args) => status::execute(&args).await,
    }
}
