//! Install command.
//!
//! ## Usage
//!
//! ```bash
//! zksolc-fetch install            # latest
//! zksolc-fetch install 1.3.5      # pinned
//! zksolc-fetch install --force    # re-download even if present
//! ```

use anyhow::Result;
use clap::Args;

use crate::context::SessionArgs;

/// Arguments for the install command.
#[derive(Args)]
pub struct InstallArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Download again even if the binary is already present.
    #[clap(long)]
    pub force: bool,
}

/// Executes the install command.
///
/// # Process
///
/// 1. Resolve the requested version against the version manifest
/// 2. Skip if the binary is present (unless `--force`)
/// 3. Download, mark executable, and verify
///
/// # Errors
///
/// Returns an error if resolution, download or verification fails.
pub async fn execute(args: &InstallArgs) -> Result<()> {
    let session = args.session.open_session().await?;
    let version = session.version();
    let path = session.binary_path();

    if session.is_compiler_downloaded() && !args.force {
        println!("zksolc {version} is already installed at {}", path.display());
        return Ok(());
    }

    println!("Installing zksolc {version} from {}...", session.source());
    let verification = session.download_compiler().await?;

    println!(
        "zksolc {version} installed at {} (reports {})",
        path.display(),
        verification.reported
    );
    Ok(())
}
