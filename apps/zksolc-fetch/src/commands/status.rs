//! Status command: shows the resolved session without downloading.
//!
//! ## Output Format
//!
//! ```text
//! version:    1.3.13
//! source:     default repository
//! url:        https://github.com/matter-labs/zksolc-bin/raw/main/linux-amd64/zksolc-linux-amd64-musl-v1.3.13
//! path:       /home/me/.cache/zksolc-fetch/compilers/zksolc/zksolc-v1.3.13
//! installed:  no
//! ```

use anyhow::Result;
use clap::Args;

use crate::context::SessionArgs;

/// Arguments for the status command.
#[derive(Args)]
pub struct StatusArgs {
    #[command(flatten)]
    pub session: SessionArgs,
}

/// Executes the status command.
///
/// # Errors
///
/// Returns an error if the version cannot be resolved.
pub async fn execute(args: &StatusArgs) -> Result<()> {
    let session = args.session.open_session().await?;
    let installed = if session.is_compiler_downloaded() { "yes" } else { "no" };

    println!("version:    {}", session.version());
    println!("source:     {}", session.source());
    println!("url:        {}", session.download_url());
    println!("path:       {}", session.binary_path().display());
    println!("installed:  {installed}");
    Ok(())
}
