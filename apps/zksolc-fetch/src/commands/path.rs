//! Path command: prints where the resolved binary lives.

use anyhow::Result;
use clap::Args;

use crate::context::SessionArgs;

/// Arguments for the path command.
#[derive(Args)]
pub struct PathArgs {
    #[command(flatten)]
    pub session: SessionArgs,
}

/// Executes the path command.
///
/// # Errors
///
/// Returns an error if the version cannot be resolved.
pub async fn execute(args: &PathArgs) -> Result<()> {
    let session = args.session.open_session().await?;
    println!("{}", session.binary_path().display());
    Ok(())
}
