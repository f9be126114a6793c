//! Verify command: runs `--version` on an already downloaded binary.

use anyhow::{Result, bail};
use clap::Args;

use crate::context::SessionArgs;

/// Arguments for the verify command.
#[derive(Args)]
pub struct VerifyArgs {
    #[command(flatten)]
    pub session: SessionArgs,
}

/// Executes the verify command.
///
/// # Errors
///
/// Returns an error if the binary is missing, corrupted, or times out.
pub async fn execute(args: &VerifyArgs) -> Result<()> {
    let session = args.session.open_session().await?;
    let path = session.binary_path();

    if !session.is_compiler_downloaded() {
        bail!(
            "zksolc {} is not installed at {}.\n\
             Run: zksolc-fetch install {}",
            session.version(),
            path.display(),
            session.version()
        );
    }

    let verification = session.verify_compiler().await?;
    match verification.mismatch {
        Some(advisory) => println!("{} works, but {advisory}", path.display()),
        None => println!("{} reports zksolc {}", path.display(), verification.reported),
    }
    Ok(())
}
