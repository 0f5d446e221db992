use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the ledger home and everything in it:
/// - an initial `config.json` file with default settings
/// - an empty workbook at `ledger.json`
/// - the `.outbox` directory that reports are delivered to
///
/// # Arguments
/// - `ledger_home` - The directory that will be the root of the ledger, e.g. `$HOME/ledger`
///
/// # Errors
/// - Returns an error if any file operations fail or the home is already initialized.
pub async fn init(ledger_home: &Path) -> Result<Out<()>> {
    let config = Config::create(ledger_home)
        .await
        .context("Unable to create the ledger home and config")
        .pub_result(ErrorType::Config)?;
    Ok(format!(
        "Successfully created the ledger at {}",
        config.root().display()
    )
    .into())
}
