use std::env;

use anyhow::Result;

/// Validates the configuration and composes the services. Exits non-zero
/// when storages cannot be opened or no service would be mounted.
fn main() -> Result<()> {
    gitaly_ops::run_from_args(env::args())?;
    Ok(())
}
