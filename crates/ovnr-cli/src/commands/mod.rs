//! Command handler modules for ovnr-cli.
//!
//! Shared utilities used by multiple command paths live here.
//! Command-specific logic lives in the submodules.

pub mod dups;
pub mod hunt;

use anyhow::Result;
use ovnr_config::LoadedConfig;
use tracing::info;

/// Load the layered config (defaults when no paths are given) and log its hash.
pub fn load_config(paths: &[String]) -> Result<LoadedConfig> {
    let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
    let loaded = ovnr_config::load_layered_yaml(&path_refs)?;
    info!(
        config_hash = %loaded.config_hash,
        layers = paths.len(),
        "config loaded"
    );
    Ok(loaded)
}
