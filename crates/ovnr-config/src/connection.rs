//! Startup resolution of the OVN database connection.
//!
//! Everything here is fatal on failure: without a database address and a CA
//! certificate no command can run.

use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};

use crate::settings::OvnSettings;

/// TLS material and database addresses shared by `ovn-nbctl` / `ovn-sbctl`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OvnConnection {
    pub nb_db: String,
    pub sb_db: String,
    pub private_key: PathBuf,
    pub certificate: PathBuf,
    pub ca_cert: PathBuf,
    pub leader_only: bool,
}

/// Value of the first line mentioning `name`, taken after its first `=`.
///
/// ```text
/// --ovnnb-db=ssl:10.5.0.10:6641,ssl:10.5.0.11:6641
/// ```
pub fn db_param(contents: &str, name: &str) -> Option<String> {
    contents
        .lines()
        .find(|l| l.contains(name))
        .and_then(|l| l.split_once('='))
        .map(|(_, v)| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn resolve_connection(ovn: &OvnSettings) -> Result<OvnConnection> {
    let params_path = &ovn.db_params_file;
    let params = fs::read_to_string(params_path)
        .with_context(|| format!("failed to read db params file: {}", params_path.display()))?;

    let nb_db = db_param(&params, "ovnnb")
        .ok_or_else(|| anyhow!("ovnnb not found in {}", params_path.display()))?;
    let sb_db = db_param(&params, "ovnsb")
        .ok_or_else(|| anyhow!("ovnsb not found in {}", params_path.display()))?;

    let ca_cert = ovn
        .ca_cert_candidates
        .iter()
        .find(|p| p.is_file())
        .cloned()
        .ok_or_else(|| {
            let tried: Vec<String> = ovn
                .ca_cert_candidates
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            anyhow!("no CA certificate found (tried: {})", tried.join(", "))
        })?;

    Ok(OvnConnection {
        nb_db,
        sb_db,
        private_key: ovn.private_key.clone(),
        certificate: ovn.certificate.clone(),
        ca_cert,
        leader_only: ovn.leader_only,
    })
}
