use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Typed view of the merged configuration.
///
/// Unknown keys are rejected so a misspelled path override fails loudly
/// instead of silently falling back to the default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OvnrConfig {
    pub ovn: OvnSettings,
    pub hunt: HuntSettings,
    pub duplicates: DuplicateSettings,
}

// ---------------------------------------------------------------------------
// ovn: database connection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OvnSettings {
    /// `name=value` lines holding the `ovnnb` / `ovnsb` connection strings.
    pub db_params_file: PathBuf,
    /// CA certificates, first existing wins (`-C`).
    pub ca_cert_candidates: Vec<PathBuf>,
    /// `-p`
    pub private_key: PathBuf,
    /// `-c`
    pub certificate: PathBuf,
    pub leader_only: bool,
}

impl Default for OvnSettings {
    fn default() -> Self {
        Self {
            db_params_file: PathBuf::from("/etc/ovn/ovn-northd-db-params.conf"),
            ca_cert_candidates: vec![
                PathBuf::from("/etc/ovn/ovn-chassis.crt"),
                PathBuf::from("/etc/ovn/ovn-central.crt"),
            ],
            private_key: PathBuf::from("/etc/ovn/key_host"),
            certificate: PathBuf::from("/etc/ovn/cert_host"),
            leader_only: true,
        }
    }
}

// ---------------------------------------------------------------------------
// hunt: live reconciliation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HuntSettings {
    pub controller_log: PathBuf,
    pub vswitchd_log: PathBuf,
    pub table: u32,
    pub bridge: String,
    pub openflow_version: String,
    pub poll_interval_ms: u64,
    pub vlog: VlogSettings,
}

impl Default for HuntSettings {
    fn default() -> Self {
        Self {
            controller_log: PathBuf::from("/var/log/ovn/ovn-controller.log"),
            vswitchd_log: PathBuf::from("/var/log/openvswitch/ovs-vswitchd.log"),
            table: 20,
            bridge: "br-int".to_string(),
            openflow_version: "OpenFlow15".to_string(),
            poll_interval_ms: 25,
            vlog: VlogSettings::default(),
        }
    }
}

/// Which daemon log module is raised for the duration of a hunt.
///
/// Values are parsed into typed levels/destinations by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VlogSettings {
    pub daemon: String,
    pub module: String,
    pub destination: String,
    pub level: String,
    pub use_sudo: bool,
}

impl Default for VlogSettings {
    fn default() -> Self {
        Self {
            daemon: "ovn-controller".to_string(),
            module: "ofctrl".to_string(),
            destination: "file".to_string(),
            level: "dbg".to_string(),
            use_sudo: true,
        }
    }
}

// ---------------------------------------------------------------------------
// duplicates: lflow selection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DuplicateSettings {
    pub stage: String,
    pub outport_prefix: String,
}

impl Default for DuplicateSettings {
    fn default() -> Self {
        Self {
            stage: "lr_in_arp_resolve".to_string(),
            outport_prefix: "lrp-".to_string(),
        }
    }
}
