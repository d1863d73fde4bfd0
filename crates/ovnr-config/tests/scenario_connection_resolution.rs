//! Scenario: resolve the OVN database connection at startup.
//!
//! # Invariants under test
//!
//! 1. nb and sb connection strings come from their own lines.
//! 2. The first existing CA candidate wins; missing ones are skipped.
//! 3. No CA candidate present is a fatal error naming what was tried.
//! 4. A params file without an `ovnsb` entry is a fatal error.

use std::fs;

use ovnr_config::{resolve_connection, OvnSettings};

const PARAMS: &str = "\
--ovnnb-db=ssl:10.5.0.10:6641,ssl:10.5.0.11:6641,ssl:10.5.0.12:6641
--ovnsb-db=ssl:10.5.0.10:16642,ssl:10.5.0.11:16642,ssl:10.5.0.12:16642
";

fn settings_in(dir: &tempfile::TempDir, params: &str, existing_ca: &[&str]) -> OvnSettings {
    let params_path = dir.path().join("ovn-northd-db-params.conf");
    fs::write(&params_path, params).unwrap();
    for name in existing_ca {
        fs::write(dir.path().join(name), "cert").unwrap();
    }
    OvnSettings {
        db_params_file: params_path,
        ca_cert_candidates: vec![
            dir.path().join("ovn-chassis.crt"),
            dir.path().join("ovn-central.crt"),
        ],
        ..OvnSettings::default()
    }
}

#[test]
fn resolves_nb_sb_and_first_existing_ca() {
    let dir = tempfile::tempdir().unwrap();
    let ovn = settings_in(&dir, PARAMS, &["ovn-central.crt"]);

    let conn = resolve_connection(&ovn).unwrap();
    assert_eq!(
        conn.nb_db,
        "ssl:10.5.0.10:6641,ssl:10.5.0.11:6641,ssl:10.5.0.12:6641"
    );
    assert_eq!(
        conn.sb_db,
        "ssl:10.5.0.10:16642,ssl:10.5.0.11:16642,ssl:10.5.0.12:16642"
    );
    assert_eq!(conn.ca_cert, dir.path().join("ovn-central.crt"));
    assert!(conn.leader_only);
}

#[test]
fn chassis_cert_preferred_when_both_exist() {
    let dir = tempfile::tempdir().unwrap();
    let ovn = settings_in(&dir, PARAMS, &["ovn-chassis.crt", "ovn-central.crt"]);
    let conn = resolve_connection(&ovn).unwrap();
    assert_eq!(conn.ca_cert, dir.path().join("ovn-chassis.crt"));
}

#[test]
fn no_ca_certificate_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let ovn = settings_in(&dir, PARAMS, &[]);
    let msg = resolve_connection(&ovn).unwrap_err().to_string();
    assert!(msg.contains("no CA certificate found"), "got: {msg}");
    assert!(msg.contains("ovn-chassis.crt"));
}

#[test]
fn missing_sb_entry_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let ovn = settings_in(&dir, "--ovnnb-db=ssl:10.5.0.10:6641\n", &["ovn-chassis.crt"]);
    let msg = resolve_connection(&ovn).unwrap_err().to_string();
    assert!(msg.contains("ovnsb not found"), "got: {msg}");
}
