//! ovnr-remediate
//!
//! Delete the ports behind duplicated ARP-resolve flows, but only the ports
//! that are administratively down.
//!
//! # Invariants
//!
//! - A port whose state is `Up` is never deleted.
//! - `DryRun` never calls [`PortDeleter::delete_port`].
//! - One item's failure never aborts the batch; every outcome is recorded and
//!   the caller reads [`RemediationReport::failures`] at the end.
//! - The port deleted is the port just resolved for that rule.

mod engine;
mod outcome;

pub use engine::{remediate, PortDeleter, RemediationMode};
pub use outcome::{DeleteFailure, ItemOutcome, RemediationItem, RemediationReport, ResolveError};
