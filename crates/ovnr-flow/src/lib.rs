//! ovnr-flow
//!
//! Canonical form for OpenFlow rules.
//!
//! The same installed rule shows up in three textual shapes:
//! - `ofctrl` debug lines in `ovn-controller.log`
//! - `ovs-ofctl dump-flows` output
//! - `OFPT_FLOW_MOD` protocol lines in `ovs-vswitchd.log`
//!
//! [`canonicalize`] turns any of them into a [`CanonicalRule`] whose `Display`
//! output is byte-identical for the same logical rule, with volatile counters
//! stripped. Pure logic. No IO.

mod canonicalizer;
mod types;

pub use canonicalizer::{canonical_string, canonicalize};
pub use types::*;
