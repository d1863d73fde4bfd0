//! ovnr-ctl
//!
//! Adapters from the domain collaborator traits to the OVN/OVS command-line
//! tools: `ovn-sbctl`, `ovn-nbctl`, `ovs-ofctl`, `ovn-appctl`.
//!
//! All process spawning goes through [`CommandRunner`]; swap in a fake to
//! test argv construction without the tools installed.

mod appctl;
mod ofctl;
mod ovsdb;
mod runner;

pub use appctl::{
    parse_vlog_list, AppCtl, VerbosityControl, VerbosityGuard, VlogDestination, VlogError,
    VlogLevel,
};
pub use ofctl::OfCtl;
pub use ovsdb::{NbCtl, SbCtl};
pub use runner::{CommandRunner, ProcessRunner};
