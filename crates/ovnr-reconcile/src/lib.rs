//! ovnr-reconcile
//!
//! Live reconciliation of ovn-controller's believed flow table against what
//! ovs-vswitchd actually has installed.
//!
//! - The expected set is built only from install/remove events in the
//!   controller's own debug log, in log order.
//! - A flush event with a non-empty expected set triggers a diff against a live
//!   `dump-flows` snapshot. The diff never mutates the expected set.
//! - Removing a rule the set does not hold is an inconsistency and is surfaced.
//! - Partial log lines are never parsed; the tailer rewinds and retries.
//!
//! Single writer, single reader: no locking anywhere in this crate.

mod diff;
mod events;
mod expected;
mod flowmod;
mod hunter;
mod tailer;

pub use diff::{missing_flows, FlowDumper, MissingFlow, MissingFlowReport};
pub use events::{classify, ControllerEvent, FLUSH_MARKER, INSTALL_MARKER, REMOVE_MARKER};
pub use expected::{ExpectedSet, ExpectedSetInconsistency};
pub use flowmod::FlowModIndex;
pub use hunter::{HuntError, Hunter, LoopState, Step};
pub use tailer::{LineRead, LogTailer};
