//! ovnr-ports
//!
//! Logical switch ports (endpoints) as seen by the northbound database, and
//! the [`PortIndex`] used to map a rule's `(ip, mac)` pair back to the port
//! that owns it.
//!
//! The index is an explicit value: fetch it once per run with
//! [`PortIndex::fetch`] and pass it by reference. There is no global cache.

mod endpoint;
mod index;

pub use endpoint::{parse_port_listing, AdminState, Endpoint, PortParseError};
pub use index::{PortIndex, PortIndexError, PortLister, PortLookupError};
