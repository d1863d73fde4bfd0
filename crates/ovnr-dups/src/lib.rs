//! ovnr-dups
//!
//! Detect logical flows in the southbound DB that collide on
//! `(table, priority, match)` but differ in their action.
//!
//! The listing (`ovn-sbctl lflow-list <datapath>`) is fetched through the
//! [`LflowLister`] seam; everything else is a pure transformation over text.

mod detector;
mod lflow;

pub use detector::{fetch_duplicates, find_duplicates, DuplicateFilter, DuplicateGroup, LflowLister};
pub use lflow::{AddressError, AddressPair, LflowParseError, LogicalFlow};
