use std::fmt;

use ovnr_schemas::CommandFailure;
use tracing::debug;
use uuid::Uuid;

use crate::endpoint::{parse_port_listing, Endpoint, PortParseError};

/// Source of the raw endpoint listing (`ovn-nbctl list logical-switch-port`).
pub trait PortLister {
    fn list_ports(&self) -> Result<String, CommandFailure>;
}

/// Building the index failed: either the query or its output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortIndexError {
    Command(CommandFailure),
    Parse(PortParseError),
}

impl fmt::Display for PortIndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortIndexError::Command(e) => write!(f, "port listing failed: {e}"),
            PortIndexError::Parse(e) => write!(f, "port listing unreadable: {e}"),
        }
    }
}

impl std::error::Error for PortIndexError {}

/// Resolving an `(ip, mac)` pair to exactly one endpoint failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortLookupError {
    /// No endpoint carries both addresses.
    PortNotFound { ip: String, mac: String },
    /// More than one endpoint carries both addresses. Addresses are assumed
    /// unique, so this is surfaced and never resolved by guessing.
    ManyPortsFound {
        ip: String,
        mac: String,
        candidates: Vec<Uuid>,
    },
}

impl fmt::Display for PortLookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortLookupError::PortNotFound { ip, mac } => {
                write!(f, "no port found for ip={ip} mac={mac}")
            }
            PortLookupError::ManyPortsFound {
                ip,
                mac,
                candidates,
            } => {
                let ids: Vec<String> = candidates.iter().map(Uuid::to_string).collect();
                write!(
                    f,
                    "{} ports found for ip={ip} mac={mac}: {}",
                    candidates.len(),
                    ids.join(", ")
                )
            }
        }
    }
}

impl std::error::Error for PortLookupError {}

/// Every endpoint known to the northbound DB at one point in time.
///
/// Immutable once built. One run fetches it at most once.
#[derive(Clone, Debug, Default)]
pub struct PortIndex {
    endpoints: Vec<Endpoint>,
}

impl PortIndex {
    /// Query the lister once and parse the result.
    pub fn fetch(lister: &dyn PortLister) -> Result<Self, PortIndexError> {
        let text = lister.list_ports().map_err(PortIndexError::Command)?;
        let endpoints = parse_port_listing(&text).map_err(PortIndexError::Parse)?;
        debug!(ports = endpoints.len(), "port index built");
        Ok(Self { endpoints })
    }

    pub fn from_endpoints(endpoints: Vec<Endpoint>) -> Self {
        Self { endpoints }
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// The unique endpoint whose address list contains both `ip` and `mac`.
    pub fn lookup(&self, ip: &str, mac: &str) -> Result<&Endpoint, PortLookupError> {
        let found: Vec<&Endpoint> = self
            .endpoints
            .iter()
            .filter(|e| e.has_address(mac) && e.has_address(ip))
            .collect();

        match found.as_slice() {
            [one] => Ok(one),
            [] => Err(PortLookupError::PortNotFound {
                ip: ip.to_string(),
                mac: mac.to_string(),
            }),
            many => Err(PortLookupError::ManyPortsFound {
                ip: ip.to_string(),
                mac: mac.to_string(),
                candidates: many.iter().map(|e| e.id).collect(),
            }),
        }
    }
}
