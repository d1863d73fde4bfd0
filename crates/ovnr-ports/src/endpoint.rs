//! Parser for `ovn-nbctl list logical-switch-port` output.
//!
//! The listing is a sequence of blank-line separated blocks, one per port:
//!
//! ```text
//! _uuid               : de23da0c-b496-4588-bb4a-266bef2a8d27
//! addresses           : ["fa:16:3e:1b:ae:20 192.168.21.230"]
//! name                : "1c0b3b5e-..."
//! up                  : false
//! ```
//!
//! Only `_uuid`, `addresses`, `name` and `up` are read; other columns are ignored.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Administrative state of a port.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdminState {
    Up,
    Down,
}

impl AdminState {
    pub fn is_up(&self) -> bool {
        matches!(self, AdminState::Up)
    }
}

/// One logical switch port snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub id: Uuid,
    pub name: Option<String>,
    /// Raw `addresses` column text, e.g. `["fa:16:3e:1b:ae:20 192.168.21.230"]`.
    pub addresses: String,
    pub state: AdminState,
}

impl Endpoint {
    /// Whole-token address match (`10.0.0.1` does not match `10.0.0.11`).
    /// MACs compare case-insensitively.
    pub fn has_address(&self, addr: &str) -> bool {
        let want = addr.trim().to_ascii_lowercase();
        if want.is_empty() {
            return false;
        }
        address_tokens(&self.addresses).any(|t| t.eq_ignore_ascii_case(&want))
    }
}

fn address_tokens(s: &str) -> impl Iterator<Item = &str> {
    s.split(|c: char| c.is_whitespace() || matches!(c, '"' | '[' | ']' | ','))
        .filter(|t| !t.is_empty())
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A port block in the listing could not be understood.
///
/// `block` is the zero-based index of the offending block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortParseError {
    MissingField { block: usize, field: &'static str },
    InvalidUuid { block: usize, raw: String },
    InvalidState { block: usize, raw: String },
}

impl fmt::Display for PortParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortParseError::MissingField { block, field } => {
                write!(f, "port block #{block} has no '{field}' column")
            }
            PortParseError::InvalidUuid { block, raw } => {
                write!(f, "port block #{block} has invalid _uuid '{raw}'")
            }
            PortParseError::InvalidState { block, raw } => {
                write!(f, "port block #{block} has unrecognised up value '{raw}'")
            }
        }
    }
}

impl std::error::Error for PortParseError {}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse the whole listing. Empty blocks (leading/trailing blank lines) are skipped.
pub fn parse_port_listing(text: &str) -> Result<Vec<Endpoint>, PortParseError> {
    let mut ports = Vec::new();
    let mut block: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !block.is_empty() {
                ports.push(parse_block(ports.len(), &block)?);
                block.clear();
            }
        } else {
            block.push(line);
        }
    }
    if !block.is_empty() {
        ports.push(parse_block(ports.len(), &block)?);
    }

    Ok(ports)
}

fn parse_block(idx: usize, lines: &[&str]) -> Result<Endpoint, PortParseError> {
    let mut id: Option<Uuid> = None;
    let mut name: Option<String> = None;
    let mut addresses: Option<String> = None;
    let mut state: Option<AdminState> = None;

    for line in lines {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();

        match key.trim() {
            "_uuid" => {
                let parsed = Uuid::parse_str(value).map_err(|_| PortParseError::InvalidUuid {
                    block: idx,
                    raw: value.to_string(),
                })?;
                id = Some(parsed);
            }
            "addresses" => addresses = Some(value.to_string()),
            "name" => name = Some(value.trim_matches('"').to_string()),
            "up" => {
                state = Some(match value {
                    "true" => AdminState::Up,
                    // Unset optional bool means the port was never bound.
                    "false" | "[]" => AdminState::Down,
                    other => {
                        return Err(PortParseError::InvalidState {
                            block: idx,
                            raw: other.to_string(),
                        })
                    }
                });
            }
            _ => {}
        }
    }

    Ok(Endpoint {
        id: id.ok_or(PortParseError::MissingField {
            block: idx,
            field: "_uuid",
        })?,
        name,
        addresses: addresses.unwrap_or_default(),
        state: state.ok_or(PortParseError::MissingField {
            block: idx,
            field: "up",
        })?,
    })
}
