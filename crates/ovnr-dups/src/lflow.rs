//! Tokenizer for one `ovn-sbctl lflow-list` rule line.
//!
//! ```text
//!   table=12(lr_in_arp_resolve  ), priority=100  , match=(outport == "lrp-f850..." && reg0 == 172.16.0.141), action=(eth.dst = fa:16:3e:a1:27:b3; next;)
//! ```
//!
//! Header lines (`Datapath: ...`) and anything else that does not follow the
//! grammar produce an [`LflowParseError`]; callers filter those out.

use std::fmt;

use ovnr_flow::RuleKey;

const ACTION_SEP: &str = ", action=(";

/// One parsed logical flow line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogicalFlow {
    pub key: RuleKey,
    /// Pipeline stage name, padding removed (`lr_in_arp_resolve`).
    pub stage: String,
    /// The line up to `, action=`, leading whitespace removed, padding kept.
    pub key_text: String,
    /// Inner text of `action=(...)`.
    pub action: String,
    /// The whole line, trimmed.
    pub line: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LflowParseError {
    /// The line does not start with `table=` (headers, blank lines).
    NotARule,
    /// The line starts like a rule but breaks the grammar at `at`.
    Malformed { at: &'static str },
}

impl fmt::Display for LflowParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LflowParseError::NotARule => write!(f, "not a logical flow line"),
            LflowParseError::Malformed { at } => write!(f, "malformed logical flow near '{at}'"),
        }
    }
}

impl std::error::Error for LflowParseError {}

impl LogicalFlow {
    pub fn parse(line: &str) -> Result<Self, LflowParseError> {
        let text = line.trim();
        let rest = text.strip_prefix("table=").ok_or(LflowParseError::NotARule)?;

        let (table, rest) = take_number(rest).ok_or(LflowParseError::Malformed { at: "table" })?;
        let rest = rest
            .trim_start()
            .strip_prefix('(')
            .ok_or(LflowParseError::Malformed { at: "stage" })?;
        let (stage, rest) = rest
            .split_once(')')
            .ok_or(LflowParseError::Malformed { at: "stage" })?;

        let rest = rest
            .trim_start()
            .strip_prefix(',')
            .map(str::trim_start)
            .and_then(|r| r.strip_prefix("priority="))
            .ok_or(LflowParseError::Malformed { at: "priority" })?;
        let (priority, rest) =
            take_number(rest).ok_or(LflowParseError::Malformed { at: "priority" })?;

        let rest = rest
            .trim_start()
            .strip_prefix(',')
            .map(str::trim_start)
            .and_then(|r| r.strip_prefix("match=("))
            .ok_or(LflowParseError::Malformed { at: "match" })?;

        let (match_clause, action) = rest
            .split_once(ACTION_SEP)
            .ok_or(LflowParseError::Malformed { at: "action" })?;
        let match_clause = match_clause
            .strip_suffix(')')
            .ok_or(LflowParseError::Malformed { at: "match" })?;
        let action = action
            .strip_suffix(')')
            .ok_or(LflowParseError::Malformed { at: "action" })?;

        let key_end = text
            .find(", action=")
            .ok_or(LflowParseError::Malformed { at: "action" })?;

        Ok(LogicalFlow {
            key: RuleKey::new(table, priority, match_clause),
            stage: stage.trim().to_string(),
            key_text: text[..key_end].to_string(),
            action: action.to_string(),
            line: text.to_string(),
        })
    }

    pub fn match_clause(&self) -> &str {
        &self.key.match_clause
    }
}

fn take_number(s: &str) -> Option<(u32, &str)> {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    if end == 0 {
        return None;
    }
    let n = s[..end].parse().ok()?;
    Some((n, &s[end..]))
}

// ---------------------------------------------------------------------------
// Address pair (ARP resolve flows)
// ---------------------------------------------------------------------------

/// The `(next-hop ip, resolved mac)` pair an ARP-resolve flow encodes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddressPair {
    pub ip: String,
    pub mac: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    Unparseable(LflowParseError),
    /// No `reg0 == <ip>` / `xxreg0 == <ip>` term in the match.
    MissingIp,
    /// No `eth.dst = <mac>;` statement in the action.
    MissingMac,
}

impl fmt::Display for AddressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressError::Unparseable(e) => write!(f, "{e}"),
            AddressError::MissingIp => write!(f, "IP address not found in match"),
            AddressError::MissingMac => write!(f, "eth.dst not found in action"),
        }
    }
}

impl std::error::Error for AddressError {}

impl AddressPair {
    pub fn from_flow(flow: &LogicalFlow) -> Result<Self, AddressError> {
        Ok(Self {
            ip: next_hop_ip(flow.match_clause()).ok_or(AddressError::MissingIp)?,
            mac: resolved_mac(&flow.action).ok_or(AddressError::MissingMac)?,
        })
    }

    pub fn from_line(line: &str) -> Result<Self, AddressError> {
        let flow = LogicalFlow::parse(line).map_err(AddressError::Unparseable)?;
        Self::from_flow(&flow)
    }
}

fn next_hop_ip(match_clause: &str) -> Option<String> {
    let tokens: Vec<&str> = match_clause
        .split(|c: char| c.is_whitespace() || c == '(' || c == ')')
        .filter(|t| !t.is_empty())
        .collect();
    tokens.windows(3).find_map(|w| match w {
        [reg, "==", ip] if *reg == "reg0" || *reg == "xxreg0" => Some(ip.to_string()),
        _ => None,
    })
}

fn resolved_mac(action: &str) -> Option<String> {
    action.split(';').find_map(|stmt| {
        let value = stmt.trim().strip_prefix("eth.dst")?.trim_start();
        let mac = value.strip_prefix('=')?.trim();
        is_mac(mac).then(|| mac.to_ascii_lowercase())
    })
}

fn is_mac(s: &str) -> bool {
    let parts: Vec<&str> = s.split(':').collect();
    parts.len() == 6
        && parts
            .iter()
            .all(|p| p.len() == 2 && p.chars().all(|c| c.is_ascii_hexdigit()))
}
