use std::fmt;
use std::str::FromStr;

/// Priority OpenFlow assigns when none is given. `ovs-ofctl` omits it from dumps.
pub const DEFAULT_PRIORITY: u32 = 32_768;

/// Which tool produced a raw rule line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    /// `ofctrl` debug lines from ovn-controller (`... flow: cookie=..., table_id=...`).
    DebugLog,
    /// `ovs-ofctl dump-flows` output lines.
    LiveDump,
    /// `OFPT_FLOW_MOD` lines from ovs-vswitchd (`... ADD table:20 priority=... cookie:0x...`).
    ProtocolLog,
}

impl SourceFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::DebugLog => "debug-log",
            SourceFormat::LiveDump => "live-dump",
            SourceFormat::ProtocolLog => "protocol-log",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Rule identity
// ---------------------------------------------------------------------------

/// `(table, priority, match)` identity of a rule.
///
/// Two rules with equal keys but different actions collide: the dataplane can
/// only honour one of them.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleKey {
    pub table: u32,
    pub priority: u32,
    pub match_clause: String,
}

impl RuleKey {
    pub fn new(table: u32, priority: u32, match_clause: impl Into<String>) -> Self {
        Self {
            table,
            priority,
            match_clause: match_clause.into(),
        }
    }
}

impl fmt::Display for RuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "table={}, priority={}, match=({})",
            self.table, self.priority, self.match_clause
        )
    }
}

/// A rule in canonical form.
///
/// Rendered as comma-joined `key=value` tokens in fixed order:
/// `cookie=0x..,table=..,priority=..,<match fields...>,actions=...`.
/// Equality is exact equality of that rendering.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalRule {
    pub cookie: u64,
    pub table: u32,
    pub priority: u32,
    /// Match fields in source order, whitespace removed (`reg0=0xac10005b`, `ip`, ...).
    pub matches: Vec<String>,
    /// Everything after `actions=`, whitespace removed.
    pub actions: String,
}

impl CanonicalRule {
    pub fn key(&self) -> RuleKey {
        RuleKey::new(self.table, self.priority, self.matches.join(","))
    }
}

impl fmt::Display for CanonicalRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cookie=0x{:x},table={},priority={}",
            self.cookie, self.table, self.priority
        )?;
        for m in &self.matches {
            write!(f, ",{m}")?;
        }
        write!(f, ",actions={}", self.actions)
    }
}

impl FromStr for CanonicalRule {
    type Err = ParseError;

    /// Canonical strings are a subset of the live-dump grammar.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::canonicalize(s, SourceFormat::LiveDump)
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A raw line did not fit the grammar of its declared source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The marker that introduces the rule text is absent (`flow:`, ` ADD `).
    MissingMarker {
        source: SourceFormat,
        marker: &'static str,
    },
    /// No `actions=` clause; every installed rule has one.
    MissingActions { source: SourceFormat },
    /// A numeric field (cookie, table, priority) could not be parsed.
    InvalidNumber { field: &'static str, raw: String },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::MissingMarker { source, marker } => {
                write!(f, "{source} line has no '{marker}' marker")
            }
            ParseError::MissingActions { source } => {
                write!(f, "{source} line has no 'actions=' clause")
            }
            ParseError::InvalidNumber { field, raw } => {
                write!(f, "field '{field}' is not a valid number: '{raw}'")
            }
        }
    }
}

impl std::error::Error for ParseError {}
