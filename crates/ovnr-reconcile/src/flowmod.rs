use std::collections::HashSet;

use ovnr_flow::{canonicalize, CanonicalRule, SourceFormat, DEFAULT_PRIORITY};
use tracing::trace;

const FLOW_MOD_ADD: &str = " ADD ";

/// Delete commands as vswitchd prints them, with whether they are strict.
const FLOW_MOD_DELETES: &[(&str, bool)] = &[
    (" DEL_STRICT ", true),
    (" DELETE_STRICT ", true),
    (" DEL ", false),
    (" DELETE ", false),
];

/// `table:255` in a delete means every table.
const ALL_TABLES: u32 = 255;

/// Flows ovs-vswitchd logged as received via `OFPT_FLOW_MOD ... ADD`.
///
/// Only populated when vswitchd's `vconn` module logs at debug. Used to tell
/// "never sent" apart from "sent but not installed" for a missing flow.
#[derive(Clone, Debug)]
pub struct FlowModIndex {
    table: u32,
    received: HashSet<CanonicalRule>,
}

impl FlowModIndex {
    pub fn new(table: u32) -> Self {
        Self {
            table,
            received: HashSet::new(),
        }
    }

    /// Apply `line` if it is an ADD or a delete touching the table of interest.
    ///
    /// Returns `true` when an ADD was recorded or a delete dropped entries.
    pub fn record_line(&mut self, line: &str) -> bool {
        if let Some(delete) = FlowModDelete::parse(line) {
            return self.apply_delete(&delete) > 0;
        }
        if !line.contains(FLOW_MOD_ADD) {
            return false;
        }
        match canonicalize(line, SourceFormat::ProtocolLog) {
            Ok(rule) if rule.table == self.table => {
                trace!(%rule, "flow-mod ADD seen");
                self.received.insert(rule);
                true
            }
            Ok(_) => false,
            Err(e) => {
                trace!(error = %e, "unparseable flow-mod line");
                false
            }
        }
    }

    /// Drop `rule` once nothing expects it any more.
    pub fn forget(&mut self, rule: &CanonicalRule) -> bool {
        self.received.remove(rule)
    }

    fn apply_delete(&mut self, delete: &FlowModDelete) -> usize {
        if delete.table.is_some_and(|t| t != self.table) {
            return 0;
        }
        let before = self.received.len();
        self.received.retain(|rule| !delete.covers(rule));
        let dropped = before - self.received.len();
        if dropped > 0 {
            trace!(dropped, strict = delete.strict, "flow-mod delete seen");
        }
        dropped
    }

    pub fn received(&self, rule: &CanonicalRule) -> bool {
        self.received.contains(rule)
    }

    pub fn len(&self) -> usize {
        self.received.len()
    }

    pub fn is_empty(&self) -> bool {
        self.received.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Delete flow-mods
// ---------------------------------------------------------------------------

/// `DEL[_STRICT] table:20 priority=100,reg0=... cookie:0x... [actions=...]`
#[derive(Debug)]
struct FlowModDelete {
    strict: bool,
    /// `None` for every table.
    table: Option<u32>,
    priority: u32,
    matches: Vec<String>,
}

impl FlowModDelete {
    fn parse(line: &str) -> Option<Self> {
        let (rest, strict) = FLOW_MOD_DELETES.iter().find_map(|(marker, strict)| {
            line.split_once(marker).map(|(_, rest)| (rest, *strict))
        })?;
        let head = rest.split_once("actions=").map_or(rest, |(head, _)| head);

        let mut table = None;
        let mut priority = DEFAULT_PRIORITY;
        let mut matches = Vec::new();
        for token in head.split_whitespace() {
            if let Some(v) = token.strip_prefix("table:") {
                table = v.parse::<u32>().ok().filter(|t| *t != ALL_TABLES);
            } else if token.contains('=') {
                for field in token.split(',').filter(|f| !f.is_empty()) {
                    match field.strip_prefix("priority=") {
                        Some(p) => priority = p.parse().ok()?,
                        None => matches.push(field.to_string()),
                    }
                }
            }
        }

        Some(Self {
            strict,
            table,
            priority,
            matches,
        })
    }

    /// Strict deletes match priority and the exact match set. Non-strict ones
    /// drop every rule whose matches include all of the delete's.
    fn covers(&self, rule: &CanonicalRule) -> bool {
        let subset = self.matches.iter().all(|m| rule.matches.contains(m));
        if self.strict {
            rule.priority == self.priority && subset && rule.matches.len() == self.matches.len()
        } else {
            subset
        }
    }
}
