use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use ovnr_flow::{canonicalize, CanonicalRule, SourceFormat};
use ovnr_schemas::CommandFailure;
use tracing::debug;

use crate::expected::ExpectedSet;
use crate::flowmod::FlowModIndex;

/// Source of `ovs-ofctl dump-flows <bridge> table=<n>` output.
pub trait FlowDumper {
    fn dump_flows(&self, table: u32) -> Result<String, CommandFailure>;
}

/// One expected flow absent from the live table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MissingFlow {
    pub rule: CanonicalRule,
    /// vswitchd logged an ADD for this exact rule.
    pub add_received: bool,
}

impl fmt::Display for MissingFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let note = if self.add_received {
            "ADD received by vswitchd"
        } else {
            "no ADD seen in vswitchd log"
        };
        write!(f, "{} [{note}]", self.rule)
    }
}

/// `expected - actual` at `observed_at`. Not retained across diffs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MissingFlowReport {
    pub observed_at: DateTime<Utc>,
    pub expected_count: usize,
    pub actual_count: usize,
    pub missing: Vec<MissingFlow>,
}

impl MissingFlowReport {
    pub fn is_consistent(&self) -> bool {
        self.missing.is_empty()
    }

    pub fn missing_rules(&self) -> impl Iterator<Item = &CanonicalRule> {
        self.missing.iter().map(|m| &m.rule)
    }
}

impl fmt::Display for MissingFlowReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_consistent() {
            return write!(f, "All flows installed!");
        }
        write!(
            f,
            "MISSING FLOWS ({}) at {}:",
            self.missing.len(),
            self.observed_at.to_rfc3339_opts(SecondsFormat::Millis, true)
        )?;
        for m in &self.missing {
            write!(f, "\n  {m}")?;
        }
        Ok(())
    }
}

/// Diff the expected set against one live dump.
///
/// Lines of the dump that do not parse (reply headers) are skipped.
pub fn missing_flows(
    expected: &ExpectedSet,
    live_dump: &str,
    flow_mods: &FlowModIndex,
    observed_at: DateTime<Utc>,
) -> MissingFlowReport {
    let mut actual: BTreeSet<CanonicalRule> = BTreeSet::new();
    for line in live_dump.lines().filter(|l| !l.trim().is_empty()) {
        match canonicalize(line, SourceFormat::LiveDump) {
            Ok(rule) => {
                actual.insert(rule);
            }
            Err(e) => debug!(error = %e, line, "skipping dump line"),
        }
    }

    let missing = expected
        .iter()
        .filter(|rule| !actual.contains(*rule))
        .map(|rule| MissingFlow {
            rule: rule.clone(),
            add_received: flow_mods.received(rule),
        })
        .collect();

    MissingFlowReport {
        observed_at,
        expected_count: expected.len(),
        actual_count: actual.len(),
        missing,
    }
}
