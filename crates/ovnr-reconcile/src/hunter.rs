use std::fmt;

use chrono::Utc;
use ovnr_flow::ParseError;
use ovnr_schemas::CommandFailure;
use tracing::{debug, info};

use crate::diff::{missing_flows, FlowDumper, MissingFlowReport};
use crate::events::{classify, ControllerEvent};
use crate::expected::{ExpectedSet, ExpectedSetInconsistency};
use crate::flowmod::FlowModIndex;
use crate::tailer::LineRead;

// ---------------------------------------------------------------------------
// State + step results
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    /// No complete line was ready; caller should sleep and retry.
    Idle,
    /// A line was consumed and classified.
    Observing,
    /// A flush triggered a live diff.
    Diffing,
}

/// What one [`Hunter::step`] did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// Nothing to read. `expected_len` is set when the size changed since the
    /// last idle step.
    Idle { expected_len: Option<usize> },
    /// Line was not relevant (or a flush with nothing expected yet).
    Ignored,
    /// Install event; `new` is false when the rule was already expected.
    Added { new: bool },
    Removed,
    Diffed(MissingFlowReport),
}

/// A step failed. The loop logs it and keeps going.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuntError {
    Parse(ParseError),
    Inconsistent(ExpectedSetInconsistency),
    Dump(CommandFailure),
}

impl fmt::Display for HuntError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HuntError::Parse(e) => write!(f, "controller line unparseable: {e}"),
            HuntError::Inconsistent(e) => write!(f, "expected set inconsistent: {e}"),
            HuntError::Dump(e) => write!(f, "live flow dump failed: {e}"),
        }
    }
}

impl std::error::Error for HuntError {}

impl From<ParseError> for HuntError {
    fn from(e: ParseError) -> Self {
        HuntError::Parse(e)
    }
}

impl From<ExpectedSetInconsistency> for HuntError {
    fn from(e: ExpectedSetInconsistency) -> Self {
        HuntError::Inconsistent(e)
    }
}

impl From<CommandFailure> for HuntError {
    fn from(e: CommandFailure) -> Self {
        HuntError::Dump(e)
    }
}

// ---------------------------------------------------------------------------
// Hunter
// ---------------------------------------------------------------------------

/// Owns the expected set for one table and drives it from controller log lines.
#[derive(Debug)]
pub struct Hunter {
    table: u32,
    expected: ExpectedSet,
    flow_mods: FlowModIndex,
    state: LoopState,
    last_reported_len: Option<usize>,
}

impl Hunter {
    pub fn new(table: u32) -> Self {
        Self {
            table,
            expected: ExpectedSet::new(),
            flow_mods: FlowModIndex::new(table),
            state: LoopState::Idle,
            last_reported_len: None,
        }
    }

    pub fn table(&self) -> u32 {
        self.table
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn expected(&self) -> &ExpectedSet {
        &self.expected
    }

    pub fn flow_mods(&self) -> &FlowModIndex {
        &self.flow_mods
    }

    /// Feed one vswitchd log line into the flow-mod index.
    pub fn record_flow_mod(&mut self, line: &str) -> bool {
        self.flow_mods.record_line(line)
    }

    pub fn step(&mut self, read: LineRead, dumper: &dyn FlowDumper) -> Result<Step, HuntError> {
        let line = match read {
            LineRead::Pending => {
                self.state = LoopState::Idle;
                return Ok(self.idle());
            }
            LineRead::Line(line) => line,
        };

        self.state = LoopState::Observing;
        match classify(&line, self.table)? {
            ControllerEvent::FlushDone if !self.expected.is_empty() => {
                self.state = LoopState::Diffing;
                let dump = dumper.dump_flows(self.table)?;
                let report = missing_flows(&self.expected, &dump, &self.flow_mods, Utc::now());
                if report.is_consistent() {
                    debug!(expected = report.expected_count, "all expected flows installed");
                } else {
                    info!(
                        missing = report.missing.len(),
                        expected = report.expected_count,
                        actual = report.actual_count,
                        "missing flows detected"
                    );
                }
                Ok(Step::Diffed(report))
            }
            ControllerEvent::Installed(rule) => Ok(Step::Added {
                new: self.expected.add(rule),
            }),
            ControllerEvent::Removed(rule) => {
                self.expected.remove(&rule)?;
                self.flow_mods.forget(&rule);
                Ok(Step::Removed)
            }
            ControllerEvent::FlushDone | ControllerEvent::Other => Ok(Step::Ignored),
        }
    }

    fn idle(&mut self) -> Step {
        let len = self.expected.len();
        if self.last_reported_len == Some(len) {
            return Step::Idle { expected_len: None };
        }
        self.last_reported_len = Some(len);
        Step::Idle {
            expected_len: Some(len),
        }
    }
}
