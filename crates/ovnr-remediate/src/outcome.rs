use std::fmt;

use ovnr_dups::AddressError;
use ovnr_ports::PortLookupError;
use ovnr_schemas::{CommandFailure, ToolInvocation};
use uuid::Uuid;

/// Why a rule could not be tied to a single port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    Address(AddressError),
    Lookup(PortLookupError),
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::Address(e) => write!(f, "{e}"),
            ResolveError::Lookup(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ResolveError {}

/// A delete call that returned non-zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteFailure {
    pub port: Uuid,
    pub failure: CommandFailure,
}

impl fmt::Display for DeleteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} (exit: {})",
            self.port,
            self.failure.stderr,
            self.failure.exit_label()
        )
    }
}

/// What happened to one rule of one duplicate group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Deleted(Uuid),
    /// Dry-run: resolved, eligible, and this is the command that would run.
    WouldDelete { port: Uuid, command: ToolInvocation },
    /// Port is up; left alone.
    SkippedUp(Uuid),
    /// An earlier rule in this batch already removed the same port.
    AlreadyDeleted(Uuid),
    Unresolved(ResolveError),
    DeleteFailed(DeleteFailure),
}

impl ItemOutcome {
    /// One-character progress marker, or `None` for silent outcomes.
    ///
    /// `.` deleted, `F` delete failed, `E` port not found / unparseable rule,
    /// `M` more than one port matched.
    pub fn progress_mark(&self) -> Option<char> {
        match self {
            ItemOutcome::Deleted(_) => Some('.'),
            ItemOutcome::DeleteFailed(_) => Some('F'),
            ItemOutcome::Unresolved(ResolveError::Lookup(PortLookupError::ManyPortsFound {
                ..
            })) => Some('M'),
            ItemOutcome::Unresolved(_) => Some('E'),
            ItemOutcome::WouldDelete { .. }
            | ItemOutcome::SkippedUp(_)
            | ItemOutcome::AlreadyDeleted(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemediationItem {
    /// The rule line this outcome belongs to.
    pub line: String,
    pub outcome: ItemOutcome,
}

/// Every outcome of one remediation batch, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemediationReport {
    pub items: Vec<RemediationItem>,
}

impl RemediationReport {
    pub fn failures(&self) -> Vec<&DeleteFailure> {
        self.items
            .iter()
            .filter_map(|i| match &i.outcome {
                ItemOutcome::DeleteFailed(f) => Some(f),
                _ => None,
            })
            .collect()
    }

    pub fn deleted(&self) -> Vec<Uuid> {
        self.items
            .iter()
            .filter_map(|i| match &i.outcome {
                ItemOutcome::Deleted(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn unresolved(&self) -> usize {
        self.items
            .iter()
            .filter(|i| matches!(i.outcome, ItemOutcome::Unresolved(_)))
            .count()
    }

    /// `true` when no delete call failed. Unresolved rules do not count as failures.
    pub fn is_success(&self) -> bool {
        self.failures().is_empty()
    }
}
