use std::collections::HashSet;

use ovnr_dups::{AddressPair, DuplicateGroup};
use ovnr_ports::PortIndex;
use ovnr_schemas::{CommandFailure, ToolInvocation};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::outcome::{DeleteFailure, ItemOutcome, RemediationItem, RemediationReport, ResolveError};

/// Deletes one logical switch port by id (`ovn-nbctl lsp-del <id>`).
pub trait PortDeleter {
    /// The command [`delete_port`](PortDeleter::delete_port) would run; printed in dry-run.
    fn delete_invocation(&self, port: &Uuid) -> ToolInvocation;

    fn delete_port(&self, port: &Uuid) -> Result<(), CommandFailure>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemediationMode {
    Execute,
    DryRun,
}

/// Walk every rule of every group: resolve its port, delete it if down.
///
/// `on_item` is called after each rule so callers can report progress
/// incrementally; the full report is returned at the end.
pub fn remediate<F>(
    groups: &[DuplicateGroup],
    index: &PortIndex,
    deleter: &dyn PortDeleter,
    mode: RemediationMode,
    mut on_item: F,
) -> RemediationReport
where
    F: FnMut(&RemediationItem),
{
    let mut report = RemediationReport::default();
    let mut removed: HashSet<Uuid> = HashSet::new();

    for group in groups {
        debug!(key = %group.key, rules = group.len(), "remediating duplicate group");
        for line in &group.lines {
            let outcome = remediate_one(line, index, deleter, mode, &mut removed);
            let item = RemediationItem {
                line: line.clone(),
                outcome,
            };
            on_item(&item);
            report.items.push(item);
        }
    }

    report
}

fn remediate_one(
    line: &str,
    index: &PortIndex,
    deleter: &dyn PortDeleter,
    mode: RemediationMode,
    removed: &mut HashSet<Uuid>,
) -> ItemOutcome {
    let pair = match AddressPair::from_line(line) {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, line, "cannot extract address pair");
            return ItemOutcome::Unresolved(ResolveError::Address(e));
        }
    };

    let port = match index.lookup(&pair.ip, &pair.mac) {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "port resolution failed");
            return ItemOutcome::Unresolved(ResolveError::Lookup(e));
        }
    };

    if port.state.is_up() {
        debug!(port = %port.id, ip = %pair.ip, "port is up; not deleting");
        return ItemOutcome::SkippedUp(port.id);
    }
    if removed.contains(&port.id) {
        return ItemOutcome::AlreadyDeleted(port.id);
    }

    match mode {
        RemediationMode::DryRun => {
            removed.insert(port.id);
            ItemOutcome::WouldDelete {
                port: port.id,
                command: deleter.delete_invocation(&port.id),
            }
        }
        RemediationMode::Execute => match deleter.delete_port(&port.id) {
            Ok(()) => {
                removed.insert(port.id);
                ItemOutcome::Deleted(port.id)
            }
            Err(failure) => {
                warn!(port = %port.id, error = %failure, "port delete failed");
                ItemOutcome::DeleteFailed(DeleteFailure {
                    port: port.id,
                    failure,
                })
            }
        },
    }
}
