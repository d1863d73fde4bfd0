use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use ovnr_config::{resolve_connection, OvnrConfig};
use ovnr_ctl::{NbCtl, ProcessRunner, SbCtl};
use ovnr_dups::{fetch_duplicates, DuplicateFilter, DuplicateGroup};
use ovnr_ports::PortIndex;
use ovnr_remediate::{
    remediate, ItemOutcome, RemediationItem, RemediationMode, RemediationReport,
};
use tracing::{info, warn};

pub fn find_duplicates(
    cfg: &OvnrConfig,
    datapath: &str,
    delete: bool,
    dry_run: bool,
) -> Result<ExitCode> {
    let conn = resolve_connection(&cfg.ovn)?;
    let filter = DuplicateFilter {
        stage: cfg.duplicates.stage.clone(),
        outport_prefix: cfg.duplicates.outport_prefix.clone(),
    };

    let sb = SbCtl::new(ProcessRunner, conn.clone());
    let groups = fetch_duplicates(&sb, datapath, &filter)
        .with_context(|| format!("lflow-list failed for datapath {datapath}"))?;
    info!(datapath, groups = groups.len(), "duplicate detection done");

    print_report(&groups);

    if groups.is_empty() || !delete {
        return Ok(ExitCode::SUCCESS);
    }

    let nb = NbCtl::new(ProcessRunner, conn);
    let index = PortIndex::fetch(&nb).context("failed to build port index")?;
    let mode = if dry_run {
        RemediationMode::DryRun
    } else {
        RemediationMode::Execute
    };

    let mut progress = Progress::new(io::stdout());
    let report = remediate(&groups, &index, &nb, mode, |item| {
        if let Err(e) = progress.item(item) {
            warn!(error = %e, "failed to write remediation progress");
        }
    });
    if let Err(e) = progress.finish() {
        warn!(error = %e, "failed to write remediation progress");
    }

    Ok(finish(&report))
}

/// Progress marks share one line; a `CMD:` line always starts on its own.
struct Progress<W: Write> {
    out: W,
    marks_pending: bool,
}

impl<W: Write> Progress<W> {
    fn new(out: W) -> Self {
        Self {
            out,
            marks_pending: false,
        }
    }

    fn item(&mut self, item: &RemediationItem) -> io::Result<()> {
        match &item.outcome {
            ItemOutcome::WouldDelete { command, .. } => {
                self.end_marks()?;
                writeln!(self.out, "CMD: {command}")
            }
            outcome => match outcome.progress_mark() {
                Some(mark) => {
                    write!(self.out, "{mark}")?;
                    self.marks_pending = true;
                    self.out.flush()
                }
                None => Ok(()),
            },
        }
    }

    fn finish(&mut self) -> io::Result<()> {
        self.end_marks()?;
        self.out.flush()
    }

    fn end_marks(&mut self) -> io::Result<()> {
        if self.marks_pending {
            writeln!(self.out)?;
            self.marks_pending = false;
        }
        Ok(())
    }
}

/// `<count> <key>` per duplicated key, in listing order.
fn print_report(groups: &[DuplicateGroup]) {
    for g in groups {
        println!("{} {}", g.len(), g.key_text);
    }
}

fn finish(report: &RemediationReport) -> ExitCode {
    info!(
        deleted = report.deleted().len(),
        unresolved = report.unresolved(),
        failed = report.failures().len(),
        "remediation done"
    );
    if report.is_success() {
        return ExitCode::SUCCESS;
    }

    println!("Ports that couldn't be deleted:");
    for f in report.failures() {
        println!("{f}");
    }
    ExitCode::from(1)
}
