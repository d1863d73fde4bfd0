use std::fs::File;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use ovnr_config::HuntSettings;
use ovnr_ctl::{AppCtl, OfCtl, ProcessRunner, VerbosityGuard, VlogDestination, VlogLevel};
use ovnr_reconcile::{HuntError, Hunter, LogTailer, Step};
#[cfg(unix)]
use tokio::signal::unix::{signal, Signal, SignalKind};
use tracing::{error, info, warn};

/// Runs until SIGINT/SIGTERM. The raised vlog level is restored on the way out.
pub async fn hunt_missing_flows(cfg: &HuntSettings) -> Result<()> {
    let destination: VlogDestination = cfg.vlog.destination.parse()?;
    let level: VlogLevel = cfg.vlog.level.parse()?;

    let controller_log = File::open(&cfg.controller_log)
        .with_context(|| format!("failed to open {}", cfg.controller_log.display()))?;
    let vswitchd_log = File::open(&cfg.vswitchd_log)
        .with_context(|| format!("failed to open {}", cfg.vswitchd_log.display()))?;
    let mut controller = LogTailer::from_end(controller_log)?;
    let mut vswitchd = LogTailer::from_end(vswitchd_log)?;

    let appctl = AppCtl::new(ProcessRunner, cfg.vlog.daemon.as_str(), cfg.vlog.use_sudo);
    let ofctl = OfCtl::new(
        ProcessRunner,
        cfg.bridge.as_str(),
        cfg.openflow_version.as_str(),
    );

    // Handlers must be live before the level is raised.
    let signals = ShutdownSignals::install()?;
    let shutting_down = Arc::new(AtomicBool::new(false));
    tokio::spawn(signals.wait(shutting_down.clone()));

    let _vlog = VerbosityGuard::raise(&appctl, &cfg.vlog.module, destination, level)
        .context("failed to raise vlog level")?;

    let mut hunter = Hunter::new(cfg.table);
    let poll = Duration::from_millis(cfg.poll_interval_ms);
    info!(
        table = cfg.table,
        controller_log = %cfg.controller_log.display(),
        vswitchd_log = %cfg.vswitchd_log.display(),
        "hunting missing flows"
    );

    while !shutting_down.load(Ordering::SeqCst) {
        match vswitchd.drain() {
            Ok(lines) => {
                for line in &lines {
                    hunter.record_flow_mod(line);
                }
            }
            Err(e) => warn!(error = %e, "vswitchd log read failed"),
        }

        let read = controller
            .poll()
            .context("controller log read failed")?;

        match hunter.step(read, &ofctl) {
            Ok(Step::Idle { expected_len }) => {
                if let Some(n) = expected_len {
                    println!("expected_flows: {n}");
                }
                tokio::time::sleep(poll).await;
            }
            Ok(Step::Diffed(report)) => println!("{report}"),
            Ok(_) => {}
            Err(HuntError::Inconsistent(e)) => {
                error!(rule = %e.rule, "expected set no longer tracks the controller");
                println!("INCONSISTENT: {e}");
            }
            Err(e) => warn!(error = %e, "hunt step failed"),
        }
    }

    info!(expected = hunter.expected().len(), "hunt stopped");
    Ok(())
}

/// SIGINT/SIGTERM handlers, registered on construction rather than on first poll.
#[cfg(unix)]
struct ShutdownSignals {
    interrupt: Signal,
    terminate: Signal,
}

#[cfg(unix)]
impl ShutdownSignals {
    fn install() -> Result<Self> {
        Ok(Self {
            interrupt: signal(SignalKind::interrupt())
                .context("failed to install SIGINT handler")?,
            terminate: signal(SignalKind::terminate())
                .context("failed to install SIGTERM handler")?,
        })
    }

    async fn wait(mut self, shutting_down: Arc<AtomicBool>) {
        tokio::select! {
            _ = self.interrupt.recv() => info!("Received Ctrl+C, stopping"),
            _ = self.terminate.recv() => info!("Received SIGTERM, stopping"),
        }
        shutting_down.store(true, Ordering::SeqCst);
    }
}

#[cfg(not(unix))]
struct ShutdownSignals {
    ctrl_c: tokio::signal::windows::CtrlC,
}

#[cfg(not(unix))]
impl ShutdownSignals {
    fn install() -> Result<Self> {
        Ok(Self {
            ctrl_c: tokio::signal::windows::ctrl_c().context("failed to install Ctrl+C handler")?,
        })
    }

    async fn wait(mut self, shutting_down: Arc<AtomicBool>) {
        self.ctrl_c.recv().await;
        info!("Received Ctrl+C, stopping");
        shutting_down.store(true, Ordering::SeqCst);
    }
}
