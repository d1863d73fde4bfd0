//! Remote daemon log verbosity via `ovn-appctl vlog/list` and `vlog/set`.
//!
//! `vlog/list` prints one row per module:
//!
//! ```text
//!                  console    syslog    file
//!                  -------    ------    ------
//! ofctrl             OFF        ERR       INFO
//! ```
//!
//! Column 0 is the module name; destination columns follow in
//! [`VlogDestination`] ordinal order.

use std::fmt;
use std::str::FromStr;

use ovnr_schemas::{CommandFailure, ToolInvocation};
use tracing::{info, warn};

use crate::runner::CommandRunner;

// ---------------------------------------------------------------------------
// Levels and destinations
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VlogLevel {
    Off,
    Emer,
    Err,
    Warn,
    Info,
    Dbg,
}

impl VlogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            VlogLevel::Off => "off",
            VlogLevel::Emer => "emer",
            VlogLevel::Err => "err",
            VlogLevel::Warn => "warn",
            VlogLevel::Info => "info",
            VlogLevel::Dbg => "dbg",
        }
    }
}

impl fmt::Display for VlogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VlogLevel {
    type Err = VlogError;

    fn from_str(s: &str) -> Result<Self, VlogError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" => Ok(VlogLevel::Off),
            "emer" => Ok(VlogLevel::Emer),
            "err" => Ok(VlogLevel::Err),
            "warn" => Ok(VlogLevel::Warn),
            "info" => Ok(VlogLevel::Info),
            "dbg" => Ok(VlogLevel::Dbg),
            _ => Err(VlogError::InvalidLevel { raw: s.to_string() }),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VlogDestination {
    Console,
    Syslog,
    File,
}

impl VlogDestination {
    pub fn ordinal(&self) -> usize {
        match self {
            VlogDestination::Console => 0,
            VlogDestination::Syslog => 1,
            VlogDestination::File => 2,
        }
    }

    /// Whitespace-token index of this destination in a `vlog/list` row.
    pub fn column(&self) -> usize {
        1 + self.ordinal()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VlogDestination::Console => "console",
            VlogDestination::Syslog => "syslog",
            VlogDestination::File => "file",
        }
    }
}

impl fmt::Display for VlogDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VlogDestination {
    type Err = VlogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "console" => Ok(VlogDestination::Console),
            "syslog" => Ok(VlogDestination::Syslog),
            "file" => Ok(VlogDestination::File),
            _ => Err(VlogError::InvalidDestination { raw: s.to_string() }),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VlogError {
    Command(CommandFailure),
    /// `vlog/list` has no row for the module.
    ModuleNotListed { module: String },
    /// The row exists but is shorter than the destination column.
    MissingColumn { module: String, column: usize },
    InvalidLevel { raw: String },
    InvalidDestination { raw: String },
}

impl fmt::Display for VlogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VlogError::Command(e) => write!(f, "{e}"),
            VlogError::ModuleNotListed { module } => {
                write!(f, "module '{module}' not found in vlog/list output")
            }
            VlogError::MissingColumn { module, column } => {
                write!(f, "vlog/list row for '{module}' has no column {column}")
            }
            VlogError::InvalidLevel { raw } => write!(f, "invalid vlog level '{raw}'"),
            VlogError::InvalidDestination { raw } => {
                write!(f, "invalid vlog destination '{raw}'")
            }
        }
    }
}

impl std::error::Error for VlogError {}

impl From<CommandFailure> for VlogError {
    fn from(e: CommandFailure) -> Self {
        VlogError::Command(e)
    }
}

/// Current level of `module` for `destination` from `vlog/list` output.
pub fn parse_vlog_list(
    output: &str,
    module: &str,
    destination: VlogDestination,
) -> Result<VlogLevel, VlogError> {
    let tokens: Vec<&str> = output
        .lines()
        .map(|l| l.split_whitespace().collect::<Vec<_>>())
        .find(|t| t.first() == Some(&module))
        .ok_or_else(|| VlogError::ModuleNotListed {
            module: module.to_string(),
        })?;

    let column = destination.column();
    let raw = tokens.get(column).ok_or_else(|| VlogError::MissingColumn {
        module: module.to_string(),
        column,
    })?;
    raw.parse()
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

pub trait VerbosityControl {
    fn get_level(&self, module: &str, destination: VlogDestination)
        -> Result<VlogLevel, VlogError>;

    fn set_level(
        &self,
        module: &str,
        destination: VlogDestination,
        level: VlogLevel,
    ) -> Result<(), VlogError>;
}

/// `[sudo] ovn-appctl -t <daemon> ...`
pub struct AppCtl<R> {
    runner: R,
    daemon: String,
    use_sudo: bool,
}

impl<R: CommandRunner> AppCtl<R> {
    pub fn new(runner: R, daemon: impl Into<String>, use_sudo: bool) -> Self {
        Self {
            runner,
            daemon: daemon.into(),
            use_sudo,
        }
    }

    fn invocation(&self) -> ToolInvocation {
        let target = ["ovn-appctl", "-t", self.daemon.as_str()];
        if self.use_sudo {
            ToolInvocation::new("sudo").args(target)
        } else {
            ToolInvocation::new("ovn-appctl").args(target[1..].iter().copied())
        }
    }
}

impl<R: CommandRunner> VerbosityControl for AppCtl<R> {
    fn get_level(
        &self,
        module: &str,
        destination: VlogDestination,
    ) -> Result<VlogLevel, VlogError> {
        let out = self.runner.run(&self.invocation().arg("vlog/list"))?;
        parse_vlog_list(&out, module, destination)
    }

    fn set_level(
        &self,
        module: &str,
        destination: VlogDestination,
        level: VlogLevel,
    ) -> Result<(), VlogError> {
        let setting = format!("{module}:{destination}:{level}");
        self.runner
            .run(&self.invocation().arg("vlog/set").arg(setting))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Scoped raise
// ---------------------------------------------------------------------------

/// Holds a module at a raised level; puts the previous level back on drop.
pub struct VerbosityGuard<'a> {
    ctl: &'a dyn VerbosityControl,
    module: String,
    destination: VlogDestination,
    previous: VlogLevel,
}

impl<'a> VerbosityGuard<'a> {
    /// Read the current level, then set `level`. Nothing is changed if the
    /// read fails.
    pub fn raise(
        ctl: &'a dyn VerbosityControl,
        module: &str,
        destination: VlogDestination,
        level: VlogLevel,
    ) -> Result<Self, VlogError> {
        let previous = ctl.get_level(module, destination)?;
        ctl.set_level(module, destination, level)?;
        info!(module, %destination, from = %previous, to = %level, "vlog level raised");
        Ok(Self {
            ctl,
            module: module.to_string(),
            destination,
            previous,
        })
    }

    pub fn previous(&self) -> VlogLevel {
        self.previous
    }
}

impl Drop for VerbosityGuard<'_> {
    fn drop(&mut self) {
        match self
            .ctl
            .set_level(&self.module, self.destination, self.previous)
        {
            Ok(()) => info!(module = %self.module, level = %self.previous, "vlog level restored"),
            Err(e) => warn!(module = %self.module, error = %e, "failed to restore vlog level"),
        }
    }
}
