//! ovnr-schemas
//!
//! Types shared by every crate that talks to the external OVN / OVS tools.
//! Collaborator traits (`LflowLister`, `PortLister`, `PortDeleter`,
//! `FlowDumper`) all report tool failures as [`CommandFailure`] so callers can
//! aggregate them without caring which tool failed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A fully-resolved external tool invocation: program plus argv.
///
/// Rendered with `Display` as the shell-style command line, which is what the
/// dry-run paths print.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub program: String,
    pub args: Vec<String>,
}

impl ToolInvocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for ToolInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for a in &self.args {
            write!(f, " {a}")?;
        }
        Ok(())
    }
}

/// An external tool could not be spawned or exited with a non-zero status.
///
/// `exit_code` is `None` when the process never ran or was killed by a signal.
/// `stderr` carries the tool's diagnostic text verbatim (trimmed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandFailure {
    pub command: String,
    pub exit_code: Option<i32>,
    pub stderr: String,
}

impl CommandFailure {
    pub fn exited(invocation: &ToolInvocation, exit_code: Option<i32>, stderr: &str) -> Self {
        Self {
            command: invocation.to_string(),
            exit_code,
            stderr: stderr.trim().to_string(),
        }
    }

    pub fn spawn(invocation: &ToolInvocation, err: impl fmt::Display) -> Self {
        Self {
            command: invocation.to_string(),
            exit_code: None,
            stderr: format!("spawn failed: {err}"),
        }
    }

    /// Exit code rendered for reports (`"none"` when the process did not exit normally).
    pub fn exit_label(&self) -> String {
        match self.exit_code {
            Some(c) => c.to_string(),
            None => "none".to_string(),
        }
    }
}

impl fmt::Display for CommandFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "`{}` failed (exit: {}): {}",
            self.command,
            self.exit_label(),
            self.stderr
        )
    }
}

impl std::error::Error for CommandFailure {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invocation_renders_as_command_line() {
        let inv = ToolInvocation::new("ovn-nbctl").args(["lsp-del", "abc"]);
        assert_eq!(inv.to_string(), "ovn-nbctl lsp-del abc");
    }

    #[test]
    fn failure_carries_trimmed_stderr_and_exit_code() {
        let inv = ToolInvocation::new("ovs-ofctl").arg("dump-flows");
        let f = CommandFailure::exited(&inv, Some(1), "  no such bridge\n");
        assert_eq!(f.stderr, "no such bridge");
        assert_eq!(f.exit_label(), "1");
        assert_eq!(
            f.to_string(),
            "`ovs-ofctl dump-flows` failed (exit: 1): no such bridge"
        );
    }

    #[test]
    fn failure_serializes_for_reports() {
        let inv = ToolInvocation::new("ovn-nbctl");
        let f = CommandFailure::spawn(&inv, "not found");
        let v = serde_json::to_value(&f).unwrap();
        assert_eq!(v["exit_code"], serde_json::Value::Null);
        assert_eq!(v["command"], "ovn-nbctl");
    }
}
