//! Classification of ovn-controller `ofctrl` debug lines.

use ovnr_flow::{canonicalize, CanonicalRule, ParseError, SourceFormat};

/// ofctrl finished a flow-table flush with nothing left to send.
pub const FLUSH_MARKER: &str = "ofctrl_put not needed";
/// A flow was queued for install.
pub const INSTALL_MARKER: &str = "ofctrl_add_flow";
/// A previously installed flow was removed.
pub const REMOVE_MARKER: &str = "removing installed flow";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControllerEvent {
    FlushDone,
    Installed(CanonicalRule),
    Removed(CanonicalRule),
    /// Anything else, including install/remove lines for other tables.
    Other,
}

/// Classify one complete controller log line for the table of interest.
///
/// Only install/remove lines are canonicalized; a parse failure there is
/// returned so the caller can log it and move on.
pub fn classify(line: &str, table: u32) -> Result<ControllerEvent, ParseError> {
    if line.contains(FLUSH_MARKER) {
        return Ok(ControllerEvent::FlushDone);
    }

    let installed = line.contains(INSTALL_MARKER);
    if !installed && !line.contains(REMOVE_MARKER) {
        return Ok(ControllerEvent::Other);
    }

    let rule = canonicalize(line, SourceFormat::DebugLog)?;
    if rule.table != table {
        return Ok(ControllerEvent::Other);
    }

    Ok(if installed {
        ControllerEvent::Installed(rule)
    } else {
        ControllerEvent::Removed(rule)
    })
}
