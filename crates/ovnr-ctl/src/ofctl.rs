use ovnr_reconcile::FlowDumper;
use ovnr_schemas::{CommandFailure, ToolInvocation};

use crate::runner::CommandRunner;

/// `ovs-ofctl -O <version> dump-flows <bridge> table=<n>`
pub struct OfCtl<R> {
    runner: R,
    bridge: String,
    openflow_version: String,
}

impl<R: CommandRunner> OfCtl<R> {
    pub fn new(runner: R, bridge: impl Into<String>, openflow_version: impl Into<String>) -> Self {
        Self {
            runner,
            bridge: bridge.into(),
            openflow_version: openflow_version.into(),
        }
    }
}

impl<R: CommandRunner> FlowDumper for OfCtl<R> {
    fn dump_flows(&self, table: u32) -> Result<String, CommandFailure> {
        let inv = ToolInvocation::new("ovs-ofctl")
            .arg("-O")
            .arg(self.openflow_version.as_str())
            .arg("dump-flows")
            .arg(self.bridge.as_str())
            .arg(format!("table={table}"));
        self.runner.run(&inv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::fake::ScriptedRunner;

    #[test]
    fn dumps_one_table_of_the_integration_bridge() {
        let runner = ScriptedRunner::default();
        let ofctl = OfCtl::new(&runner, "br-int", "OpenFlow15");
        ofctl.dump_flows(20).unwrap();
        assert_eq!(
            runner.seen.borrow().as_slice(),
            ["ovs-ofctl -O OpenFlow15 dump-flows br-int table=20"]
        );
    }
}
