//! `ovn-nbctl` / `ovn-sbctl` over TLS to the clustered databases.

use ovnr_config::OvnConnection;
use ovnr_dups::LflowLister;
use ovnr_ports::PortLister;
use ovnr_remediate::PortDeleter;
use ovnr_schemas::{CommandFailure, ToolInvocation};
use uuid::Uuid;

use crate::runner::CommandRunner;

/// Common argv prefix: TLS material, database address, leader pinning.
fn db_invocation(program: &str, db: &str, conn: &OvnConnection) -> ToolInvocation {
    let inv = ToolInvocation::new(program)
        .arg("-p")
        .arg(conn.private_key.display().to_string())
        .arg("-C")
        .arg(conn.ca_cert.display().to_string())
        .arg("-c")
        .arg(conn.certificate.display().to_string())
        .arg("--db")
        .arg(db);
    if conn.leader_only {
        inv.arg("--leader-only")
    } else {
        inv
    }
}

// ---------------------------------------------------------------------------
// Southbound
// ---------------------------------------------------------------------------

pub struct SbCtl<R> {
    runner: R,
    conn: OvnConnection,
}

impl<R: CommandRunner> SbCtl<R> {
    pub fn new(runner: R, conn: OvnConnection) -> Self {
        Self { runner, conn }
    }

    fn invocation(&self) -> ToolInvocation {
        db_invocation("ovn-sbctl", &self.conn.sb_db, &self.conn)
    }
}

impl<R: CommandRunner> LflowLister for SbCtl<R> {
    fn lflow_list(&self, datapath: &str) -> Result<String, CommandFailure> {
        let inv = self.invocation().arg("lflow-list").arg(datapath);
        self.runner.run(&inv)
    }
}

// ---------------------------------------------------------------------------
// Northbound
// ---------------------------------------------------------------------------

pub struct NbCtl<R> {
    runner: R,
    conn: OvnConnection,
}

impl<R: CommandRunner> NbCtl<R> {
    pub fn new(runner: R, conn: OvnConnection) -> Self {
        Self { runner, conn }
    }

    fn invocation(&self) -> ToolInvocation {
        db_invocation("ovn-nbctl", &self.conn.nb_db, &self.conn)
    }
}

impl<R: CommandRunner> PortLister for NbCtl<R> {
    fn list_ports(&self) -> Result<String, CommandFailure> {
        let inv = self.invocation().args(["list", "logical-switch-port"]);
        self.runner.run(&inv)
    }
}

impl<R: CommandRunner> PortDeleter for NbCtl<R> {
    fn delete_invocation(&self, port: &Uuid) -> ToolInvocation {
        self.invocation().arg("lsp-del").arg(port.to_string())
    }

    fn delete_port(&self, port: &Uuid) -> Result<(), CommandFailure> {
        self.runner.run(&self.delete_invocation(port)).map(|_| ())
    }
}
