use std::process::Command;

use ovnr_schemas::{CommandFailure, ToolInvocation};
use tracing::debug;

/// Runs one tool invocation to completion and returns its stdout.
pub trait CommandRunner {
    fn run(&self, invocation: &ToolInvocation) -> Result<String, CommandFailure>;
}

/// Spawns real processes. Blocks until the child exits.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, invocation: &ToolInvocation) -> Result<String, CommandFailure> {
        debug!(command = %invocation, "running");
        let out = Command::new(&invocation.program)
            .args(&invocation.args)
            .output()
            .map_err(|e| CommandFailure::spawn(invocation, &e))?;

        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            return Err(CommandFailure::exited(invocation, out.status.code(), &stderr));
        }
        Ok(String::from_utf8_lossy(&out.stdout).into_owned())
    }
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, invocation: &ToolInvocation) -> Result<String, CommandFailure> {
        (**self).run(invocation)
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::*;

    /// Records every invocation and replays canned results in order.
    #[derive(Default)]
    pub struct ScriptedRunner {
        pub seen: RefCell<Vec<String>>,
        pub replies: RefCell<VecDeque<Result<String, (i32, String)>>>,
    }

    impl ScriptedRunner {
        pub fn replying(replies: Vec<Result<&str, (i32, &str)>>) -> Self {
            let replies = replies
                .into_iter()
                .map(|r| r.map(str::to_string).map_err(|(c, e)| (c, e.to_string())))
                .collect();
            Self {
                seen: RefCell::new(Vec::new()),
                replies: RefCell::new(replies),
            }
        }
    }

    impl CommandRunner for ScriptedRunner {
        fn run(&self, invocation: &ToolInvocation) -> Result<String, CommandFailure> {
            self.seen.borrow_mut().push(invocation.to_string());
            match self.replies.borrow_mut().pop_front() {
                Some(Ok(out)) => Ok(out),
                Some(Err((code, stderr))) => {
                    Err(CommandFailure::exited(invocation, Some(code), &stderr))
                }
                None => Ok(String::new()),
            }
        }
    }
}
