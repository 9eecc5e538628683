use tracing::{debug, info};

use crate::config::Isolation;
use crate::error::{Error, Result};
use crate::profile::Check;
use crate::sandbox::{self, ToolResult};

use super::commands::{Environment, tool_command};

/// Runs one tool invocation to completion.
///
/// The pipeline only ever talks to tools through this trait, so it stays
/// independent of which tools exist and of how they are isolated.
pub trait Dispatcher {
    /// Run `argv` (program first) on behalf of `check`.
    ///
    /// Returns [`Error::EnvironmentUnavailable`] when the sandbox or the
    /// program cannot be started; a non-zero exit is a normal `Ok`.
    fn invoke(&mut self, check: &Check, argv: &[String]) -> Result<ToolResult>;
}

/// Dispatches to real processes, in a container or on the host.
pub struct SandboxDispatcher {
    env: Environment,
    /// Engine probe outcome, remembered for the whole run.
    engine: Option<std::result::Result<(), String>>,
}

impl SandboxDispatcher {
    pub fn new(env: Environment) -> Self {
        Self { env, engine: None }
    }

    fn ensure_engine(&mut self) -> Result<()> {
        if self.env.isolation == Isolation::Host {
            return Ok(());
        }
        let engine = &self.env.engine;
        let probe = self
            .engine
            .get_or_insert_with(|| sandbox::ensure_available(engine).map_err(|e| e.to_string()));
        probe
            .clone()
            .map_err(Error::EnvironmentUnavailable)
    }
}

impl Dispatcher for SandboxDispatcher {
    fn invoke(&mut self, check: &Check, argv: &[String]) -> Result<ToolResult> {
        self.ensure_engine()?;
        let cmd = tool_command(&self.env, check, argv);
        info!(check = %check.name, isolation = self.env.isolation.as_str(), "running");
        debug!("{} {}", cmd.program, shell_words::join(&cmd.args));
        let result = sandbox::run(cmd)?;
        debug!(check = %check.name, exit_code = ?result.exit_code, "finished");
        Ok(result)
    }
}
