use crate::command::{CommandFactory, ExecutableCommand, Execution, Stdin, Stdout};
use crate::env::Environment;
use crate::interpreter::Factory;
use crate::resolver;
use anyhow::{Context, Result};
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;
use std::process::Command;

/// Command that is not a builtin: a resolved executable to spawn as a child
/// process.
pub struct ExternalCommand {
    path: PathBuf,
    args: Vec<OsString>,
}

impl ExternalCommand {
    pub fn new(path: PathBuf, args: Vec<OsString>) -> Self {
        Self { path, args }
    }
}

impl CommandFactory for Factory<ExternalCommand> {
    fn try_create(
        &self,
        env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>> {
        let search_paths = env.get_var("PATH").unwrap_or_default();
        let path = resolver::resolve(OsStr::new(&search_paths), name)?;
        Some(Box::new(ExternalCommand::new(
            path,
            args.iter().map(|a| a.into()).collect(),
        )))
    }
}

impl ExecutableCommand for ExternalCommand {
    /// Spawn the child bound to the given handles and hand it back without
    /// waiting. The parent's copies of the handles are released here: they
    /// are consumed while wiring up the child's standard streams.
    fn launch(
        self: Box<Self>,
        stdin: Box<dyn Stdin>,
        stdout: Box<dyn Stdout>,
        env: &Environment,
    ) -> Result<Execution> {
        let mut cmd = Command::new(&self.path);
        cmd.args(&self.args)
            .stdin(stdin.stdio())
            .stdout(stdout.stdio())
            .envs(env.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        // Children see the conventional argv[0]: the executable's base name,
        // not the resolved path.
        #[cfg(unix)]
        if let Some(base) = self.path.file_name() {
            use std::os::unix::process::CommandExt;
            cmd.arg0(base);
        }

        let child = cmd
            .spawn()
            .with_context(|| format!("failed to spawn {}", self.path.display()))?;
        Ok(Execution::Running(child))
    }
}
