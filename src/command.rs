use crate::env::Environment;
use anyhow::Result;
use std::io::{Read, Write};
use std::process::{Child, Stdio};

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line tools.
pub type ExitCode = i32;

/// Abstraction over a readable input stream that can also be converted into
/// a [`Stdio`] handle for spawning external processes.
///
/// Implementors typically wrap standard input, a pipe read end, or a file.
/// A blanket implementation exists for any type that implements `Read` and
/// `Into<Stdio>` (e.g. `std::io::PipeReader` or `std::fs::File`).
pub trait Stdin: Read {
    /// Convert this input into a [`Stdio`] handle suitable for `std::process::Command`.
    fn stdio(self: Box<Self>) -> Stdio;
}

impl<T: Read + Into<Stdio>> Stdin for T {
    fn stdio(self: Box<Self>) -> Stdio {
        (*self).into()
    }
}

/// Abstraction over a writable output stream that can also be converted into
/// a [`Stdio`] handle for spawning external processes.
///
/// A blanket implementation exists for any type that implements `Write` and
/// `Into<Stdio>` (e.g. `std::io::PipeWriter` or `std::fs::File`).
pub trait Stdout: Write {
    /// Convert this output into a [`Stdio`] handle suitable for `std::process::Command`.
    fn stdio(self: Box<Self>) -> Stdio;
}

impl<T: Write + Into<Stdio>> Stdout for T {
    fn stdio(self: Box<Self>) -> Stdio {
        (*self).into()
    }
}

/// Outcome of launching a command.
///
/// Builtins complete synchronously in-process; external commands hand back
/// the spawned child so the caller decides when to wait.
pub enum Execution {
    /// The command already ran to completion with this exit code.
    Completed(ExitCode),
    /// An external process was spawned and has not been waited on yet.
    Running(Child),
}

impl Execution {
    /// Block until the command has terminated and map its status to an exit code.
    pub fn wait(self) -> Result<ExitCode> {
        match self {
            Execution::Completed(code) => Ok(code),
            Execution::Running(mut child) => {
                let status = child.wait()?;
                match status.code() {
                    Some(code) => Ok(code),
                    None => Ok(terminated_by_signal(status)),
                }
            }
        }
    }
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: std::process::ExitStatus) -> ExitCode {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: std::process::ExitStatus) -> ExitCode {
    -1
}

/// Object-safe trait for any command that can be executed by the interpreter.
///
/// This is implemented by built-ins via a blanket impl and by external commands.
/// The handles are consumed by the call: whatever is not handed on to a child
/// process is dropped (closed) before the call returns, on every exit path.
pub trait ExecutableCommand {
    /// Start the command with the given input/output handles.
    fn launch(
        self: Box<Self>,
        stdin: Box<dyn Stdin>,
        stdout: Box<dyn Stdout>,
        env: &Environment,
    ) -> Result<Execution>;

    /// Launch the command and wait for it to terminate.
    fn execute(
        self: Box<Self>,
        stdin: Box<dyn Stdin>,
        stdout: Box<dyn Stdout>,
        env: &Environment,
    ) -> Result<ExitCode> {
        self.launch(stdin, stdout, env)?.wait()
    }
}

/// Factory that tries to create a command from a name and its arguments.
///
/// Returns `None` when the factory doesn't recognize the `name`.
/// Implementations can use the environment to resolve executables (e.g., using PATH).
pub trait CommandFactory {
    /// Attempt to create a command instance for the provided name and arguments.
    fn try_create(
        &self,
        env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>>;
}
