use crate::command::{CommandFactory, ExecutableCommand, Execution, ExitCode, Stdin, Stdout};
use crate::env::Environment;
use crate::interpreter::Factory;
use anyhow::Result;
use argh::{EarlyExit, FromArgs};
use std::io::{Read, Write};

/// Escape sequence that clears the screen and the scrollback buffer.
const CLEAR_SEQUENCE: &str = "\x1b[H\x1b[2J\x1b[3J";

/// Built-in commands known to the interpreter at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed
/// directly in-process without spawning a child process. Their only side
/// effect is writing to the currently-bound output stream (or terminating
/// the process, for `exit`); they keep no state between invocations.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "echo".
    fn name() -> &'static str;

    /// Executes the command using the provided IO streams.
    ///
    /// Return value should follow shell conventions: 0 for success, non-zero for error.
    fn execute(
        self,
        stdin: &mut dyn Read,
        stdout: &mut dyn Write,
        env: &Environment,
    ) -> Result<ExitCode>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    /// Builtins complete synchronously. The boxed handles are dropped when
    /// this returns, whether the handler succeeded or failed, so a pipe
    /// write end or redirection file is always released.
    fn launch(
        self: Box<Self>,
        mut stdin: Box<dyn Stdin>,
        mut stdout: Box<dyn Stdout>,
        env: &Environment,
    ) -> Result<Execution> {
        match BuiltinCommand::execute(*self, &mut stdin, &mut stdout, env) {
            Ok(code) => Ok(Execution::Completed(code)),
            Err(e) => {
                eprintln!("{}: {}", T::name(), e);
                Ok(Execution::Completed(1))
            }
        }
    }
}

/// Fallback command for builtin invocations argh could not parse: prints the
/// generated usage/help text and reports the corresponding status.
struct InvalidArgs {
    output: String,
    is_error: bool,
}

impl ExecutableCommand for InvalidArgs {
    fn launch(
        self: Box<Self>,
        _stdin: Box<dyn Stdin>,
        mut stdout: Box<dyn Stdout>,
        _env: &Environment,
    ) -> Result<Execution> {
        stdout.write_all(self.output.as_bytes())?;
        Ok(Execution::Completed(if self.is_error { 1 } else { 0 }))
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(
        &self,
        _env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>> {
        if name == T::name() {
            Some(match T::from_args(&[name], args) {
                Ok(cmd) => Box::new(cmd),
                Err(EarlyExit { output, status }) => Box::new(InvalidArgs {
                    output,
                    is_error: status.is_err(),
                }),
            })
        } else {
            None
        }
    }
}

#[derive(FromArgs)]
/// Write the arguments to the current output stream, separated by single
/// spaces and followed by a newline.
pub struct Echo {
    #[argh(positional, greedy)]
    /// values to print as-is, separated by spaces.
    pub args: Vec<String>,
}

impl BuiltinCommand for Echo {
    fn name() -> &'static str {
        "echo"
    }

    fn execute(
        self,
        _stdin: &mut dyn Read,
        stdout: &mut dyn Write,
        _env: &Environment,
    ) -> Result<ExitCode> {
        writeln!(stdout, "{}", self.args.join(" "))?;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Terminate the interpreter immediately. No further lines are processed.
pub struct Exit {
    #[argh(positional, greedy)]
    /// ignored; the interpreter always exits with status 0.
    pub _args: Vec<String>,
}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn execute(
        self,
        _stdin: &mut dyn Read,
        _stdout: &mut dyn Write,
        _env: &Environment,
    ) -> Result<ExitCode> {
        std::process::exit(0)
    }
}

#[derive(FromArgs)]
/// Clear the terminal screen and scrollback buffer.
pub struct Clear {}

impl BuiltinCommand for Clear {
    fn name() -> &'static str {
        "clear"
    }

    fn execute(
        self,
        _stdin: &mut dyn Read,
        stdout: &mut dyn Write,
        _env: &Environment,
    ) -> Result<ExitCode> {
        write!(stdout, "{CLEAR_SEQUENCE}")?;
        stdout.flush()?;
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Cursor;

    fn test_env() -> Environment {
        Environment {
            vars: HashMap::new(),
        }
    }

    #[test]
    fn test_echo_joins_args_with_trailing_newline() {
        let env = test_env();

        let mut out = Vec::new();
        let echo = Echo {
            args: vec!["a".to_string(), "b".to_string(), "c".to_string()],
        };
        let res = echo.execute(&mut Cursor::new(Vec::new()), &mut out, &env);

        assert_eq!(res.unwrap(), 0);
        assert_eq!(String::from_utf8(out).unwrap(), "a b c\n");
    }

    #[test]
    fn test_echo_no_args_prints_bare_newline() {
        let env = test_env();

        let mut out = Vec::new();
        let echo = Echo { args: Vec::new() };
        let res = echo.execute(&mut Cursor::new(Vec::new()), &mut out, &env);

        assert_eq!(res.unwrap(), 0);
        assert_eq!(String::from_utf8(out).unwrap(), "\n");
    }

    #[test]
    fn test_clear_emits_escape_sequence() {
        let env = test_env();

        let mut out = Vec::new();
        let res = Clear {}.execute(&mut Cursor::new(Vec::new()), &mut out, &env);

        assert_eq!(res.unwrap(), 0);
        assert_eq!(String::from_utf8(out).unwrap(), "\x1b[H\x1b[2J\x1b[3J");
    }

    #[test]
    fn test_factory_only_matches_own_name() {
        let env = test_env();
        let factory = Factory::<Echo>::default();
        assert!(factory.try_create(&env, "echo", &["hi"]).is_some());
        assert!(factory.try_create(&env, "printf", &["hi"]).is_none());
    }

    #[test]
    fn test_exit_factory_accepts_stray_arguments() {
        let env = test_env();
        let factory = Factory::<Exit>::default();
        // `exit 1 2 3` still parses; arguments are ignored.
        assert!(factory.try_create(&env, "exit", &["1", "2", "3"]).is_some());
    }
}
