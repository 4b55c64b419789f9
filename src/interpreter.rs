use crate::classifier::{self, Line};
use crate::command::{CommandFactory, Execution, ExitCode, Stdin, Stdout};
use crate::env::Environment;
use anyhow::{Context, Result};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::Path;
use std::process::Stdio;

/// Factory allows creating instances of ExecutableCommand.
///
/// Only support commands defined in this crate — BuiltinCommand and ExternalCommand.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// How a two-stage pipeline is scheduled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PipelineMode {
    /// Run the left stage to completion before starting the right one. The
    /// left process writes into the kernel pipe buffer with no reader
    /// attached, so output larger than that buffer blocks forever.
    #[default]
    Sequential,
    /// Start both stages, then wait on them in order, so data streams
    /// through the pipe regardless of size.
    Concurrent,
}

/// Interpreter setup knobs.
#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    /// Pipeline scheduling; see [`PipelineMode`].
    pub pipeline: PipelineMode,
    /// Keep reading after the user interrupts the prompt (Ctrl-C), instead
    /// of shutting the interpreter down. Meant for interactive mode only.
    pub ignore_interrupts: bool,
}

/// A minimal line-oriented interpreter that executes built-in and external
/// commands, with single-stage output redirection and a single pipe.
///
/// The interpreter holds an [`Environment`] snapshot and a list of
/// [`CommandFactory`] objects that are queried in order to create commands
/// by name. See [`Default`] for the factories included out of the box.
///
/// Example
/// ```
/// use minish::Interpreter;
/// let mut sh = Interpreter::default();
/// let code = sh.interpret_line("echo hello world").unwrap();
/// assert_eq!(code, 0);
/// ```
pub struct Interpreter {
    env: Environment,
    commands: Vec<Box<dyn CommandFactory>>,
    options: Options,
}

impl Interpreter {
    /// Create a new interpreter with a custom set of command factories.
    pub fn new(commands: Vec<Box<dyn CommandFactory>>) -> Self {
        Self {
            env: Environment::new(),
            commands,
            options: Options::default(),
        }
    }

    /// Replace the interpreter's setup options.
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Run a single command invocation, optionally bound to the given
    /// input/output handles; missing handles default to the process's
    /// standard streams.
    ///
    /// Builtins shadow any same-named external program because their
    /// factories come first in the dispatch list. An unresolved command is
    /// reported to the error stream and yields exit code 127 without
    /// spawning anything.
    pub fn run(
        &mut self,
        argv: &[String],
        stdin: Option<Box<dyn Stdin>>,
        stdout: Option<Box<dyn Stdout>>,
    ) -> Result<ExitCode> {
        self.launch(argv, stdin, stdout)?.wait()
    }

    /// Like [`Interpreter::run`], but hands back the launched command so a
    /// pipeline can start its second stage before waiting on the first.
    fn launch(
        &mut self,
        argv: &[String],
        stdin: Option<Box<dyn Stdin>>,
        stdout: Option<Box<dyn Stdout>>,
    ) -> Result<Execution> {
        let (name, args) = argv.split_first().context("empty command")?;
        let args: Vec<&str> = args.iter().map(String::as_str).collect();

        let stdin = stdin.unwrap_or_else(|| Box::new(InheritedStdin(io::stdin().lock())));
        let stdout = stdout.unwrap_or_else(|| Box::new(InheritedStdout(io::stdout())));

        for factory in &self.commands {
            if let Some(cmd) = factory.try_create(&self.env, name, &args) {
                return cmd.launch(stdin, stdout, &self.env);
            }
        }
        eprintln!("{name}: command not found");
        Ok(Execution::Completed(127))
    }

    /// Classify and execute one input line.
    ///
    /// Rejected lines (unsupported syntax) and redirection targets that
    /// cannot be opened are reported to the error stream and skipped; the
    /// caller keeps feeding lines. Comment and blank lines execute nothing.
    pub fn interpret_line(&mut self, line: &str) -> Result<ExitCode> {
        self.interpret(line, None)
    }

    fn interpret(&mut self, line: &str, stdout: Option<Box<dyn Stdout>>) -> Result<ExitCode> {
        let parsed = match classifier::classify(line) {
            Ok(parsed) => parsed,
            Err(e) => {
                eprintln!("{e}");
                return Ok(2);
            }
        };

        match parsed {
            Line::Empty => Ok(0),
            Line::Plain(argv) => self.run(&argv, None, stdout),
            Line::Redirect { argv, target } => {
                // Write/truncate: a rerun overwrites, never appends.
                let file = match File::create(&target) {
                    Ok(file) => file,
                    Err(e) => {
                        eprintln!("{target}: {e}");
                        return Ok(1);
                    }
                };
                self.run(&argv, None, Some(Box::new(file)))
            }
            Line::Pipe { left, right } => self.run_pipeline(&left, &right, stdout),
        }
    }

    /// Wire a pipe between the two commands.
    ///
    /// The interpreter's own write-end copy travels into the left `run`
    /// call and is closed there; only then does the right stage observe EOF
    /// once the writer side is done.
    fn run_pipeline(
        &mut self,
        left: &[String],
        right: &[String],
        stdout: Option<Box<dyn Stdout>>,
    ) -> Result<ExitCode> {
        let (reader, writer) = io::pipe().context("failed to create pipe")?;
        match self.options.pipeline {
            PipelineMode::Sequential => {
                self.run(left, None, Some(Box::new(writer)))?;
                self.run(right, Some(Box::new(reader)), stdout)
            }
            PipelineMode::Concurrent => {
                let left_cmd = self.launch(left, None, Some(Box::new(writer)))?;
                let right_cmd = self.launch(right, Some(Box::new(reader)), stdout)?;
                left_cmd.wait()?;
                right_cmd.wait()
            }
        }
    }

    /// Interactive front end: prompt, read, interpret, repeat.
    ///
    /// Ends on EOF, or on interrupt unless the interpreter was set up with
    /// [`Options::ignore_interrupts`]. Per-line failures are reported and
    /// do not end the session.
    pub fn repl(&mut self) -> Result<()> {
        let mut rl = DefaultEditor::new()?;

        loop {
            match rl.readline("$ ") {
                Ok(line) => {
                    rl.add_history_entry(line.as_str())?;
                    if let Err(e) = self.interpret_line(&line) {
                        eprintln!("{e:#}");
                    }
                }
                Err(ReadlineError::Interrupted) if self.options.ignore_interrupts => continue,
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => return Err(e.into()),
            }
        }

        Ok(())
    }

    /// Script front end: interpret the file's lines sequentially, with no
    /// prompt. Per-line failures are reported and the next line still runs.
    pub fn run_script(&mut self, path: &Path) -> Result<()> {
        let file =
            File::open(path).with_context(|| format!("cannot open script {}", path.display()))?;
        for line in BufReader::new(file).lines() {
            let line = line?;
            if let Err(e) = self.interpret_line(&line) {
                eprintln!("{e:#}");
            }
        }
        Ok(())
    }
}

impl Default for Interpreter {
    /// Create an interpreter with the default set of commands:
    /// - built-ins: `echo`, `exit`, `clear`
    /// - external command launcher
    ///
    /// Builtin factories come first so builtins shadow same-named executables.
    fn default() -> Self {
        use crate::builtin::*;
        use crate::external::ExternalCommand;
        Self::new(vec![
            Box::new(Factory::<Echo>::default()),
            Box::new(Factory::<Exit>::default()),
            Box::new(Factory::<Clear>::default()),
            Box::new(Factory::<ExternalCommand>::default()),
        ])
    }
}

struct InheritedStdin(std::io::StdinLock<'static>);

impl Read for InheritedStdin {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl Stdin for InheritedStdin {
    fn stdio(self: Box<Self>) -> Stdio {
        Stdio::inherit()
    }
}

struct InheritedStdout(std::io::Stdout);

impl Write for InheritedStdout {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl Stdout for InheritedStdout {
    fn stdio(self: Box<Self>) -> Stdio {
        Stdio::inherit()
    }
}
