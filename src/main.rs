use anyhow::Result;
use argh::FromArgs;
use minish::{Interpreter, Options, PipelineMode};
use std::path::PathBuf;

#[derive(FromArgs)]
/// A minimal line-oriented command interpreter.
struct Cli {
    #[argh(positional)]
    /// script file to interpret line by line; interactive when omitted.
    script: Option<PathBuf>,

    #[argh(switch)]
    /// start both pipeline stages before waiting on either, instead of
    /// running the left stage to completion first.
    concurrent_pipes: bool,
}

fn main() -> Result<()> {
    let cli: Cli = argh::from_env();

    let pipeline = if cli.concurrent_pipes {
        PipelineMode::Concurrent
    } else {
        PipelineMode::Sequential
    };
    let options = Options {
        pipeline,
        // Ctrl-C at the prompt should not kill the interpreter itself.
        ignore_interrupts: cli.script.is_none(),
    };

    let mut sh = Interpreter::default().with_options(options);
    match cli.script {
        Some(path) => sh.run_script(&path),
        None => sh.repl(),
    }
}
