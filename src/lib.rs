//! A tiny line-oriented command interpreter.
//!
//! This crate reads one line at a time, classifies it, and either runs an
//! in-process builtin or spawns an external program, with support for a
//! single output redirection (`cmd args > file`) or a single pipe between
//! two commands (`left | right`). It is intentionally small: no quoting, no
//! variable expansion, no chained pipelines.
//!
//! The main entry point is [`Interpreter`], which interprets lines coming
//! from an interactive prompt or a script file. The public modules
//! [`command`] and [`env`] expose the traits and types for implementing
//! commands and for interacting with the process environment.

mod builtin;
mod classifier;
pub mod command;
pub mod env;
mod external;
mod interpreter;
mod resolver;

pub use interpreter::{Interpreter, Options, PipelineMode};
