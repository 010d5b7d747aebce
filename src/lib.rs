//! A tiny interactive command interpreter with buffer-based pipelines.
//!
//! A line such as `pwd | cd` is split on `|` into stages. Each stage names one of a
//! fixed set of builtins (`cd`, `pwd`, `echo`, `kill`, `ps`, `exec`, `\quit`); the
//! stages run one after another and hand a single in-memory [`Buffer`] along. External
//! programs are started with `exec`, which captures their standard output into the
//! buffer.
//!
//! The main entry point is [`Interpreter`]. The working directory lives in an explicit
//! [`Environment`] owned by the interpreter, and the OS process table is reached
//! through the [`ProcessControl`] trait.

mod buffer;
mod builtin;
pub mod command;
pub mod env;
pub mod error;
mod external;
mod interpreter;
pub mod parser;
pub mod process;
pub mod reader;

pub use buffer::Buffer;
pub use builtin::PS_HEADER;
pub use env::Environment;
pub use error::ShellError;
pub use external::{ExternalCommand, find_command_path};
pub use interpreter::{Interpreter, Outcome, SessionEnd};
pub use process::{ProcessControl, SystemProcesses};
