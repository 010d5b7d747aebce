use crate::buffer::Buffer;
use crate::command::{Builtin, Flow, Invocation};
use crate::env::Environment;
use crate::error::{Result, ShellError};
use crate::parser::Pipeline;
use crate::process::{ProcessControl, SystemProcesses};
use crate::reader::LineSource;
use std::io::Write;
use tracing::debug;

/// How a pipeline ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Every stage ran (or an unknown command stopped the pipeline early). Holds the
    /// final buffer.
    Finished(Buffer),
    /// A stage asked to quit; later stages were not run.
    Exited,
}

/// How an interactive session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The input ran out.
    EndOfInput,
    /// `\quit` was entered.
    Quit,
}

/// A minimal shell-like interpreter that runs `|`-separated pipelines of builtins.
///
/// The interpreter owns the session [`Environment`]; each input line gets a fresh
/// [`Pipeline`] and a fresh [`Buffer`]. Stages run strictly one after another and the
/// buffer left by one stage is the only thing the next stage sees.
///
/// Example
/// ```
/// use pipeshell::{Interpreter, Outcome};
/// let mut sh = Interpreter::default();
/// let mut out = Vec::new();
/// let outcome = sh.execute_line("echo hello world", &mut out).unwrap();
/// assert!(matches!(outcome, Outcome::Finished(_)));
/// assert_eq!(out, b"hello world\n");
/// ```
pub struct Interpreter<P = SystemProcesses> {
    env: Environment,
    processes: P,
    prompt: Option<String>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(Environment::new(), SystemProcesses)
    }
}

impl<P: ProcessControl> Interpreter<P> {
    /// Create an interpreter over an explicit context and process adapter.
    pub fn new(env: Environment, processes: P) -> Self {
        Self {
            env,
            processes,
            prompt: None,
        }
    }

    /// Use a fixed prompt instead of `<working directory>$ `.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn prompt(&self) -> String {
        match &self.prompt {
            Some(prompt) => prompt.clone(),
            None => format!("{}$ ", self.env.current_dir.display()),
        }
    }

    /// Route one stage to its builtin.
    pub fn dispatch(&mut self, invocation: &Invocation<'_>, buffer: &mut Buffer) -> Result<Flow> {
        let stage = invocation.stage;
        let builtin = Builtin::lookup(&stage.name)
            .ok_or_else(|| ShellError::UnknownCommand(stage.name.clone()))?;
        debug!(position = stage.position, command = %builtin, args = ?stage.args, "dispatching stage");
        builtin.execute(invocation, buffer, &mut self.env, &self.processes)
    }

    /// Run every stage of `pipeline` in order.
    ///
    /// An unknown command prints `Unknown command` to `out` and leaves the pipeline with an
    /// empty buffer; of the stages after it only `\quit` still takes effect. Any other
    /// failure aborts the remaining stages and is returned.
    pub fn run_pipeline(&mut self, pipeline: &Pipeline, out: &mut dyn Write) -> Result<Outcome> {
        let multi_stage = pipeline.is_multi_stage();
        let mut buffer = Buffer::new();

        for stage in pipeline.stages() {
            let invocation = Invocation::new(stage, multi_stage);
            match self.dispatch(&invocation, &mut buffer) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => {
                    debug!(position = stage.position, "quit requested");
                    return Ok(Outcome::Exited);
                }
                Err(err @ ShellError::UnknownCommand(_)) => {
                    debug!(position = stage.position, name = %stage.name, "unknown command");
                    writeln!(out, "{err}")?;
                    let rest = &pipeline.stages()[stage.position + 1..];
                    if rest.iter().any(|s| Builtin::lookup(&s.name) == Some(Builtin::Quit)) {
                        return Ok(Outcome::Exited);
                    }
                    return Ok(Outcome::Finished(Buffer::new()));
                }
                Err(err) => {
                    debug!(position = stage.position, %err, "stage failed");
                    return Err(err);
                }
            }
        }

        Ok(Outcome::Finished(buffer))
    }

    /// Parse and run one input line, writing the final buffer to `out`.
    ///
    /// A non-empty result is written once, terminated by a newline if it lacks one; an
    /// empty result writes nothing.
    pub fn execute_line(&mut self, line: &str, out: &mut dyn Write) -> Result<Outcome> {
        let pipeline = Pipeline::parse(line);
        let outcome = self.run_pipeline(&pipeline, out)?;

        if let Outcome::Finished(buffer) = &outcome {
            if !buffer.is_empty() {
                out.write_all(buffer.as_bytes())?;
                if !buffer.as_bytes().ends_with(b"\n") {
                    out.write_all(b"\n")?;
                }
            }
            out.flush()?;
        }
        Ok(outcome)
    }

    /// Read-Eval-Print Loop.
    ///
    /// Pipeline failures are reported on `errors` and the loop carries on. Only a failure
    /// to read input is returned as an error.
    pub fn repl(
        &mut self,
        input: &mut dyn LineSource,
        out: &mut dyn Write,
        errors: &mut dyn Write,
    ) -> Result<SessionEnd> {
        loop {
            let Some(line) = input.read_line(&self.prompt())? else {
                return Ok(SessionEnd::EndOfInput);
            };

            match self.execute_line(&line, out) {
                Ok(Outcome::Finished(_)) => {}
                Ok(Outcome::Exited) => return Ok(SessionEnd::Quit),
                Err(err) => writeln!(errors, "{err}")?,
            }
        }
    }
}
