use crate::buffer::Buffer;
use crate::command::{Builtin, Flow, Invocation};
use crate::env::Environment;
use crate::error::{Result, ShellError};
use crate::external::ExternalCommand;
use crate::process::ProcessControl;
use std::path::PathBuf;

/// Header line of the `ps` table.
pub const PS_HEADER: &str = "   PID\t| Executable";

impl Builtin {
    /// Executes the builtin against the pipeline buffer and the session context.
    pub fn execute(
        self,
        invocation: &Invocation<'_>,
        buffer: &mut Buffer,
        env: &mut Environment,
        processes: &dyn ProcessControl,
    ) -> Result<Flow> {
        let stage = invocation.stage;
        match self {
            Builtin::Cd => {
                let target = if invocation.reads_buffer() {
                    PathBuf::from(buffer.to_string_lossy().into_owned())
                } else {
                    cd_target(stage.args.first().map(String::as_str), env)?
                };
                env.change_dir(&target)?;
            }
            Builtin::Pwd => pwd(buffer, env),
            Builtin::Echo => echo(&stage.args, invocation.reads_buffer(), buffer),
            Builtin::Kill => kill(stage.args.first().map(String::as_str), processes)?,
            Builtin::Ps => ps(buffer, processes)?,
            Builtin::Exec => {
                let output = ExternalCommand::from_command_line(&stage.joined_args()).run(env)?;
                buffer.replace(output);
            }
            Builtin::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }
}

/// Directory `cd` switches to when given `arg`: the argument itself, or `$HOME`
/// when it is absent or empty.
fn cd_target(arg: Option<&str>, env: &Environment) -> Result<PathBuf> {
    match arg {
        Some(t) if !t.is_empty() => Ok(PathBuf::from(t)),
        _ => env
            .get_var("HOME")
            .map(PathBuf::from)
            .ok_or(ShellError::NoHomeDirectory),
    }
}

/// Replace the buffer with the absolute working directory.
fn pwd(buffer: &mut Buffer, env: &Environment) {
    buffer.replace(env.current_dir.to_string_lossy().into_owned());
}

/// The first stage replaces the buffer; later stages append to what is already there.
fn echo(args: &[String], append: bool, buffer: &mut Buffer) {
    let line = format!("{}\n", args.join(" "));
    if append {
        buffer.append(line.as_bytes());
    } else {
        buffer.replace(line);
    }
}

fn parse_pid(arg: Option<&str>) -> Result<i32> {
    let arg = arg.unwrap_or_default();
    match arg.parse::<i32>() {
        Ok(pid) if pid > 0 => Ok(pid),
        _ => Err(ShellError::InvalidPid(arg.to_string())),
    }
}

fn kill(arg: Option<&str>, processes: &dyn ProcessControl) -> Result<()> {
    let pid = parse_pid(arg)?;
    processes.kill(pid)
}

fn ps(buffer: &mut Buffer, processes: &dyn ProcessControl) -> Result<()> {
    let entries = processes.list()?;
    let mut table = format!("{PS_HEADER}\n");
    for entry in entries {
        table.push_str(&format!("{}\t| {}\n", entry.pid, entry.name));
    }
    buffer.replace(table);
    Ok(())
}
