use anyhow::{Context, Result};
use argh::FromArgs;
use pipeshell::reader::{Editor, LineSource, PlainLines};
use pipeshell::{Environment, Interpreter, SessionEnd, SystemProcesses};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(FromArgs)]
/// Interactive command interpreter. Stages separated by `|` pass their output on to the
/// next stage.
struct Args {
    #[argh(option)]
    /// file to load line history from and save it to.
    history: Option<PathBuf>,

    #[argh(switch)]
    /// read plain lines from standard input instead of the line editor.
    no_editor: bool,

    #[argh(option)]
    /// fixed prompt; defaults to the working directory followed by `$ `.
    prompt: Option<String>,

    #[argh(switch, short = 'v')]
    /// log debug information to standard error.
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<ExitCode> {
    let args: Args = argh::from_env();
    init_logging(args.verbose);

    let mut input: Box<dyn LineSource> = if args.no_editor {
        Box::new(PlainLines::new(io::stdin().lock()))
    } else {
        Box::new(Editor::new(args.history).context("failed to initialise the line editor")?)
    };

    let mut sh = Interpreter::new(Environment::new(), SystemProcesses);
    if let Some(prompt) = args.prompt {
        sh = sh.with_prompt(prompt);
    }

    match sh.repl(input.as_mut(), &mut io::stdout(), &mut io::stderr()) {
        Ok(SessionEnd::Quit) => std::process::exit(0),
        Ok(SessionEnd::EndOfInput) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            eprintln!("{err}");
            Ok(ExitCode::FAILURE)
        }
    }
}
