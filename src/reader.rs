//! Where input lines come from.

use crate::error::{Result, ShellError};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::BufRead;
use std::path::PathBuf;
use tracing::warn;

/// Supplies one line of input per call.
pub trait LineSource {
    /// Read the next line, without its line terminator.
    ///
    /// `Ok(None)` means the input is over and the session should end normally.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// Interactive terminal input backed by `rustyline`, with history.
pub struct Editor {
    editor: DefaultEditor,
    history: Option<PathBuf>,
}

impl Editor {
    /// Create an editor, loading previous history from `history` when it exists.
    pub fn new(history: Option<PathBuf>) -> rustyline::Result<Self> {
        let mut editor = DefaultEditor::new()?;
        if let Some(path) = history.as_deref().filter(|path| path.exists()) {
            if let Err(err) = editor.load_history(path) {
                warn!(path = %path.display(), %err, "could not load history");
            }
        }
        Ok(Self { editor, history })
    }

    fn remember(&mut self, line: &str) {
        if let Err(err) = self.editor.add_history_entry(line) {
            warn!(%err, "could not record history entry");
        }
        if let Some(path) = &self.history {
            if let Err(err) = self.editor.save_history(path) {
                warn!(path = %path.display(), %err, "could not save history");
            }
        }
    }
}

impl LineSource for Editor {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                self.remember(&line);
                Ok(Some(line))
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(ShellError::InputRead(err.to_string())),
        }
    }
}

/// Non-interactive input: plain lines from any reader, prompts are not shown.
pub struct PlainLines<R> {
    reader: R,
}

impl<R: BufRead> PlainLines<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineSource for PlainLines<R> {
    fn read_line(&mut self, _prompt: &str) -> Result<Option<String>> {
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => Ok(None),
            Ok(_) => {
                if line.ends_with('\n') {
                    line.pop();
                }
                Ok(Some(line))
            }
            Err(err) => Err(ShellError::InputRead(err.to_string())),
        }
    }
}
