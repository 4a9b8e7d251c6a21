use std::path::PathBuf;

use rustyline::{config::Configurer, error::ReadlineError, history::FileHistory, Editor};
use tracing::{debug, warn};

use super::{Input, LineInput, ShellCompleter};
use crate::error::ShellError;

const MAX_HISTORY: usize = 1000;

/// Interactive input through rustyline, with file-backed history.
pub struct RustylineInput {
    editor: Editor<ShellCompleter, FileHistory>,
    history_path: PathBuf,
}

impl RustylineInput {
    pub fn new(completer: ShellCompleter, history_path: PathBuf) -> Result<Self, ShellError> {
        let mut editor = Editor::<ShellCompleter, FileHistory>::new()?;
        editor.set_helper(Some(completer));
        editor.set_max_history_size(MAX_HISTORY)?;
        editor.set_history_ignore_dups(true)?;

        match editor.load_history(&history_path) {
            Ok(()) => debug!(path = %history_path.display(), "loaded history"),
            Err(ReadlineError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %history_path.display(), error = %e, "cannot load history"),
        }

        Ok(Self {
            editor,
            history_path,
        })
    }
}

impl LineInput for RustylineInput {
    fn read_line(&mut self, prompt: &str) -> Result<Input, ShellError> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(Input::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(Input::Interrupted),
            Err(ReadlineError::Eof) => Ok(Input::Eof),
            Err(e) => Err(e.into()),
        }
    }

    fn set_tables(&mut self, tables: &[String]) {
        if let Some(helper) = self.editor.helper_mut() {
            helper.update_tables(tables);
        }
    }

    fn add_history(&mut self, line: &str) {
        if let Err(e) = self.editor.add_history_entry(line) {
            warn!(error = %e, "couldn't add to history");
        }
    }

    fn save_history(&mut self) -> Result<(), ShellError> {
        self.editor.save_history(&self.history_path)?;
        Ok(())
    }
}
