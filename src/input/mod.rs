//! Where command lines come from: an interactive editor or a fixed script.

mod completer;
mod editor;
mod scripted;

pub use completer::ShellCompleter;
pub use editor::RustylineInput;
pub use scripted::ScriptedInput;

use crate::error::ShellError;

/// One read from a [`LineInput`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Line(String),
    /// Ctrl-C at the prompt; the line is dropped.
    Interrupted,
    Eof,
}

pub trait LineInput {
    fn read_line(&mut self, prompt: &str) -> Result<Input, ShellError>;

    /// Replaces the table names offered for completion.
    fn set_tables(&mut self, tables: &[String]);

    fn add_history(&mut self, line: &str);

    fn save_history(&mut self) -> Result<(), ShellError>;
}
