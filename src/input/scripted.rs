use std::collections::VecDeque;

use super::{Input, LineInput};
use crate::error::ShellError;

/// Feeds a fixed list of lines, then end of input. Used for `--execute`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    lines: VecDeque<Input>,
    tables: Vec<String>,
    history: Vec<String>,
}

impl ScriptedInput {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(|l| Input::Line(l.into())).collect(),
            ..Self::default()
        }
    }

    pub fn line(mut self, line: impl Into<String>) -> Self {
        self.lines.push_back(Input::Line(line.into()));
        self
    }

    /// Queues a Ctrl-C at the current end of the script.
    pub fn interrupt(mut self) -> Self {
        self.lines.push_back(Input::Interrupted);
        self
    }

    /// The latest table names handed over for completion.
    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }
}

impl LineInput for ScriptedInput {
    fn read_line(&mut self, _prompt: &str) -> Result<Input, ShellError> {
        Ok(self.lines.pop_front().unwrap_or(Input::Eof))
    }

    fn set_tables(&mut self, tables: &[String]) {
        self.tables = tables.to_vec();
    }

    fn add_history(&mut self, line: &str) {
        self.history.push(line.to_string());
    }

    fn save_history(&mut self) -> Result<(), ShellError> {
        Ok(())
    }
}
