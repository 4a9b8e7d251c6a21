use std::borrow::Cow;

use super::{command::CommandCompleter, table::TableCompleter};
use crate::core::commands::CommandExecutor;
use crate::core::parse::split_command;
use crate::highlight::SyntaxHighlighter;

use rustyline::{
    completion::{Completer, Pair},
    highlight::{CmdKind, Highlighter},
    hint::Hinter,
    validate::Validator,
    Context, Helper,
};

#[derive(Clone)]
pub struct ShellCompleter {
    command_completer: CommandCompleter,
    table_completer: TableCompleter,
    highlighter: SyntaxHighlighter,
}

impl ShellCompleter {
    pub fn new(executor: &CommandExecutor, highlighter: SyntaxHighlighter) -> Self {
        ShellCompleter {
            command_completer: CommandCompleter::new(executor),
            table_completer: TableCompleter::new(),
            highlighter,
        }
    }

    pub fn update_tables(&mut self, tables: &[String]) {
        self.table_completer.update_tables(tables);
    }

    /// Start offset and candidates for the word under the cursor: command
    /// names for the first word, table names after it.
    pub fn candidates(&self, line: &str, pos: usize) -> (usize, Vec<Pair>) {
        let Some(line_up_to_cursor) = line.get(..pos) else {
            return (pos, Vec::new());
        };
        let start = line_up_to_cursor
            .char_indices()
            .rfind(|(_, c)| c.is_whitespace())
            .map_or(0, |(i, c)| i + c.len_utf8());
        let word = &line_up_to_cursor[start..];

        if line_up_to_cursor[..start].trim().is_empty() {
            (start, self.command_completer.complete_command(word))
        } else {
            (start, self.table_completer.complete_table(word))
        }
    }

    /// Greyed-out usage after a bare command name and a space.
    fn usage_hint(&self, line: &str, pos: usize) -> Option<String> {
        if pos < line.len() || !line.ends_with(' ') {
            return None;
        }
        let (name, args) = split_command(line);
        if !args.is_empty() {
            return None;
        }
        self.command_completer.arguments(name).map(str::to_string)
    }
}

impl Helper for ShellCompleter {}
impl Highlighter for ShellCompleter {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Cow::Owned(self.highlighter.highlight_command(line))
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        true
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(self.highlighter.highlight_hint(hint))
    }
}
impl Hinter for ShellCompleter {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        self.usage_hint(line, pos)
    }
}
impl Validator for ShellCompleter {}

impl Completer for ShellCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        Ok(self.candidates(line, pos))
    }
}
