use std::collections::BTreeMap;
use std::io::Write;

mod builtin;
mod items;
mod scan;
mod tables;

use thiserror::Error;

use super::parse::{self, ParseError};
use super::session::Session;
use crate::process::{ProcessError, ProcessExecutor};
use crate::store::{Store, StoreError, Table};
use crate::value::ValueError;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("unknown command: {0}")]
    NotFound(String),
    #[error("invalid arguments")]
    InvalidArguments,
    #[error("invalid key type `{0}`: use S, N or B")]
    InvalidKeyType(String),
    #[error("invalid return values `{0}`: use NONE, ALL_OLD, ALL_NEW, UPDATED_OLD or UPDATED_NEW")]
    InvalidReturnValues(String),
    #[error("no table selected: `use` a table or prefix the arguments with :tablename")]
    NoTable,
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Value(#[from] ValueError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Process(#[from] ProcessError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CommandError {
    /// Extra diagnostic text worth showing in debug mode.
    pub fn detail(&self) -> Option<&str> {
        match self {
            CommandError::Store(e) => e.detail(),
            _ => None,
        }
    }
}

/// What the loop should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Everything a handler may touch while it runs.
pub struct Context<'a> {
    pub store: &'a dyn Store,
    pub session: &'a mut Session,
    pub out: &'a mut dyn Write,
    pub process: &'a ProcessExecutor,
}

impl Context<'_> {
    /// The table a command targets: the `:name` override if one was given,
    /// otherwise the current table.
    pub fn resolve(&self, name: Option<&str>) -> Result<Table, CommandError> {
        match name {
            Some("") => Err(CommandError::InvalidArguments),
            Some(name) => Ok(self.store.get_table(name)?),
            None => self
                .session
                .current_table
                .clone()
                .ok_or(CommandError::NoTable),
        }
    }
}

pub type Handler = fn(&mut Context<'_>, &str) -> Result<Flow, CommandError>;

pub struct CommandSpec {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub usage: &'static str,
    pub summary: &'static str,
    pub handler: Handler,
}

pub static COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "tables",
        aliases: &["ls"],
        usage: "tables",
        summary: "list tables",
        handler: tables::list,
    },
    CommandSpec {
        name: "describe",
        aliases: &[],
        usage: "describe [tablename]",
        summary: "show a table's schema and status",
        handler: tables::describe,
    },
    CommandSpec {
        name: "use",
        aliases: &["cd"],
        usage: "use tablename",
        summary: "make a table the current table",
        handler: tables::use_table,
    },
    CommandSpec {
        name: "create",
        aliases: &["mkdir"],
        usage: "create tablename hkey[:type] [rkey[:type]]",
        summary: "create a table (types: S, N, B; default S)",
        handler: tables::create,
    },
    CommandSpec {
        name: "delete",
        aliases: &["rmdir"],
        usage: "delete tablename",
        summary: "delete a table",
        handler: tables::delete,
    },
    CommandSpec {
        name: "refresh",
        aliases: &[],
        usage: "refresh [:tablename | tablename]",
        summary: "re-read and show table metadata",
        handler: tables::refresh,
    },
    CommandSpec {
        name: "put",
        aliases: &[],
        usage: "put [:tablename] {json-body}",
        summary: "write an item",
        handler: items::put,
    },
    CommandSpec {
        name: "update",
        aliases: &[],
        usage: "update [:tablename] hashkey [rangekey] {attributes} [ALL_OLD|ALL_NEW|UPDATED_OLD|UPDATED_NEW|NONE]",
        summary: "set attributes on an existing item",
        handler: items::update,
    },
    CommandSpec {
        name: "get",
        aliases: &[],
        usage: "get [:tablename] hashkey [rangekey]",
        summary: "read one item",
        handler: items::get,
    },
    CommandSpec {
        name: "rm",
        aliases: &[],
        usage: "rm [:tablename] hashkey [rangekey]",
        summary: "delete one item if it exists",
        handler: items::remove,
    },
    CommandSpec {
        name: "scan",
        aliases: &["l"],
        usage: "scan [:tablename] [attr,attr,...]",
        summary: "print every item",
        handler: scan::scan,
    },
    CommandSpec {
        name: "query",
        aliases: &["q"],
        usage: "query [:tablename] hashkey [attr,attr,...] [-r]",
        summary: "print items under one hash key (-r: descending)",
        handler: scan::query,
    },
    CommandSpec {
        name: "rmall",
        aliases: &[],
        usage: "rmall [tablename...] yes",
        summary: "delete every item of the named tables",
        handler: scan::remove_all,
    },
    CommandSpec {
        name: "elapsed",
        aliases: &[],
        usage: "elapsed [on|off]",
        summary: "toggle printing of elapsed time",
        handler: builtin::elapsed,
    },
    CommandSpec {
        name: "consistent",
        aliases: &[],
        usage: "consistent [on|off]",
        summary: "toggle consistent reads for get and rm",
        handler: builtin::consistent,
    },
    CommandSpec {
        name: "shell",
        aliases: &[],
        usage: "shell command... | !command...",
        summary: "run an operating-system command",
        handler: builtin::shell,
    },
    CommandSpec {
        name: "help",
        aliases: &["?"],
        usage: "help [command]",
        summary: "list commands or show one command's usage",
        handler: builtin::help,
    },
    CommandSpec {
        name: "exit",
        aliases: &["quit"],
        usage: "exit",
        summary: "leave the shell",
        handler: builtin::exit,
    },
];

/// Maps command names and aliases to their handlers.
#[derive(Clone)]
pub struct CommandExecutor {
    commands: BTreeMap<&'static str, &'static CommandSpec>,
}

impl Default for CommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandExecutor {
    pub fn new() -> Self {
        let mut commands = BTreeMap::new();
        for spec in COMMANDS {
            commands.insert(spec.name, spec);
            for alias in spec.aliases {
                commands.insert(*alias, spec);
            }
        }
        Self { commands }
    }

    pub fn lookup(&self, name: &str) -> Option<&'static CommandSpec> {
        self.commands.get(name).copied()
    }

    /// Every name the executor answers to, aliases included.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.commands.keys().copied()
    }

    pub fn execute(&self, line: &str, ctx: &mut Context<'_>) -> Result<Flow, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Flow::Continue);
        }
        if let Some(raw) = line.strip_prefix('!') {
            return builtin::shell(ctx, raw.trim());
        }

        let (name, args) = parse::split_command(line);
        let spec = self
            .lookup(name)
            .ok_or_else(|| CommandError::NotFound(name.to_string()))?;
        (spec.handler)(ctx, args)
    }
}
