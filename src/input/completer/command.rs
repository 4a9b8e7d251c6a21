use std::collections::BTreeMap;

use rustyline::completion::Pair;

use crate::core::commands::CommandExecutor;

/// Command names and aliases, with the argument part of each usage line.
#[derive(Debug, Clone, Default)]
pub struct CommandCompleter {
    commands: BTreeMap<&'static str, &'static str>,
}

impl CommandCompleter {
    pub fn new(executor: &CommandExecutor) -> Self {
        let commands = executor
            .names()
            .filter_map(|name| {
                let spec = executor.lookup(name)?;
                let args = spec
                    .usage
                    .strip_prefix(spec.name)
                    .unwrap_or("")
                    .trim_start();
                Some((name, args))
            })
            .collect();
        Self { commands }
    }

    pub fn complete_command(&self, word: &str) -> Vec<Pair> {
        self.commands
            .keys()
            .filter(|name| name.starts_with(word))
            .map(|name| Pair {
                display: name.to_string(),
                replacement: name.to_string(),
            })
            .collect()
    }

    /// The usage arguments for `name`, if it takes any.
    pub fn arguments(&self, name: &str) -> Option<&'static str> {
        self.commands
            .get(name)
            .copied()
            .filter(|args| !args.is_empty())
    }
}
