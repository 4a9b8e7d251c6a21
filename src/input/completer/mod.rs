mod command;
mod shell;
mod table;

pub use shell::ShellCompleter;
