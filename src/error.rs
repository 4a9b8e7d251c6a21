use thiserror::Error;

use crate::core::config::ConfigError;
use crate::store::StoreError;

/// Failures that end the shell rather than a single command.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("Readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Ctrl-C error: {0}")]
    CtrlC(String),
}

impl From<ctrlc::Error> for ShellError {
    fn from(err: ctrlc::Error) -> Self {
        ShellError::CtrlC(err.to_string())
    }
}
