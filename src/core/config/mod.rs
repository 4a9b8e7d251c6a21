use std::path::{Path, PathBuf};

use thiserror::Error;

mod loader;
mod paths;

pub use loader::ConfigLoader;
pub use paths::ConfigPaths;

/// Per-user configuration: file locations and the commands to run at startup.
#[derive(Debug, Clone)]
pub struct Config {
    paths: ConfigPaths,
    explicit_rc: bool,
    commands: Vec<String>,
}

impl Config {
    /// Uses `rc_path` instead of `~/.dynashrc` when given.
    pub fn new(rc_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let paths = ConfigPaths::new()?;
        Ok(Self::with_paths(paths, rc_path))
    }

    pub fn with_paths(paths: ConfigPaths, rc_path: Option<PathBuf>) -> Self {
        let explicit_rc = rc_path.is_some();
        let paths = match rc_path {
            Some(path) => paths.with_rc_path(path),
            None => paths,
        };
        Config {
            paths,
            explicit_rc,
            commands: Vec::new(),
        }
    }

    pub fn load(&mut self) -> Result<(), ConfigError> {
        let loader = ConfigLoader::new(&self.paths);
        self.commands = loader.load_commands(self.explicit_rc)?;
        Ok(())
    }

    /// Startup commands, empty until [`Config::load`] ran.
    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    pub fn history_path(&self) -> &Path {
        &self.paths.history_path
    }

    pub fn rc_path(&self) -> &Path {
        &self.paths.rc_path
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Home directory not found")]
    HomeDirNotFound,
    #[error("Config file not found: {}", .0.display())]
    ConfigFileNotFound(PathBuf),
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
