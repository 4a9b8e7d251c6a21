use std::path::{Path, PathBuf};

use super::ConfigError;

/// Where the shell keeps its per-user files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    pub rc_path: PathBuf,
    pub history_path: PathBuf,
}

impl ConfigPaths {
    pub fn new() -> Result<Self, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeDirNotFound)?;
        Ok(Self::in_dir(&home))
    }

    /// `.dynashrc` and `.dynash_history` under `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        ConfigPaths {
            rc_path: dir.join(".dynashrc"),
            history_path: dir.join(".dynash_history"),
        }
    }

    pub fn with_rc_path(mut self, rc_path: impl Into<PathBuf>) -> Self {
        self.rc_path = rc_path.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_in_dir() {
        let paths = ConfigPaths::in_dir(Path::new("/home/testuser"));

        assert_eq!(paths.rc_path, PathBuf::from("/home/testuser/.dynashrc"));
        assert_eq!(
            paths.history_path,
            PathBuf::from("/home/testuser/.dynash_history")
        );
    }

    #[test]
    fn test_rc_override_keeps_history() {
        let paths = ConfigPaths::in_dir(Path::new("/home/testuser")).with_rc_path("/tmp/rc");

        assert_eq!(paths.rc_path, PathBuf::from("/tmp/rc"));
        assert_eq!(
            paths.history_path,
            PathBuf::from("/home/testuser/.dynash_history")
        );
    }
}
