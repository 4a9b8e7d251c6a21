use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::debug;

use super::{ConfigError, ConfigPaths};

pub struct ConfigLoader<'a> {
    paths: &'a ConfigPaths,
}

impl<'a> ConfigLoader<'a> {
    pub fn new(paths: &'a ConfigPaths) -> Self {
        Self { paths }
    }

    /// Commands from the rc file, in file order. A missing file is only an
    /// error when `required` is set.
    pub fn load_commands(&self, required: bool) -> Result<Vec<String>, ConfigError> {
        let path = &self.paths.rc_path;
        match fs::read_to_string(path) {
            Ok(content) => {
                let commands = parse_commands(&content);
                debug!(path = %path.display(), count = commands.len(), "loaded rc file");
                Ok(commands)
            }
            Err(e) if e.kind() == ErrorKind::NotFound && !required => Ok(Vec::new()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(not_found(path)),
            Err(source) => Err(ConfigError::Io {
                path: path.clone(),
                source,
            }),
        }
    }
}

fn not_found(path: &Path) -> ConfigError {
    ConfigError::ConfigFileNotFound(path.to_path_buf())
}

fn parse_commands(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn paths_with_rc(content: Option<&str>) -> (tempfile::TempDir, ConfigPaths) {
        let dir = tempfile::tempdir().expect("temp dir");
        let paths = ConfigPaths::in_dir(dir.path());
        if let Some(content) = content {
            fs::write(&paths.rc_path, content).expect("write rc");
        }
        (dir, paths)
    }

    #[test]
    fn test_skips_blank_and_comment_lines() {
        let (_dir, paths) = paths_with_rc(Some(
            "# start somewhere useful\n\n  use users  \nconsistent on\n   # indented comment\nelapsed\n",
        ));

        let commands = ConfigLoader::new(&paths)
            .load_commands(false)
            .expect("load");
        assert_eq!(commands, vec!["use users", "consistent on", "elapsed"]);
    }

    #[test]
    fn test_missing_default_file_is_empty() {
        let (_dir, paths) = paths_with_rc(None);

        let commands = ConfigLoader::new(&paths)
            .load_commands(false)
            .expect("load");
        assert!(commands.is_empty());
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let (_dir, paths) = paths_with_rc(None);

        assert!(matches!(
            ConfigLoader::new(&paths).load_commands(true),
            Err(ConfigError::ConfigFileNotFound(_))
        ));
    }
}
