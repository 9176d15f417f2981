use std::path::{Path, PathBuf};

use directories::ProjectDirs;

/// Platform config and data locations for one application name
///
/// Follows the XDG layout on Linux, `~/Library/Application Support` on macOS
/// and `%APPDATA%` on Windows.
#[derive(Debug, Clone)]
pub struct ProjectPaths {
    dirs: ProjectDirs,
}

impl ProjectPaths {
    /// `None` when no home directory can be determined
    pub fn new(name: &str) -> Option<Self> {
        ProjectDirs::from("", "", name).map(|dirs| Self { dirs })
    }

    pub fn config_dir(&self) -> &Path {
        self.dirs.config_dir()
    }

    pub fn data_dir(&self) -> &Path {
        self.dirs.data_dir()
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir().join("logs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirs_contain_name() {
        if let Some(paths) = ProjectPaths::new("hudkit") {
            assert!(paths.config_dir().to_string_lossy().contains("hudkit"));
            assert!(paths.log_dir().ends_with("logs"));
        }
    }
}
