//! Path resolution for the roadwatch data directory

use std::path::PathBuf;

/// Environment variable that overrides the data directory
pub const HOME_ENV: &str = "ROADWATCH_HOME";

/// Resolves standard paths for roadwatch state files
#[derive(Debug, Clone)]
pub struct Paths {
    pub data_dir: PathBuf,
}

impl Paths {
    /// Resolve the data directory from `$ROADWATCH_HOME`, falling back to `~/.roadwatch`
    pub fn new() -> std::io::Result<Self> {
        if let Some(dir) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::at(PathBuf::from(dir)));
        }

        let home = dirs::home_dir().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "home directory not found")
        })?;

        Ok(Self::at(home.join(".roadwatch")))
    }

    /// Use an explicit data directory
    pub fn at(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Get config.json path
    pub fn config_file(&self) -> PathBuf {
        self.data_dir.join("config.json")
    }

    /// Get the SQLite memory database path
    pub fn memory_db(&self) -> PathBuf {
        self.data_dir.join("memory.db")
    }

    /// Get runs.jsonl path
    pub fn runs_file(&self) -> PathBuf {
        self.data_dir.join("runs.jsonl")
    }

    /// Directory for saved authority reports
    pub fn outbox_dir(&self) -> PathBuf {
        self.data_dir.join("outbox")
    }

    /// Create the data directory if missing
    pub fn ensure_data_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_paths_from_env_override() {
        let temp = tempfile::TempDir::new().unwrap();
        let original = std::env::var_os(HOME_ENV);
        unsafe { std::env::set_var(HOME_ENV, temp.path()) };

        let paths = Paths::new().unwrap();
        assert_eq!(paths.data_dir, temp.path());

        match original {
            Some(v) => unsafe { std::env::set_var(HOME_ENV, v) },
            None => unsafe { std::env::remove_var(HOME_ENV) },
        }
    }

    #[test]
    #[serial]
    fn test_paths_default_under_home() {
        let original = std::env::var_os(HOME_ENV);
        unsafe { std::env::remove_var(HOME_ENV) };

        let paths = Paths::new().unwrap();
        assert!(paths.data_dir.ends_with(".roadwatch"));

        if let Some(v) = original {
            unsafe { std::env::set_var(HOME_ENV, v) };
        }
    }

    #[test]
    fn test_file_names() {
        let paths = Paths::at("/tmp/rw");
        assert!(paths.config_file().ends_with("config.json"));
        assert!(paths.memory_db().ends_with("memory.db"));
        assert!(paths.runs_file().ends_with("runs.jsonl"));
        assert!(paths.outbox_dir().ends_with("outbox"));
    }
}
