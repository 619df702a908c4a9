use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Settings remembered between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppState {
    /// Option string of the last session.
    pub options: Option<String>,
}

impl AppState {
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read state file at {}", path.display()))?;
            let state: Self = toml::from_str(&contents)
                .with_context(|| format!("failed to parse state file at {}", path.display()))?;
            Ok(state)
        } else {
            Ok(Self::default())
        }
    }

    pub fn persist(&self, path: &Path) -> Result<()> {
        let dir = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("state path has no parent: {}", path.display()))?;
        fs::create_dir_all(dir).with_context(|| {
            format!(
                "failed to prepare directory for state file at {}",
                dir.display()
            )
        })?;
        let serialized = toml::to_string_pretty(self)
            .with_context(|| "failed to serialize state file to TOML".to_string())?;
        fs::write(path, serialized)
            .with_context(|| format!("failed to write state file to {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_default() {
        let root = TempDir::new().unwrap();
        let state = AppState::load_or_default(&root.path().join("state.toml")).unwrap();
        assert_eq!(state, AppState::default());
    }

    #[test]
    fn persist_then_load() {
        let root = TempDir::new().unwrap();
        let path = root.path().join("nested/state.toml");
        let state = AppState {
            options: Some("shader:night/hd".to_string()),
        };
        state.persist(&path).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("options = \"shader:night/hd\""));
        assert_eq!(AppState::load_or_default(&path).unwrap(), state);
    }

    #[test]
    fn unknown_keys_are_tolerated() {
        let root = TempDir::new().unwrap();
        let path = root.path().join("state.toml");
        fs::write(&path, "options = \"start\"\nlegacy = 3\n").unwrap();
        let state = AppState::load_or_default(&path).unwrap();
        assert_eq!(state.options.as_deref(), Some("start"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let root = TempDir::new().unwrap();
        let path = root.path().join("state.toml");
        fs::write(&path, "options = [").unwrap();
        let err = AppState::load_or_default(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse state file"));
    }
}
