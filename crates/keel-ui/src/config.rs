use crate::access::AuthLevel;
use crate::error::{PanelError, PanelResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for the admin panel.
///
/// Every field has a default, so a partial file on disk only overrides what
/// it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Prefix of every command the panel emits and accepts
    pub namespace: String,
    /// Heading drawn in the top-left corner
    pub title: String,
    /// Chat command a host maps to opening the panel
    pub open_command: String,
    /// Lowest privilege level allowed to open the panel
    pub minimum_auth_level: AuthLevel,
    /// Paging and layout tunables
    pub layout: LayoutConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub rows_per_page: usize,
    pub dropdown_rows_per_page: usize,
    pub range_cuts: usize,
    pub tabs_per_strip: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            rows_per_page: 19,
            dropdown_rows_per_page: 10,
            range_cuts: 50,
            tabs_per_strip: 8,
        }
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            namespace: "keel".to_string(),
            title: "Admin Settings".to_string(),
            open_command: "cadmin".to_string(),
            minimum_auth_level: AuthLevel::Owner,
            layout: LayoutConfig::default(),
        }
    }
}

impl PanelConfig {
    /// Loads the config from the default location, writing defaults if absent.
    pub fn load() -> PanelResult<Self> {
        Self::load_or_default(&Self::config_path()?)
    }

    /// Loads the config from `path`, writing defaults there if it is absent.
    pub fn load_or_default(path: &Path) -> PanelResult<Self> {
        if path.exists() {
            let contents =
                fs::read_to_string(path).map_err(|e| PanelError::io("read config", path, e))?;

            toml::from_str(&contents).map_err(|source| PanelError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })
        } else {
            let config = Self::default();
            config.save_to(path)?;
            tracing::info!(path = %path.display(), "wrote default panel config");
            Ok(config)
        }
    }

    pub fn save(&self) -> PanelResult<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> PanelResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| PanelError::io("create config directory", parent, e))?;
        }

        let contents = toml::to_string_pretty(self)?;

        fs::write(path, contents).map_err(|e| PanelError::io("write config", path, e))?;

        Ok(())
    }

    pub fn config_path() -> PanelResult<PathBuf> {
        let config_dir = dirs::config_dir().ok_or(PanelError::NoConfigDir)?;

        Ok(config_dir.join("keel").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = PanelConfig::default();
        assert_eq!(config.namespace, "keel");
        assert_eq!(config.title, "Admin Settings");
        assert_eq!(config.open_command, "cadmin");
        assert_eq!(config.minimum_auth_level, AuthLevel::Owner);
        assert_eq!(config.layout.rows_per_page, 19);
        assert_eq!(config.layout.dropdown_rows_per_page, 10);
        assert_eq!(config.layout.range_cuts, 50);
        assert_eq!(config.layout.tabs_per_strip, 8);
    }

    #[test]
    fn test_load_or_default_writes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = PanelConfig::load_or_default(&path).unwrap();
        assert_eq!(config, PanelConfig::default());
        assert!(path.exists());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = PanelConfig::default();
        config.namespace = "admin".into();
        config.minimum_auth_level = AuthLevel::Moderator;
        config.layout.rows_per_page = 12;
        config.save_to(&path).unwrap();

        let loaded = PanelConfig::load_or_default(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "title = \"Server\"\n[layout]\nrange_cuts = 20\n").unwrap();

        let config = PanelConfig::load_or_default(&path).unwrap();
        assert_eq!(config.title, "Server");
        assert_eq!(config.namespace, "keel");
        assert_eq!(config.layout.range_cuts, 20);
        assert_eq!(config.layout.rows_per_page, 19);
    }

    #[test]
    fn test_invalid_file_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "minimum_auth_level = \"emperor\"").unwrap();

        let result = PanelConfig::load_or_default(&path);
        assert!(matches!(result, Err(PanelError::ConfigParse { .. })));
    }
}
