use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::error::ConfigError;

/// Structure representing the application configuration. Contains pathing and workspace metadata.
/// Configs are seralizable and deserializable to YAML using serde and serde_yaml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fixtures_path: PathBuf,
    pub universes_path: PathBuf,
    pub groups_path: Option<PathBuf>,
    pub output_path: PathBuf,
    pub id_start: u32,
    pub workspace: WorkspaceInfo,
    pub virtual_console: VirtualConsoleInfo,
}

/// Metadata written to the Workspace root and its Creator block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceInfo {
    pub author: String,
    pub current_window: String,
    pub creator_name: String,
    pub creator_version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VirtualConsoleInfo {
    pub background_color: String,
    pub width: u32,
    pub height: u32,
    pub grand_master: GrandMasterInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrandMasterInfo {
    pub channel_mode: String,
    pub value_mode: String,
    pub slider_mode: String,
}

impl Default for Config {
    /// Generate a new Config object. Paths point at the conventional setup layout
    fn default() -> Self {
        Self {
            fixtures_path: PathBuf::from("setup/fixtures.csv"),
            universes_path: PathBuf::from("setup/universes.json"),
            groups_path: None,
            output_path: PathBuf::from("workspace.qxw"),
            id_start: 0,
            workspace: WorkspaceInfo::default(),
            virtual_console: VirtualConsoleInfo::default(),
        }
    }
}

impl Default for WorkspaceInfo {
    fn default() -> Self {
        Self {
            author: String::from(""),
            current_window: String::from("FixtureManager"),
            creator_name: String::from("Q Light Controller Plus"),
            creator_version: String::from("4.12.4"),
        }
    }
}

impl Default for VirtualConsoleInfo {
    fn default() -> Self {
        Self {
            background_color: String::from("Default"),
            width: 1920,
            height: 1080,
            grand_master: GrandMasterInfo::default(),
        }
    }
}

impl Default for GrandMasterInfo {
    fn default() -> Self {
        Self {
            channel_mode: String::from("Intensity"),
            value_mode: String::from("Reduce"),
            slider_mode: String::from("Normal"),
        }
    }
}

impl Config {
    /// Read the configuration in a YAML file
    /// Returns a Config if successful
    pub fn read_config_file(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            return Err(ConfigError::BadFilePath(config_path.to_path_buf()));
        }

        let yaml_str = std::fs::read_to_string(config_path)?;

        Ok(serde_yaml::from_str::<Self>(&yaml_str)?)
    }

    /// Write the configuration as YAML to the given path
    pub fn write_config_file(&self, config_path: &Path) -> Result<(), ConfigError> {
        let yaml_str = serde_yaml::to_string(self)?;
        std::fs::write(config_path, yaml_str)?;
        Ok(())
    }

    /// Make relative source and output paths relative to the given directory
    /// (typically the directory holding the config file). Absolute paths are kept.
    pub fn resolve_relative_to(mut self, base: &Path) -> Self {
        let resolve = |p: &Path| -> PathBuf {
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                base.join(p)
            }
        };
        self.fixtures_path = resolve(&self.fixtures_path);
        self.universes_path = resolve(&self.universes_path);
        self.output_path = resolve(&self.output_path);
        self.groups_path = self.groups_path.as_deref().map(resolve);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "fixtures_path: rig/fixtures.csv\nid_start: 12\nworkspace:\n  author: Crew\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.fixtures_path, PathBuf::from("rig/fixtures.csv"));
        assert_eq!(config.universes_path, PathBuf::from("setup/universes.json"));
        assert_eq!(config.id_start, 12);
        assert_eq!(config.workspace.author, "Crew");
        assert_eq!(config.workspace.current_window, "FixtureManager");
        assert!(config.groups_path.is_none());
    }

    #[test]
    fn test_template_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        let config = Config::default();
        config.write_config_file(&path).unwrap();
        let loaded = Config::read_config_file(&path).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_missing_config_file() {
        let dir = tempfile::tempdir().unwrap();
        match Config::read_config_file(&dir.path().join("nope.yml")) {
            Err(ConfigError::BadFilePath(_)) => (),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_resolve_relative_to() {
        let config = Config {
            groups_path: Some(PathBuf::from("setup/groups.csv")),
            ..Default::default()
        }
        .resolve_relative_to(Path::new("/show"));
        assert_eq!(config.fixtures_path, PathBuf::from("/show/setup/fixtures.csv"));
        assert_eq!(config.output_path, PathBuf::from("/show/workspace.qxw"));
        assert_eq!(
            config.groups_path,
            Some(PathBuf::from("/show/setup/groups.csv"))
        );
    }
}
