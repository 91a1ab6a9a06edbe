use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use super::catalog::ActionSet;
use super::catalog::IntensityLevel;
use super::catalog::RuleCategory;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse toml: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("parse yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub watched: Vec<RuleCategory>,
    pub catalog: CatalogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            watched: RuleCategory::ALL.to_vec(),
            catalog: CatalogConfig::default(),
        }
    }
}

impl Config {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    pub fn from_yaml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(input)?)
    }

    /// Loads a config file, picking YAML for `.yaml`/`.yml` and TOML
    /// otherwise.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&text),
            _ => Self::from_toml_str(&text),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct CatalogConfig {
    pub synced_groups: BTreeMap<RuleCategory, Vec<RuleCategory>>,
    pub default_sound: String,
    /// Replaces the built-in preset for a category at a given level.
    pub preset_overrides: BTreeMap<RuleCategory, BTreeMap<IntensityLevel, ActionSet>>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        let mut synced_groups = BTreeMap::new();
        synced_groups.insert(
            RuleCategory::OneToOneRoom,
            vec![RuleCategory::AllOtherMessages],
        );
        synced_groups.insert(
            RuleCategory::AllOtherMessages,
            vec![RuleCategory::OneToOneRoom],
        );
        Self {
            synced_groups,
            default_sound: "default".to_string(),
            preset_overrides: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::catalog::RuleAction;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = Config::from_toml_str("").expect("parse");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn toml_overrides_watched_and_groups() {
        let config = Config::from_toml_str(
            r#"
watched = ["one_to_one_room", "encrypted_one_to_one_room", "keywords"]

[catalog]
default_sound = "chime"

[catalog.synced_groups]
one_to_one_room = ["encrypted_one_to_one_room"]
"#,
        )
        .expect("parse");

        assert_eq!(
            config.watched,
            vec![
                RuleCategory::OneToOneRoom,
                RuleCategory::EncryptedOneToOneRoom,
                RuleCategory::Keywords,
            ]
        );
        assert_eq!(config.catalog.default_sound, "chime");
        assert_eq!(
            config.catalog.synced_groups.get(&RuleCategory::OneToOneRoom),
            Some(&vec![RuleCategory::EncryptedOneToOneRoom])
        );
        assert!(!config
            .catalog
            .synced_groups
            .contains_key(&RuleCategory::AllOtherMessages));
    }

    #[test]
    fn toml_reads_preset_overrides() {
        let config = Config::from_toml_str(
            r#"
[catalog.preset_overrides.call]
noisy = { actions = ["notify"] }
off = "disabled"
"#,
        )
        .expect("parse");

        let call = config
            .catalog
            .preset_overrides
            .get(&RuleCategory::Call)
            .expect("call overrides");
        assert_eq!(
            call.get(&IntensityLevel::Noisy),
            Some(&ActionSet::Actions(vec![RuleAction::Notify]))
        );
        assert_eq!(call.get(&IntensityLevel::Off), Some(&ActionSet::Disabled));
        assert_eq!(call.get(&IntensityLevel::Silent), None);
    }

    #[test]
    fn load_picks_yaml_by_extension() {
        let mut file = tempfile::Builder::new()
            .suffix(".yaml")
            .tempfile()
            .expect("tmpfile");
        writeln!(file, "watched: [call, tombstone]").expect("write");

        let config = Config::load(file.path()).expect("load");
        assert_eq!(
            config.watched,
            vec![RuleCategory::Call, RuleCategory::Tombstone]
        );
        assert_eq!(config.catalog, CatalogConfig::default());
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Config::load("/definitely/not/here.toml").expect_err("missing");
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
