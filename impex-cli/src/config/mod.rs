//! Configuration file handling
//!
//! Settings live in a TOML file, looked up at `$IMPEX_CONFIG` or
//! `<config dir>/impex/config.toml`. A missing file yields the defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::merge::{EmptyTargetPolicy, FieldList, MergeOptions};
use crate::submit::{
    DEFAULT_BATCH_SIZE, DISPLAY_NAME_FIELDS, ResolverFields, SYSTEM_FIELDS, SubmitOptions,
    TranslationOptions,
};

pub const CONFIG_ENV: &str = "IMPEX_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImpexConfig {
    #[serde(default)]
    pub merge: MergeConfig,
    #[serde(default)]
    pub submit: SubmitConfig,
    #[serde(default)]
    pub resolver: ResolverFields,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Fields whose TO value always wins
    #[serde(default)]
    pub excluded_fields: Vec<String>,

    /// Create every FROM record when the TO reporting point has no records
    #[serde(default)]
    pub create_when_target_empty: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitConfig {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Fields never sent to the service
    #[serde(default = "default_excluded_fields")]
    pub excluded_fields: Vec<String>,

    /// Fields sent under their display name instead of their id
    #[serde(default = "default_display_name_fields")]
    pub display_name_fields: Vec<String>,
}

impl Default for SubmitConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            excluded_fields: default_excluded_fields(),
            display_name_fields: default_display_name_fields(),
        }
    }
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_excluded_fields() -> Vec<String> {
    SYSTEM_FIELDS.iter().map(|s| s.to_string()).collect()
}

fn default_display_name_fields() -> Vec<String> {
    DISPLAY_NAME_FIELDS.iter().map(|s| s.to_string()).collect()
}

impl ImpexConfig {
    /// Location of the config file when none is given explicitly
    pub fn default_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }
        dirs::config_dir().map(|dir| dir.join("impex").join("config.toml"))
    }

    /// Load from `path`, or from the default location when `path` is `None`
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) => path,
                None => {
                    log::debug!("No config directory available, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        if !path.exists() {
            log::debug!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn merge_options(&self, merge_field: impl Into<String>) -> MergeOptions {
        let mut options = MergeOptions::new(merge_field);
        if self.merge.create_when_target_empty {
            options.empty_target = EmptyTargetPolicy::CreateAll;
        }
        options
    }

    /// Configured exclusions plus any passed on the command line
    pub fn merge_exclusions(&self, extra: &[String]) -> FieldList {
        FieldList::new(self.merge.excluded_fields.iter().chain(extra).cloned())
    }

    pub fn submit_options(&self) -> SubmitOptions {
        SubmitOptions {
            batch_size: self.submit.batch_size,
            translation: TranslationOptions {
                excluded_fields: self.submit.excluded_fields.iter().cloned().collect(),
                display_name_fields: self.submit.display_name_fields.iter().cloned().collect(),
            },
            resolver: self.resolver.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldIndex, ReportingPoint};
    use crate::merge::ExclusionPolicy;

    #[test]
    fn test_defaults() {
        let config = ImpexConfig::default();
        assert_eq!(config.submit.batch_size, 50);
        assert!(config.submit.excluded_fields.contains(&"ObjectId".to_string()));
        assert!(config.submit.display_name_fields.contains(&"SampleDateTime".to_string()));
        assert_eq!(config.resolver.cause_location, "Cause Location");
        assert!(!config.merge.create_when_target_empty);
    }

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = ImpexConfig::from_toml("").unwrap();
        assert_eq!(config, ImpexConfig::default());
    }

    #[test]
    fn test_toml_overrides() {
        let config = ImpexConfig::from_toml(
            r#"
            [merge]
            excluded_fields = ["Comment"]
            create_when_target_empty = true

            [submit]
            batch_size = 10

            [resolver]
            cause = "Reason"
            "#,
        )
        .unwrap();

        assert_eq!(config.merge.excluded_fields, vec!["Comment"]);
        assert_eq!(config.submit.batch_size, 10);
        // Unset keys in a present section keep their defaults
        assert_eq!(config.submit.excluded_fields.len(), SYSTEM_FIELDS.len());
        assert_eq!(config.resolver.cause, "Reason");
        assert_eq!(config.resolver.effect, "Effect");

        let options = config.merge_options("Key");
        assert_eq!(options.merge_field, "Key");
        assert_eq!(options.empty_target, EmptyTargetPolicy::CreateAll);

        assert_eq!(config.submit_options().batch_size, 10);
    }

    #[test]
    fn test_merge_exclusions_include_cli_fields() {
        let config = ImpexConfig::from_toml("[merge]\nexcluded_fields = [\"Comment\"]").unwrap();
        let policy = config.merge_exclusions(&["Operator".to_string()]);
        let rp = ReportingPoint::new("Site.Crusher", "downtime", FieldIndex::default());

        let excluded = policy.excluded_fields(&rp);
        assert!(excluded.contains("Comment"));
        assert!(excluded.contains("Operator"));
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ImpexConfig::load(Some(&dir.path().join("nope.toml"))).unwrap();
        assert_eq!(config, ImpexConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[submit]\nbatch_size = 3\n").unwrap();

        let config = ImpexConfig::load(Some(&path)).unwrap();
        assert_eq!(config.submit.batch_size, 3);
    }

    #[test]
    fn test_load_invalid_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[submit]\nbatch_size = \"many\"\n").unwrap();

        assert!(ImpexConfig::load(Some(&path)).is_err());
    }
}
