use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// Rules for the `include` directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncludePolicy {
    /// When false every `include` is reported and skipped.
    pub enabled: bool,
    /// Root-relative directory that included files must live under.
    pub directory: Option<String>,
}

impl Default for IncludePolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: None,
        }
    }
}

/// Settings shared by every parse of a document set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Level assigned to the first adornment character seen.
    pub initial_header_level: usize,
    /// How deep `include` may nest before it is refused.
    pub max_include_depth: usize,
    /// How deep nested blocks (quotes, list items, directive bodies) may recurse.
    pub max_nesting_depth: usize,
    /// Tab stop used when expanding tabs in source lines.
    pub tab_width: usize,
    /// Drop dangling-reference errors instead of reporting them.
    pub ignore_invalid_references: bool,
    /// Roles accepted by `:role:` cross references.
    pub reference_roles: Vec<String>,
    /// Directory the filesystem source origin reads from.
    pub source_root: Option<PathBuf>,
    /// Extra alias -> directive name mappings.
    pub directive_aliases: BTreeMap<String, String>,
    pub include: IncludePolicy,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            initial_header_level: 1,
            max_include_depth: 10,
            max_nesting_depth: 32,
            tab_width: 8,
            ignore_invalid_references: false,
            reference_roles: vec!["doc".to_string(), "ref".to_string()],
            source_root: None,
            directive_aliases: BTreeMap::new(),
            include: IncludePolicy::default(),
        }
    }
}

impl ParserConfig {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: ParserConfig =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the source root
        config.source_root = config
            .source_root
            .map(|root| Self::expand_path(&root).unwrap_or(root));

        Ok(Some(config))
    }

    /// Loads the file at `config_path`, falling back to defaults when it is absent.
    pub fn load_or_default<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        Ok(Self::load_from_path(config_path)?.unwrap_or_default())
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/rst-guides");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Source root with `~` and environment variables expanded.
    #[must_use]
    pub fn resolved_source_root(&self) -> Option<PathBuf> {
        self.source_root
            .as_ref()
            .map(|root| Self::expand_path(root).unwrap_or_else(|| root.clone()))
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_config_path() {
        let config_path = ParserConfig::config_path();
        let path_str = config_path.to_string_lossy();

        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/rst-guides/config.toml"));
    }

    #[test]
    fn test_defaults() {
        let config = ParserConfig::default();
        assert_eq!(config.initial_header_level, 1);
        assert_eq!(config.reference_roles, vec!["doc", "ref"]);
        assert!(config.include.enabled);
        assert_eq!(config.include.directory, None);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ParserConfig = toml::from_str(
            r#"
initial_header_level = 2

[include]
directory = "shared"
"#,
        )
        .unwrap();

        assert_eq!(config.initial_header_level, 2);
        assert_eq!(config.max_include_depth, 10);
        assert!(config.include.enabled);
        assert_eq!(config.include.directory.as_deref(), Some("shared"));
    }

    #[test]
    fn test_directive_aliases_from_toml() {
        let config: ParserConfig = toml::from_str(
            r#"
[directive_aliases]
callout = "note"
"#,
        )
        .unwrap();

        assert_eq!(
            config.directive_aliases.get("callout").map(String::as_str),
            Some("note")
        );
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = ParserConfig::load_from_path(&non_existent_config).unwrap();
        assert!(result.is_none());

        let fallback = ParserConfig::load_or_default(&non_existent_config).unwrap();
        assert_eq!(fallback, ParserConfig::default());
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "initial_header_level = \"one\"").unwrap();

        let err = ParserConfig::load_from_path(&config_file).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigParseError { .. }));
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested/config.toml");
        let mut test_config = ParserConfig {
            max_include_depth: 3,
            ignore_invalid_references: true,
            ..ParserConfig::default()
        };
        test_config
            .directive_aliases
            .insert("callout".into(), "note".into());

        test_config.save_to_path(&config_file).unwrap();
        let loaded_config = ParserConfig::load_from_path(&config_file)
            .unwrap()
            .unwrap();

        assert_eq!(loaded_config, test_config);
    }

    #[test]
    fn test_source_root_with_env_var() {
        unsafe {
            env::set_var("RST_GUIDES_TEST_ROOT", "/custom/docs");
        }

        let config = ParserConfig {
            source_root: Some(PathBuf::from("$RST_GUIDES_TEST_ROOT/guides")),
            ..ParserConfig::default()
        };
        assert_eq!(
            config.resolved_source_root(),
            Some(PathBuf::from("/custom/docs/guides"))
        );

        unsafe {
            env::remove_var("RST_GUIDES_TEST_ROOT");
        }
    }

    #[test]
    fn test_source_root_with_tilde() {
        let config = ParserConfig {
            source_root: Some(PathBuf::from("~/docs")),
            ..ParserConfig::default()
        };
        let root = config.resolved_source_root().unwrap();
        assert!(!root.to_string_lossy().starts_with('~'));
        assert!(root.to_string_lossy().ends_with("docs"));
    }
}
