//! Host configuration for weft.
//!
//! Stored as TOML at `~/.config/weft/config.toml`. Every section has defaults,
//! so a partial file is valid and a missing file means "use the defaults".

use serde::{Deserialize, Serialize};
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

/// The document default format handed to forward sync
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Record native elements on the model so reverse sync can reuse them
    pub allow_cache_element: bool,
    /// Keep a node index; together with `allow_cache_element` this makes
    /// models keep their cache hints across renders
    pub use_indexer: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    pub line_separator: String,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            line_separator: "\n".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory of JSON surface trees offered by the inspector
    #[serde(skip_serializing_if = "Option::is_none")]
    pub samples_path: Option<PathBuf>,
    pub format: FormatConfig,
    pub cache: CacheConfig,
    pub text: TextConfig,
}

impl Config {
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

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        config.samples_path = config
            .samples_path
            .map(|path| Self::expand_path(&path).unwrap_or(path));

        Ok(Some(config))
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

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/weft");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// The `*.json` files in `samples_path`, sorted by path
    pub fn sample_files(&self) -> anyhow::Result<Vec<PathBuf>> {
        let Some(samples_path) = &self.samples_path else {
            return Ok(Vec::new());
        };
        let pattern = samples_path.join("*.json");
        let mut files = Vec::new();
        for entry in glob::glob(&pattern.to_string_lossy())? {
            match entry {
                Ok(path) => files.push(path),
                Err(err) => log::warn!("skipping unreadable sample: {err}"),
            }
        }
        files.sort();
        Ok(files)
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
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/weft/config.toml"));
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.text.line_separator, "\n");
        assert!(!config.cache.allow_cache_element);
    }

    #[test]
    fn test_partial_sections() {
        let config_content = r#"
[format]
font_family = "Calibri"

[cache]
allow_cache_element = true
"#;

        let config: Config = toml::from_str(config_content).unwrap();

        assert_eq!(config.format.font_family.as_deref(), Some("Calibri"));
        assert_eq!(config.format.font_size, None);
        assert!(config.cache.allow_cache_element);
        assert!(!config.cache.use_indexer);
        assert_eq!(config.text, TextConfig::default());
    }

    #[test]
    fn test_expand_path_with_env_var() {
        unsafe {
            env::set_var("WEFT_TEST_VAR", "/test/env/path");
        }

        let path = PathBuf::from("$WEFT_TEST_VAR/subdir");
        let expanded = Config::expand_path(&path);

        assert_eq!(expanded, Some(PathBuf::from("/test/env/path/subdir")));

        unsafe {
            env::remove_var("WEFT_TEST_VAR");
        }
    }

    #[test]
    fn test_expand_path_with_relative_path() {
        let path = PathBuf::from("relative/path");
        let expanded = Config::expand_path(&path).unwrap();

        assert_eq!(expanded, path);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = Config::load_from_path(&non_existent_config).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_load_config_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "[cache]\nallow_cache_element = \"maybe\"\n").unwrap();

        let result = Config::load_from_path(&config_file);

        assert!(matches!(result, Err(ConfigError::ConfigParseError { .. })));
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested").join("config.toml");
        let test_config = Config {
            samples_path: Some(PathBuf::from("/tmp/weft-samples")),
            format: FormatConfig {
                font_size: Some("12pt".into()),
                ..Default::default()
            },
            cache: CacheConfig {
                allow_cache_element: true,
                use_indexer: true,
            },
            text: TextConfig {
                line_separator: "\r\n".into(),
            },
        };

        test_config.save_to_path(&config_file).unwrap();
        let loaded_config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded_config, test_config);
    }

    #[test]
    fn test_samples_path_tilde_is_expanded_on_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "samples_path = \"~/weft/samples\"\n").unwrap();

        let config = Config::load_from_path(&config_file).unwrap().unwrap();

        let samples_path = config.samples_path.unwrap();
        assert!(!samples_path.to_string_lossy().starts_with('~'));
        assert!(samples_path.ends_with("weft/samples"));
    }

    #[test]
    fn test_sample_files_lists_json_only() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["b.json", "a.json", "notes.txt"] {
            std::fs::write(temp_dir.path().join(name), "{}").unwrap();
        }
        let config = Config {
            samples_path: Some(temp_dir.path().to_path_buf()),
            ..Default::default()
        };

        let files = config.sample_files().unwrap();

        assert_eq!(
            files,
            vec![temp_dir.path().join("a.json"), temp_dir.path().join("b.json")]
        );
    }

    #[test]
    fn test_sample_files_without_samples_path() {
        assert!(Config::default().sample_files().unwrap().is_empty());
    }
}
