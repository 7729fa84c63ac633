use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub backend: BackendConfig,
  #[serde(default)]
  pub cache: CacheConfig,
  /// Media host settings; image upload is unavailable without them.
  pub upload: Option<UploadConfig>,
  /// Restaurant display name for CLI output headers.
  pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
  pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  /// Version tag naming the cache generation. Bumping this is the only
  /// migration path for cached entries: activation deletes every other
  /// generation.
  #[serde(default = "default_cache_version")]
  pub version: String,
  /// Override for the cache database location.
  pub path: Option<PathBuf>,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      version: default_cache_version(),
      path: None,
    }
  }
}

fn default_cache_version() -> String {
  "dhaba-v2".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
  pub url: String,
  pub preset: String,
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./dhaba.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/dhaba/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(eyre!(
        "No configuration file found. Create one at ~/.config/dhaba/config.yaml\n\
                 with at least a backend url."
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("dhaba.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("dhaba").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_full_config() {
    let yaml = r#"
backend:
  url: https://backend.example/api/v1
cache:
  version: dhaba-v3
upload:
  url: https://media.example/v1_1/dhaba/image/upload
  preset: dhaba-unsigned
title: Dhaba One
"#;

    let config: Config = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.backend.url, "https://backend.example/api/v1");
    assert_eq!(config.cache.version, "dhaba-v3");
    assert_eq!(config.upload.unwrap().preset, "dhaba-unsigned");
    assert_eq!(config.title.as_deref(), Some("Dhaba One"));
  }

  #[test]
  fn test_cache_section_defaults() {
    let yaml = r#"
backend:
  url: https://backend.example
"#;

    let config: Config = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.cache.version, "dhaba-v2");
    assert!(config.cache.path.is_none());
    assert!(config.upload.is_none());
  }
}
