//! Library configuration.
//!
//! Consumers can construct every component programmatically; the config file
//! is a convenience for wiring a [`crate::handler::RequestHandler`] in one
//! call.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  /// Names the persistent cache namespace (and its data directory).
  pub application_name: String,
  pub api: ApiConfig,
  #[serde(default)]
  pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Base URL prefixed to every versioned endpoint.
  pub url: String,
  /// Environment variable holding the bearer token.
  pub token_variable: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheConfig {
  /// Overrides the platform data-directory default.
  pub path: Option<PathBuf>,
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./japi.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/japi/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(Error::Config(format!("config file not found: {}", p.display())));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(Error::Config(
        "no configuration file found; create one at ~/.config/japi/config.yaml".to_string(),
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("japi.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("japi").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| Error::Config(format!("failed to read {}: {}", path.display(), e)))?;

    serde_yaml::from_str(&contents)
      .map_err(|e| Error::Config(format!("failed to parse {}: {}", path.display(), e)))
  }

  /// The environment variable to read the API bearer token from.
  pub fn token_variable(&self) -> String {
    self
      .api
      .token_variable
      .clone()
      .unwrap_or_else(|| "JAPI_API_TOKEN".to_string())
  }

  /// Read the bearer token from the configured environment variable.
  pub fn get_api_token(&self) -> Result<String> {
    let variable = self.token_variable();
    std::env::var(&variable)
      .map_err(|_| Error::Config(format!("api token not found; set {}", variable)))
  }
}
