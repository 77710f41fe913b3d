//! Connection profiles loaded from TOML.
//!
//! ```toml
//! default_profile = "local"
//!
//! [profiles.local]
//! endpoint = "http://localhost:8000"
//! ns = "test"
//! db = "test"
//! user = "root"
//! pass = "root"
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::client::ConnectionOptions;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "SURREAL_REST_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    pub endpoint: String,
    pub options: ConnectionOptions,
}

#[derive(Debug, Default)]
pub struct ClientConfig {
    path: Option<PathBuf>,
    default_profile: Option<String>,
    profiles: HashMap<String, Profile>,
}

impl ClientConfig {
    /// Reads `explicit`, else `$SURREAL_REST_CONFIG`, else the per-user
    /// default path. A missing file yields an empty config.
    pub fn load(explicit: Option<PathBuf>) -> Result<Self, ConfigError> {
        let path = explicit
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
            .or_else(default_config_path);
        let raw = match path.as_ref() {
            Some(config_path) if config_path.exists() => read_file(config_path)?,
            _ => RawConfig::default(),
        };
        debug!(path = ?path, profiles = raw.profiles.len(), "config.load");
        let mut config = Self::from_raw(raw)?;
        config.path = path;
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let raw = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: None,
            source,
        })?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        let mut profiles = HashMap::new();
        for (name, profile) in raw.profiles {
            let converted = convert_profile(&name, profile)?;
            profiles.insert(name, converted);
        }
        if let Some(default_name) = raw.default_profile.as_ref() {
            if !profiles.contains_key(default_name) {
                return Err(ConfigError::ProfileNotFound {
                    name: default_name.clone(),
                });
            }
        }
        Ok(Self {
            path: None,
            default_profile: raw.default_profile,
            profiles,
        })
    }

    /// File the config was read from, when one was resolved.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn profile(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name)
    }

    pub fn profiles(&self) -> impl Iterator<Item = &Profile> {
        self.profiles.values()
    }

    pub fn default_profile(&self) -> Option<&Profile> {
        self.default_profile
            .as_deref()
            .and_then(|name| self.profiles.get(name))
    }

    /// The named profile, or the default one when `name` is `None`.
    pub fn resolve(&self, name: Option<&str>) -> Result<&Profile, ConfigError> {
        match name.or(self.default_profile.as_deref()) {
            Some(name) => self.profile(name).ok_or_else(|| ConfigError::ProfileNotFound {
                name: name.to_string(),
            }),
            None => Err(ConfigError::NoDefaultProfile),
        }
    }
}

fn read_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: Some(path.to_path_buf()),
        source,
    })
}

fn convert_profile(name: &str, raw: RawProfile) -> Result<Profile, ConfigError> {
    let endpoint = raw
        .endpoint
        .filter(|endpoint| !endpoint.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingEndpoint {
            profile: name.to_string(),
        })?;
    Ok(Profile {
        name: name.to_string(),
        endpoint,
        options: ConnectionOptions {
            ns: raw.ns,
            db: raw.db,
            user: raw.user,
            pass: raw.pass,
            token: raw.token,
        },
    })
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    profiles: HashMap<String, RawProfile>,
    #[serde(default)]
    default_profile: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawProfile {
    endpoint: Option<String>,
    ns: Option<String>,
    db: Option<String>,
    user: Option<String>,
    pass: Option<String>,
    token: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read client config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse client config{}: {source}", path_suffix(.path))]
    Parse {
        path: Option<PathBuf>,
        source: toml::de::Error,
    },
    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String },
    #[error("profile '{profile}' has no endpoint")]
    MissingEndpoint { profile: String },
    #[error("no profile named and no default_profile configured")]
    NoDefaultProfile,
}

fn path_suffix(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|path| format!(" {}", path.display()))
        .unwrap_or_default()
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join("surreal-rest").join("client.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
default_profile = "local"

[profiles.local]
endpoint = "http://localhost:8000"
ns = "test"
db = "test"
user = "root"
pass = "root"

[profiles.cloud]
endpoint = "https://db.example.com"
token = "abc"
"#;

    #[test]
    fn parses_profiles() {
        let config = ClientConfig::from_toml_str(SAMPLE).unwrap();
        let local = config.default_profile().unwrap();
        assert_eq!(local.endpoint, "http://localhost:8000");
        assert_eq!(local.options.ns.as_deref(), Some("test"));
        let cloud = config.resolve(Some("cloud")).unwrap();
        assert_eq!(cloud.options.authorization().as_deref(), Some("Bearer abc"));
        assert_eq!(config.profiles().count(), 2);
    }

    #[test]
    fn unknown_default_is_rejected() {
        let err = ClientConfig::from_toml_str("default_profile = \"missing\"").unwrap_err();
        assert!(matches!(err, ConfigError::ProfileNotFound { name } if name == "missing"));
    }

    #[test]
    fn profile_without_endpoint_is_rejected() {
        let err = ClientConfig::from_toml_str("[profiles.bare]\nns = \"x\"").unwrap_err();
        assert!(matches!(err, ConfigError::MissingEndpoint { profile } if profile == "bare"));
    }

    #[test]
    fn resolve_without_default() {
        let config = ClientConfig::from_toml_str("").unwrap();
        assert!(matches!(config.resolve(None), Err(ConfigError::NoDefaultProfile)));
    }

    #[test]
    fn load_reads_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.toml");
        fs::write(&path, SAMPLE).unwrap();
        let config = ClientConfig::load(Some(path.clone())).unwrap();
        assert_eq!(config.path(), Some(path.as_path()));
        assert_eq!(config.resolve(None).unwrap().name, "local");
    }

    #[test]
    fn load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::load(Some(dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.profiles().count(), 0);
    }
}
