//! Configuration for kbase.
//!
//! Values are layered, later layers winning:
//! 1. compiled defaults (see [`Config::default`]),
//! 2. an optional file, parsed as TOML, YAML or JSON depending on its
//!    extension,
//! 3. environment variables prefixed `KBASE_`, with `__` separating nested
//!    keys (`KBASE_REFRESH__CHUNK_SIZE=500`).
//!
//! Environment variable names are lowercased before they are matched, so
//! per-type batch limits whose provider type has capitals (`OpenAI`) can
//! only be set from a file.

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "KBASE_";
const DEFAULT_BATCH_LIMIT: u32 = 100_000;
const DEFAULT_CHUNK_SIZE: usize = 1_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Path of the SQLite catalog database.
    pub database: PathBuf,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory under which local storage providers keep their files. Must
    /// be absolute.
    pub root: PathBuf,
}

/// Settings for vector refreshes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// Files per indexing pass when neither the embedding provider nor
    /// `batch_limits` say otherwise.
    pub default_batch_limit: u32,
    /// Files per indexing pass, by embedding provider type (exact match).
    pub batch_limits: BTreeMap<String, u32>,
    /// Maximum characters per embedded chunk.
    pub chunk_size: usize,
}

fn data_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "kbase").map(|dirs| dirs.data_dir().to_path_buf())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: data_dir().map_or_else(|| PathBuf::from("./kbase.sqlite"), |dir| dir.join("kbase.sqlite")),
            storage: StorageConfig::default(),
            refresh: RefreshConfig::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let root = data_dir()
            .or_else(|| std::env::current_dir().ok())
            .map_or_else(|| PathBuf::from("storage"), |dir| dir.join("storage"));
        Self { root }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            default_batch_limit: DEFAULT_BATCH_LIMIT,
            batch_limits: BTreeMap::from([("OpenAI".to_string(), 3)]),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl Config {
    /// Load and validate configuration, optionally reading `path` on top of
    /// the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config: Self = Self::figment(path)?.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        tracing::debug!(database = %config.database.display(), storage = %config.storage.root.display(), "configuration loaded");
        Ok(config)
    }

    fn figment(path: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = match path.extension().and_then(|ext| ext.to_str()) {
                Some("toml") => figment.merge(Toml::file_exact(path)),
                Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path)),
                Some("json") => figment.merge(Json::file_exact(path)),
                _ => exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf())),
            };
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    pub fn validate(&self) -> Result<()> {
        if !self.storage.root.is_absolute() {
            exn::bail!(ErrorKind::Invalid("storage.root"));
        }
        self.refresh.validate()
    }
}

impl RefreshConfig {
    pub fn validate(&self) -> Result<()> {
        if self.default_batch_limit == 0 {
            exn::bail!(ErrorKind::Invalid("refresh.default_batch_limit"));
        }
        if self.batch_limits.values().any(|limit| *limit == 0) {
            exn::bail!(ErrorKind::Invalid("refresh.batch_limits"));
        }
        if self.chunk_size == 0 {
            exn::bail!(ErrorKind::Invalid("refresh.chunk_size"));
        }
        Ok(())
    }

    /// Batch limit configured for an embedding provider type, falling back to
    /// the default limit.
    pub fn batch_limit_for(&self, provider_type: &str) -> u32 {
        self.batch_limits.get(provider_type).copied().unwrap_or(self.default_batch_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.refresh.default_batch_limit, 100_000);
        assert_eq!(config.refresh.chunk_size, 1_000);
        assert_eq!(config.refresh.batch_limits.get("OpenAI"), Some(&3));
        assert!(config.database.ends_with("kbase.sqlite"));
        assert!(config.storage.root.ends_with("storage"));
    }

    #[rstest]
    #[case("OpenAI", 3)]
    #[case("openai", 100_000)]
    #[case("Local", 100_000)]
    #[case("", 100_000)]
    fn test_batch_limit_for(#[case] provider_type: &str, #[case] expected: u32) {
        assert_eq!(RefreshConfig::default().batch_limit_for(provider_type), expected);
    }

    #[test]
    fn test_validate_rejects_zero_and_relative() {
        let mut config = Config::default();
        config.storage.root = PathBuf::from("/srv/kbase");
        assert!(config.validate().is_ok());

        let mut bad = config.clone();
        bad.refresh.chunk_size = 0;
        assert!(matches!(&*bad.validate().unwrap_err(), ErrorKind::Invalid("refresh.chunk_size")));

        let mut bad = config.clone();
        bad.refresh.batch_limits.insert("Azure".to_string(), 0);
        assert!(matches!(&*bad.validate().unwrap_err(), ErrorKind::Invalid("refresh.batch_limits")));

        let mut bad = config.clone();
        bad.refresh.default_batch_limit = 0;
        assert!(bad.validate().is_err());

        let mut bad = config;
        bad.storage.root = PathBuf::from("relative/storage");
        assert!(matches!(&*bad.validate().unwrap_err(), ErrorKind::Invalid("storage.root")));
    }

    #[test]
    fn test_load_toml_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "kbase.toml",
                r#"
                database = "/var/lib/kbase/catalog.sqlite"

                [storage]
                root = "/var/lib/kbase/files"

                [refresh]
                chunk_size = 500

                [refresh.batch_limits]
                Azure = 16
                "#,
            )?;
            let config = Config::load(Some(Path::new("kbase.toml"))).unwrap();
            assert_eq!(config.database, PathBuf::from("/var/lib/kbase/catalog.sqlite"));
            assert_eq!(config.storage.root, PathBuf::from("/var/lib/kbase/files"));
            assert_eq!(config.refresh.chunk_size, 500);
            assert_eq!(config.refresh.default_batch_limit, 100_000);
            assert_eq!(config.refresh.batch_limit_for("Azure"), 16);
            assert_eq!(config.refresh.batch_limit_for("OpenAI"), 3);
            Ok(())
        });
    }

    #[test]
    fn test_load_yaml_file() {
        Jail::expect_with(|jail| {
            jail.create_file("kbase.yaml", "storage:\n  root: /data/files\nrefresh:\n  default_batch_limit: 50\n")?;
            let config = Config::load(Some(Path::new("kbase.yaml"))).unwrap();
            assert_eq!(config.storage.root, PathBuf::from("/data/files"));
            assert_eq!(config.refresh.default_batch_limit, 50);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("kbase.json", r#"{"storage": {"root": "/data/files"}, "refresh": {"chunk_size": 500}}"#)?;
            jail.set_env("KBASE_REFRESH__CHUNK_SIZE", "250");
            jail.set_env("KBASE_DATABASE", "/tmp/other.sqlite");
            let config = Config::load(Some(Path::new("kbase.json"))).unwrap();
            assert_eq!(config.refresh.chunk_size, 250);
            assert_eq!(config.database, PathBuf::from("/tmp/other.sqlite"));
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_unknown_extension_and_missing_file() {
        Jail::expect_with(|_jail| {
            let err = Config::load(Some(Path::new("kbase.ini"))).unwrap_err();
            assert!(matches!(&*err, ErrorKind::UnsupportedFormat(_)));
            let err = Config::load(Some(Path::new("missing.toml"))).unwrap_err();
            assert!(matches!(&*err, ErrorKind::Load));
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        Jail::expect_with(|jail| {
            jail.create_file("kbase.toml", "[storage]\nroot = \"/data\"\n[refresh]\nchunk_size = 0\n")?;
            let err = Config::load(Some(Path::new("kbase.toml"))).unwrap_err();
            assert!(matches!(&*err, ErrorKind::Invalid("refresh.chunk_size")));
            Ok(())
        });
    }
}
