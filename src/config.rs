//! 設定（デフォルト → 設定ファイル → 環境変数 `BORROW_*` の順に上書き）

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "borrow-ledger.toml";

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub collection: String,
    pub timeout_secs: u64,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// 設定を読み込む。パス指定時はそのファイルが必須、未指定なら
    /// カレントの `borrow-ledger.toml` があれば使う。
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(p) => File::from(p.to_path_buf()).required(true),
            None => File::from(PathBuf::from(DEFAULT_CONFIG_FILE)).required(false),
        };

        Config::builder()
            .set_default("api.base_url", "http://localhost:3000")?
            .set_default("api.collection", "borrowList")?
            .set_default("api.timeout_secs", 10_i64)?
            .set_default("logging.level", "info")?
            .add_source(file)
            // e.g. BORROW_API__BASE_URL
            .add_source(
                Environment::with_prefix("BORROW")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_point_at_local_backend() {
        let config = AppConfig::load(None).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:3000");
        assert_eq!(config.api.collection, "borrowList");
        assert_eq!(config.api.timeout(), Duration::from_secs(10));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[api]\nbase_url = \"http://books.internal:8080\"\ntimeout_secs = 3\n\n[logging]\nlevel = \"debug\""
        )
        .unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.api.base_url, "http://books.internal:8080");
        assert_eq!(config.api.collection, "borrowList");
        assert_eq!(config.api.timeout_secs, 3);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AppConfig::load(Some(&dir.path().join("absent.toml"))).is_err());
    }
}
