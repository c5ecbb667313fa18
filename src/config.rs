use crate::ai_provider::AiProvider;
use crate::error::{ReporterError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// データディレクトリを上書きする環境変数
pub const DATA_DIR_ENV: &str = "FIELD_REPORTER_DATA_DIR";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// レポート・設定の保存先（未指定ならOS標準のデータディレクトリ）
    pub data_dir: Option<PathBuf>,
    /// PDFの出力先（未指定ならカレントディレクトリ）
    pub output_dir: Option<PathBuf>,
    pub ai_provider: AiProvider,
    pub refine_timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            output_dir: None,
            ai_provider: AiProvider::default(),
            refine_timeout_seconds: 120,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| ReporterError::Config(format!("{}: {}", path.display(), e)))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ReporterError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("field-reporter").join("config.json"))
    }

    /// 保存先ディレクトリ（環境変数 > 設定ファイル > OS標準）
    pub fn resolve_data_dir(&self) -> Result<PathBuf> {
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            if !dir.trim().is_empty() {
                return Ok(PathBuf::from(dir));
            }
        }
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        let base = dirs::data_dir()
            .ok_or_else(|| ReporterError::Config("データディレクトリが見つかりません".into()))?;
        Ok(base.join("field-reporter"))
    }

    pub fn resolve_output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn refine_timeout(&self) -> Duration {
        Duration::from_secs(self.refine_timeout_seconds.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_default() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.refine_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            output_dir: Some(PathBuf::from("/tmp/reports")),
            ai_provider: AiProvider::Gemini,
            ..Default::default()
        };
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"ai_provider":"codex"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.ai_provider, AiProvider::Codex);
        assert_eq!(config.refine_timeout_seconds, 120);
        assert_eq!(config.resolve_output_dir(), PathBuf::from("."));
    }

    #[test]
    fn test_broken_file_is_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ReporterError::Config(_))));
    }
}
