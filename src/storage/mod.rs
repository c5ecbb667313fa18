//! ローカル保存モジュール
//!
//! キー単位で文字列値を丸ごと読み書きするストア（ブラウザのlocalStorage相当）と、
//! その上に載るレポート/検査員設定の読み書き。

mod gateway;
mod seed;

pub use gateway::{ReportStore, PROFILE_KEY, REPORTS_KEY};
pub use seed::sample_reports;

use crate::error::Result;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// キー/値ストア
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// メモリ上のストア（テスト用）
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// ディレクトリ配下に1キー1ファイル（<key>.json）で保存するストア
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        // 一時ファイルに書いてから置き換え（途中までの書き込みを残さない）
        let path = self.path_for(key);
        let tmp_path = self.dir.join(format!(".{}.json.tmp", key));
        fs::write(&tmp_path, value)?;
        fs::rename(&tmp_path, &path)?;

        log::debug!("wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }
}
