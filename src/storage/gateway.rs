use super::{sample_reports, KeyValueStore};
use crate::error::{ReporterError, Result};
use field_report_common::{InspectorProfile, Report, ReportCollection};

/// レポート一覧の保存キー
pub const REPORTS_KEY: &str = "field_reports_v2";
/// 検査員設定の保存キー
pub const PROFILE_KEY: &str = "field_reporter_settings";

/// レポート一覧と検査員設定の読み書き
///
/// 初回起動時（一覧が未保存）は `seed` を一覧として書き戻す。
/// 書き込みは常に全体の置き換えで、最後に書いた内容が残る。
pub struct ReportStore<S: KeyValueStore> {
    kv: S,
    seed: Vec<Report>,
}

impl<S: KeyValueStore> ReportStore<S> {
    /// サンプルレポート1件を初期値とする
    pub fn new(kv: S) -> Self {
        Self::with_seed(kv, sample_reports())
    }

    pub fn with_seed(kv: S, seed: Vec<Report>) -> Self {
        Self { kv, seed }
    }

    pub fn kv(&self) -> &S {
        &self.kv
    }

    /// レポート一覧を読み込み
    ///
    /// 保存値が壊れている場合は `CorruptStore` を返し、ストアには触れない。
    pub fn load_reports(&mut self) -> Result<ReportCollection> {
        match self.kv.get(REPORTS_KEY)? {
            Some(json) => ReportCollection::from_json(&json).map_err(|source| {
                ReporterError::CorruptStore {
                    key: REPORTS_KEY.to_string(),
                    source,
                }
            }),
            None => {
                let collection = ReportCollection::new(self.seed.clone());
                self.save_reports(&collection)?;
                log::info!("seeded report store with {} report(s)", collection.len());
                Ok(collection)
            }
        }
    }

    /// レポート一覧を丸ごと保存
    pub fn save_reports(&mut self, collection: &ReportCollection) -> Result<()> {
        let json = collection.to_json()?;
        self.kv.set(REPORTS_KEY, &json)?;
        log::debug!("saved {} report(s)", collection.len());
        Ok(())
    }

    /// 検査員設定を読み込み
    ///
    /// 未保存なら空。壊れている場合も警告を出して空として扱う。
    pub fn load_profile(&self) -> Result<InspectorProfile> {
        let Some(json) = self.kv.get(PROFILE_KEY)? else {
            return Ok(InspectorProfile::default());
        };

        match InspectorProfile::from_json(&json) {
            Ok(profile) => Ok(profile),
            Err(e) => {
                log::warn!("ignoring corrupt inspector profile: {}", e);
                Ok(InspectorProfile::default())
            }
        }
    }

    pub fn save_profile(&mut self, profile: &InspectorProfile) -> Result<()> {
        let json = profile.to_json()?;
        self.kv.set(PROFILE_KEY, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn report(id: &str) -> Report {
        Report {
            id: id.to_string(),
            project_name: format!("Project {}", id),
            ..Default::default()
        }
    }

    #[test]
    fn test_load_reports_seeds_and_writes_back() {
        let mut store = ReportStore::with_seed(MemoryStore::new(), vec![report("seed")]);
        let collection = store.load_reports().expect("読み込み失敗");

        assert_eq!(collection.len(), 1);
        assert_eq!(collection.as_slice()[0].id, "seed");
        let raw = store.kv().get(REPORTS_KEY).unwrap().expect("書き戻されていない");
        assert!(raw.contains("\"seed\""));
    }

    #[test]
    fn test_load_reports_prefers_stored_value() {
        let kv = MemoryStore::new().with_entry(REPORTS_KEY, "[]");
        let mut store = ReportStore::with_seed(kv, vec![report("seed")]);
        assert!(store.load_reports().unwrap().is_empty());
    }

    #[test]
    fn test_default_seed_is_sample_report() {
        let mut store = ReportStore::new(MemoryStore::new());
        let collection = store.load_reports().unwrap();
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.as_slice()[0].id, "RPT-2025-001");
    }

    #[test]
    fn test_save_then_load_reports() {
        let mut store = ReportStore::with_seed(MemoryStore::new(), Vec::new());
        let collection = ReportCollection::new(vec![report("a"), report("b")]);
        store.save_reports(&collection).unwrap();
        assert_eq!(store.load_reports().unwrap(), collection);
    }

    #[test]
    fn test_corrupt_reports_fail_fast_without_overwrite() {
        let kv = MemoryStore::new().with_entry(REPORTS_KEY, "[{broken");
        let mut store = ReportStore::with_seed(kv, vec![report("seed")]);

        let err = store.load_reports().unwrap_err();
        assert!(matches!(err, ReporterError::CorruptStore { ref key, .. } if key == REPORTS_KEY));
        assert_eq!(store.kv().get(REPORTS_KEY).unwrap().as_deref(), Some("[{broken"));
    }

    #[test]
    fn test_profile_absent_and_corrupt_are_empty() {
        let store = ReportStore::with_seed(MemoryStore::new(), Vec::new());
        assert!(store.load_profile().unwrap().is_empty());

        let kv = MemoryStore::new().with_entry(PROFILE_KEY, "not json");
        let store = ReportStore::with_seed(kv, Vec::new());
        assert!(store.load_profile().unwrap().is_empty());
    }

    #[test]
    fn test_profile_roundtrip() {
        let mut store = ReportStore::with_seed(MemoryStore::new(), Vec::new());
        let profile = InspectorProfile {
            name: "Tirth Patel".to_string(),
            email: "patel@example.com".to_string(),
            phone: "832-848-5569".to_string(),
        };
        store.save_profile(&profile).unwrap();
        assert_eq!(store.load_profile().unwrap(), profile);
    }
}
