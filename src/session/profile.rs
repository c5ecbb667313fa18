use crate::error::Result;
use crate::storage::{KeyValueStore, ReportStore};
use field_report_common::InspectorProfile;

/// 検査員設定の入力フォーム
///
/// 読み込み時は保存値を表示し、保存後は入力欄を空に戻す。
/// 保存値そのものはストアに残り、次の新規レポートに使われる。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl ProfileForm {
    pub fn load<S: KeyValueStore>(store: &ReportStore<S>) -> Result<Self> {
        let profile = store.load_profile()?;
        Ok(Self {
            name: profile.name,
            email: profile.email,
            phone: profile.phone,
        })
    }

    pub fn profile(&self) -> InspectorProfile {
        InspectorProfile {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
        }
    }

    /// 保存して入力欄をクリア
    pub fn save<S: KeyValueStore>(&mut self, store: &mut ReportStore<S>) -> Result<InspectorProfile> {
        let profile = self.profile();
        store.save_profile(&profile)?;
        self.clear();
        Ok(profile)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self.profile().is_empty()
    }
}
