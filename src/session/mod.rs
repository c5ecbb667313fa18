//! 入力セッションモジュール
//!
//! 新規作成/編集中のレポート（ドラフト）をメモリ上で管理し、
//! 検証を通ったものだけを一覧へ確定（commit）する。

mod attachments;
mod profile;

pub use attachments::load_image_batch;
pub use profile::ProfileForm;

use crate::error::{ReporterError, Result};
use crate::refine::Refiner;
use crate::storage::{KeyValueStore, ReportStore};
use field_report_common::{InspectorProfile, Report, ReportCollection, ReportStatus, ReportType};
use std::path::PathBuf;

/// 天候の選択肢
pub const WEATHER_OPTIONS: &[&str] = &[
    "Sunny",
    "Clear",
    "Partly Cloudy",
    "Cloudy",
    "Overcast",
    "Light Rain",
    "Rain",
    "Heavy Rain",
    "Thunderstorm",
    "Snow",
    "Sleet",
    "Foggy",
    "Windy",
];

/// 天候と気温から保存用の文字列を合成
///
/// "Windy" + "63" → "Windy / 63 F"、気温が空なら "Windy / "
pub fn compose_weather(condition: &str, temperature: &str) -> String {
    if temperature.is_empty() {
        format!("{} / ", condition)
    } else {
        format!("{} / {} F", condition, temperature)
    }
}

/// 保存済みの天候文字列を (天候, 気温) に分解
pub fn parse_weather(weather: &str) -> (String, String) {
    let mut parts = weather.split(" / ");
    let condition = parts.next().unwrap_or_default().to_string();
    let temperature = parts
        .next()
        .map(|t| t.replacen(" F", "", 1))
        .unwrap_or_default();
    (condition, temperature)
}

/// 履歴からプロジェクトを重複なく抽出
///
/// 一覧は新しい順なので、最初に出現したものが最新の値になる。
pub fn unique_projects(history: &[Report]) -> Vec<&Report> {
    let mut seen = std::collections::HashSet::new();
    history
        .iter()
        .filter(|r| !r.project_name.is_empty())
        .filter(|r| seen.insert(r.project_name.as_str()))
        .collect()
}

/// 未入力の必須項目（表示名）
pub fn missing_required_fields(report: &Report) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if report.project_name.trim().is_empty() {
        missing.push("Project");
    }
    if report.date.trim().is_empty() {
        missing.push("Date");
    }
    if report.inspector_name.trim().is_empty() {
        missing.push("Inspector Name");
    }
    missing
}

/// 確定前の検証
pub fn validate_draft(report: &Report) -> Result<()> {
    let missing = missing_required_fields(report);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ReporterError::Validation { missing })
    }
}

/// ドラフトの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftMode {
    New,
    Edit,
}

/// 直接編集できるテキスト項目（天候・画像・署名は専用の操作で変更する）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Date,
    TimeRange,
    ProjectName,
    JobId,
    OwnerDeveloper,
    ProjectAddress,
    StageOfConstruction,
    ProjectType,
    InspectionType,
    VisualInspectionIssue,
    InspectorName,
    InspectorPhone,
    InspectorEmail,
    GeneralComments,
}

/// コメント整形の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefineOutcome {
    Refined,
    /// コメントが空なので呼び出していない
    Skipped,
    /// サービス失敗。コメントは元のまま
    Unavailable(String),
}

/// 確定結果
#[derive(Debug, Clone)]
pub struct CommitOutcome {
    pub report: Report,
    /// 保存後すぐにPDF出力するか
    pub export_requested: bool,
}

/// 入力中のドラフト
#[derive(Debug, Clone)]
pub struct FormSession {
    draft: Report,
    mode: DraftMode,
    weather_condition: String,
    weather_temperature: String,
}

impl FormSession {
    /// 新規ドラフト（ID・作成日時・日付は現在時刻から）
    pub fn new_report(report_type: ReportType, profile: &InspectorProfile) -> Self {
        Self::new_report_with(
            report_type,
            profile,
            uuid::Uuid::new_v4().to_string(),
            chrono::Local::now().format("%Y-%m-%d").to_string(),
            chrono::Utc::now().timestamp_millis(),
        )
    }

    pub fn new_report_with(
        report_type: ReportType,
        profile: &InspectorProfile,
        id: String,
        today: String,
        created_at: i64,
    ) -> Self {
        let draft = Report {
            id,
            report_type,
            date: today,
            inspector_name: profile.name.clone(),
            inspector_phone: profile.phone.clone(),
            inspector_email: profile.email.clone(),
            status: ReportStatus::Completed,
            created_at,
            ..Default::default()
        };

        Self {
            draft,
            mode: DraftMode::New,
            weather_condition: String::new(),
            weather_temperature: String::new(),
        }
    }

    /// 既存レポートの編集（そのまま複製）
    pub fn edit(report: &Report) -> Self {
        let (weather_condition, weather_temperature) = if report.weather.is_empty() {
            (String::new(), String::new())
        } else {
            parse_weather(&report.weather)
        };

        Self {
            draft: report.clone(),
            mode: DraftMode::Edit,
            weather_condition,
            weather_temperature,
        }
    }

    pub fn draft(&self) -> &Report {
        &self.draft
    }

    pub fn mode(&self) -> DraftMode {
        self.mode
    }

    pub fn weather_condition(&self) -> &str {
        &self.weather_condition
    }

    pub fn weather_temperature(&self) -> &str {
        &self.weather_temperature
    }

    pub fn set_text(&mut self, field: TextField, value: impl Into<String>) {
        let value = value.into();
        let d = &mut self.draft;
        let target = match field {
            TextField::Date => &mut d.date,
            TextField::TimeRange => &mut d.time_range,
            TextField::ProjectName => &mut d.project_name,
            TextField::JobId => &mut d.job_id,
            TextField::OwnerDeveloper => &mut d.owner_developer,
            TextField::ProjectAddress => &mut d.project_address,
            TextField::StageOfConstruction => &mut d.stage_of_construction,
            TextField::ProjectType => &mut d.project_type,
            TextField::InspectionType => &mut d.inspection_type,
            TextField::VisualInspectionIssue => &mut d.visual_inspection_issue,
            TextField::InspectorName => &mut d.inspector_name,
            TextField::InspectorPhone => &mut d.inspector_phone,
            TextField::InspectorEmail => &mut d.inspector_email,
            TextField::GeneralComments => &mut d.general_comments,
        };
        *target = value;
    }

    pub fn set_photos_taken(&mut self, taken: bool) {
        self.draft.photos_taken = taken;
    }

    pub fn set_status(&mut self, status: ReportStatus) {
        self.draft.status = status;
    }

    pub fn set_weather_condition(&mut self, condition: impl Into<String>) {
        self.weather_condition = condition.into();
        self.recompose_weather();
    }

    pub fn set_weather_temperature(&mut self, temperature: impl Into<String>) {
        self.weather_temperature = temperature.into();
        self.recompose_weather();
    }

    fn recompose_weather(&mut self) {
        // 両方空のときは保存値を書き換えない
        if !self.weather_condition.is_empty() || !self.weather_temperature.is_empty() {
            self.draft.weather = compose_weather(&self.weather_condition, &self.weather_temperature);
        }
    }

    /// 過去レポートのプロジェクト情報で上書き（検査員・コメント・画像・署名は触らない）
    pub fn apply_project(&mut self, source: &Report) {
        self.draft.project_name = source.project_name.clone();
        self.draft.job_id = source.job_id.clone();
        self.draft.owner_developer = source.owner_developer.clone();
        self.draft.project_address = source.project_address.clone();
        self.draft.project_type = source.project_type.clone();
        self.draft.stage_of_construction = source.stage_of_construction.clone();
    }

    /// 履歴から名前でプロジェクトを選んで適用。見つからなければfalse
    pub fn quick_fill(&mut self, history: &[Report], project_name: &str) -> bool {
        let found = unique_projects(history)
            .into_iter()
            .find(|r| r.project_name == project_name)
            .cloned();
        match found {
            Some(source) => {
                self.apply_project(&source);
                true
            }
            None => false,
        }
    }

    /// コメント末尾に段落区切りを追加
    pub fn insert_paragraph(&mut self) {
        self.draft.general_comments.push_str("\n\n");
    }

    /// コメントを外部サービスで整形（失敗時は元の文章のまま）
    pub async fn refine_comments<R: Refiner>(&mut self, refiner: &R) -> RefineOutcome {
        if self.draft.general_comments.trim().is_empty() {
            return RefineOutcome::Skipped;
        }

        match refiner.refine(&self.draft.general_comments).await {
            Ok(refined) => {
                self.draft.general_comments = refined;
                RefineOutcome::Refined
            }
            Err(e) => {
                log::warn!("refine failed, keeping original comments: {}", e);
                RefineOutcome::Unavailable(e.to_string())
            }
        }
    }

    /// 画像をまとめて添付（全件デコード成功時のみ、選択順で追加）
    pub async fn attach_images(&mut self, paths: &[PathBuf]) -> Result<usize> {
        let images = load_image_batch(paths).await?;
        let count = images.len();
        self.draft.images.extend(images);
        Ok(count)
    }

    /// 添付を位置で削除。以降の添付は前に詰まる
    pub fn remove_image(&mut self, index: usize) -> Result<String> {
        let len = self.draft.images.len();
        if index >= len {
            return Err(ReporterError::AttachmentIndex { index, len });
        }
        Ok(self.draft.images.remove(index))
    }

    /// 署名の確定（署名パッドのポインタアップに相当）
    pub fn set_signature(&mut self, data_url: impl Into<String>) {
        self.draft.signature = data_url.into();
    }

    pub fn clear_signature(&mut self) {
        self.draft.signature.clear();
    }

    pub fn validate(&self) -> Result<()> {
        validate_draft(&self.draft)
    }

    /// ドラフトを一覧に確定して保存
    ///
    /// 同じIDの既存レポートは取り除かれ、先頭に入る。
    /// 検証・保存に失敗した場合、一覧もドラフトも変更しない。
    pub fn commit<S: KeyValueStore>(
        &self,
        collection: &mut ReportCollection,
        store: &mut ReportStore<S>,
        export: bool,
    ) -> Result<CommitOutcome> {
        self.validate()?;

        let mut updated = collection.clone();
        updated.upsert_front(self.draft.clone());
        store.save_reports(&updated)?;
        *collection = updated;

        log::info!("committed report {} ({:?})", self.draft.id, self.mode);
        Ok(CommitOutcome {
            report: self.draft.clone(),
            export_requested: export,
        })
    }
}
