//! レポートの型定義
//!
//! CLIとエクスポートで共有される型:
//! - Report: 現場検査レポート本体（ブラウザ版の保存形式とキー互換）
//! - InspectorProfile: 新規レポートに差し込む検査員の既定値
//! - ReportCollection: 新しい順に並んだレポート一覧

use crate::error::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Job IDの既定値
pub const DEFAULT_JOB_ID: &str = "N/A";
/// 目視検査不可理由の既定値
pub const DEFAULT_VISUAL_INSPECTION_ISSUE: &str = "N/A";
/// 検査種別の既定値
pub const DEFAULT_INSPECTION_TYPE: &str = "Field Inspection";

/// レポート種別（現状は現場検査のみ）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportType {
    #[default]
    #[serde(rename = "Field Inspection Report")]
    FieldInspection,
}

impl ReportType {
    pub fn label(&self) -> &'static str {
        match self {
            ReportType::FieldInspection => "Field Inspection Report",
        }
    }
}

/// レポートの状態
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportStatus {
    Draft,
    #[default]
    Completed,
}

/// 現場検査レポート
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Report {
    /// 作成時に一度だけ採番される
    pub id: String,

    #[serde(rename = "type")]
    pub report_type: ReportType,

    /// 検査日（YYYY-MM-DD）
    pub date: String,
    /// 検査時間帯（例: "10:30AM to 1:30PM"）
    pub time_range: String,

    pub project_name: String,
    pub job_id: String,
    pub owner_developer: String,
    pub project_address: String,
    pub stage_of_construction: String,
    pub project_type: String,
    pub inspection_type: String,

    /// "<天候> / <気温> F" 形式の合成値
    pub weather: String,

    pub photos_taken: bool,
    pub visual_inspection_issue: String,

    pub inspector_name: String,
    pub inspector_phone: String,
    pub inspector_email: String,
    /// 署名画像のdata URL（空なら未署名）
    pub signature: String,

    /// 空行区切りの段落。PDFのブロック分割に使われる
    pub general_comments: String,
    /// 添付画像のdata URL（順序 = 添付番号）
    pub images: Vec<String>,

    pub status: ReportStatus,
    /// 作成時刻（epochミリ秒）。編集では更新しない
    pub created_at: i64,
}

impl Default for Report {
    fn default() -> Self {
        Self {
            id: String::new(),
            report_type: ReportType::FieldInspection,
            date: String::new(),
            time_range: String::new(),
            project_name: String::new(),
            job_id: DEFAULT_JOB_ID.to_string(),
            owner_developer: String::new(),
            project_address: String::new(),
            stage_of_construction: String::new(),
            project_type: String::new(),
            inspection_type: DEFAULT_INSPECTION_TYPE.to_string(),
            weather: String::new(),
            photos_taken: true,
            visual_inspection_issue: DEFAULT_VISUAL_INSPECTION_ISSUE.to_string(),
            inspector_name: String::new(),
            inspector_phone: String::new(),
            inspector_email: String::new(),
            signature: String::new(),
            general_comments: String::new(),
            images: Vec::new(),
            status: ReportStatus::Completed,
            created_at: 0,
        }
    }
}

impl Report {
    /// 表示用の日付（MM/DD/YYYY）
    pub fn formatted_date(&self) -> String {
        format_date(&self.date)
    }

    /// コメント段落（保存値は変更しない）
    pub fn comment_paragraphs(&self) -> Vec<String> {
        comment_paragraphs(&self.general_comments)
    }

    pub fn is_signed(&self) -> bool {
        !self.signature.is_empty()
    }
}

/// 日付表示変換: "2025-04-21" → "04/21/2025"
///
/// 空文字は空文字のまま。3要素に分割できない値は変換しない。
pub fn format_date(date: &str) -> String {
    if date.is_empty() {
        return String::new();
    }
    let parts: Vec<&str> = date.split('-').collect();
    match parts.as_slice() {
        [year, month, day] => format!("{}/{}/{}", month, day, year),
        _ => date.to_string(),
    }
}

/// コメントを空行区切りで段落に分割
pub fn comment_paragraphs(text: &str) -> Vec<String> {
    lazy_static::lazy_static! {
        // 2つ以上の改行を含む空白の連続
        static ref PARAGRAPH_BREAK: Regex = Regex::new(r"\n\s*\n").unwrap();
    }

    PARAGRAPH_BREAK
        .split(text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// 検査員の既定値（新規レポート作成時のみ使用）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectorProfile {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl InspectorProfile {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.email.is_empty() && self.phone.is_empty()
    }
}

/// レポート一覧（先頭が最新）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportCollection {
    reports: Vec<Report>,
}

impl ReportCollection {
    pub fn new(reports: Vec<Report>) -> Self {
        Self { reports }
    }

    /// 保存値（JSON配列）から復元
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// 保存用のJSON配列に変換
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Report> {
        self.reports.iter()
    }

    pub fn as_slice(&self) -> &[Report] {
        &self.reports
    }

    pub fn get(&self, id: &str) -> Option<&Report> {
        self.reports.iter().find(|r| r.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// 同じIDの既存エントリを除いてから先頭に挿入
    pub fn upsert_front(&mut self, report: Report) {
        self.reports.retain(|r| r.id != report.id);
        self.reports.insert(0, report);
    }

    /// IDで削除。見つからなければNone
    pub fn remove(&mut self, id: &str) -> Option<Report> {
        let index = self.reports.iter().position(|r| r.id == id)?;
        Some(self.reports.remove(index))
    }

    /// プロジェクト名・検査員名・住所の部分一致検索（大文字小文字を区別しない）
    pub fn search(&self, query: &str) -> Vec<&Report> {
        let needle = query.to_lowercase();
        self.reports
            .iter()
            .filter(|r| {
                r.project_name.to_lowercase().contains(&needle)
                    || r.inspector_name.to_lowercase().contains(&needle)
                    || r.project_address.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// 先頭からn件
    pub fn recent(&self, n: usize) -> &[Report] {
        &self.reports[..n.min(self.reports.len())]
    }

    /// 指定月に検査日があるレポート数
    pub fn count_in_month(&self, year: i32, month: u32) -> usize {
        let prefix = format!("{:04}-{:02}-", year, month);
        self.reports
            .iter()
            .filter(|r| r.date.starts_with(&prefix))
            .count()
    }
}

impl<'a> IntoIterator for &'a ReportCollection {
    type Item = &'a Report;
    type IntoIter = std::slice::Iter<'a, Report>;

    fn into_iter(self) -> Self::IntoIter {
        self.reports.iter()
    }
}

impl From<Vec<Report>> for ReportCollection {
    fn from(reports: Vec<Report>) -> Self {
        Self::new(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(id: &str, project: &str) -> Report {
        Report {
            id: id.to_string(),
            project_name: project.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2025-04-21"), "04/21/2025");
        assert_eq!(format_date(""), "");
        assert_eq!(format_date("April 21"), "April 21");
    }

    #[test]
    fn test_comment_paragraphs_split() {
        let text = "First line.\n\nSecond line.\n  \n\nThird line.";
        assert_eq!(
            comment_paragraphs(text),
            vec!["First line.", "Second line.", "Third line."]
        );
    }

    #[test]
    fn test_comment_paragraphs_single_newline_kept() {
        let text = "Line one\nstill one\n\nLine two";
        let paragraphs = comment_paragraphs(text);
        assert_eq!(paragraphs.len(), 2);
        assert_eq!(paragraphs[0], "Line one\nstill one");
    }

    #[test]
    fn test_comment_paragraphs_discard_blank() {
        assert!(comment_paragraphs("").is_empty());
        assert!(comment_paragraphs("   \n\n  \n\n").is_empty());
        assert_eq!(comment_paragraphs("\n\nOnly\n\n"), vec!["Only"]);
    }

    #[test]
    fn test_comment_paragraphs_idempotent() {
        let text = "  A  \n \n B\nb \n\n\n\n C ";
        let first = comment_paragraphs(text);
        let second = comment_paragraphs(&first.join("\n\n"));
        assert_eq!(first, second);
    }

    #[test]
    fn test_report_defaults() {
        let report = Report::default();
        assert_eq!(report.job_id, "N/A");
        assert_eq!(report.visual_inspection_issue, "N/A");
        assert_eq!(report.inspection_type, "Field Inspection");
        assert_eq!(report.status, ReportStatus::Completed);
        assert!(report.photos_taken);
        assert!(!report.is_signed());
    }

    #[test]
    fn test_report_serialize_camel_case() {
        let report = Report {
            id: "RPT-1".to_string(),
            project_name: "Main St".to_string(),
            created_at: 42,
            ..Default::default()
        };
        let json = serde_json::to_string(&report).expect("シリアライズ失敗");
        assert!(json.contains("\"projectName\":\"Main St\""));
        assert!(json.contains("\"type\":\"Field Inspection Report\""));
        assert!(json.contains("\"status\":\"Completed\""));
        assert!(json.contains("\"createdAt\":42"));
    }

    #[test]
    fn test_report_deserialize_browser_payload() {
        let json = r#"{
            "id": "abc123xyz",
            "type": "Field Inspection Report",
            "date": "2025-04-21",
            "projectName": "SPLOST II",
            "weather": "Windy / 63 F",
            "photosTaken": false,
            "images": ["data:image/png;base64,AAAA"],
            "status": "Draft",
            "createdAt": 1745251200000
        }"#;
        let report: Report = serde_json::from_str(json).expect("デシリアライズ失敗");
        assert_eq!(report.id, "abc123xyz");
        assert_eq!(report.status, ReportStatus::Draft);
        assert!(!report.photos_taken);
        assert_eq!(report.images.len(), 1);
        // 欠けているフィールドは既定値
        assert_eq!(report.job_id, "N/A");
    }

    #[test]
    fn test_collection_upsert_replaces_in_front() {
        let mut collection = ReportCollection::new(vec![
            report("a", "Alpha"),
            report("b", "Bravo"),
            report("c", "Charlie"),
        ]);
        collection.upsert_front(report("b", "Bravo v2"));

        assert_eq!(collection.len(), 3);
        assert_eq!(collection.as_slice()[0].project_name, "Bravo v2");
        assert_eq!(collection.iter().filter(|r| r.id == "b").count(), 1);
    }

    #[test]
    fn test_collection_upsert_new_id_prepends() {
        let mut collection = ReportCollection::new(vec![report("a", "Alpha")]);
        collection.upsert_front(report("z", "Zulu"));
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.as_slice()[0].id, "z");
    }

    #[test]
    fn test_collection_remove() {
        let mut collection = ReportCollection::new(vec![report("a", "Alpha"), report("b", "Bravo")]);
        assert_eq!(collection.remove("a").map(|r| r.id), Some("a".to_string()));
        assert!(collection.remove("a").is_none());
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn test_collection_search() {
        let mut first = report("a", "Main Street Sidewalk");
        first.inspector_name = "Tirth Patel".to_string();
        let mut second = report("b", "Bridge Deck");
        second.project_address = "Brockett Rd".to_string();
        let collection = ReportCollection::new(vec![first, second]);

        assert_eq!(collection.search("main").len(), 1);
        assert_eq!(collection.search("PATEL").len(), 1);
        assert_eq!(collection.search("brockett")[0].id, "b");
        assert_eq!(collection.search("").len(), 2);
        assert!(collection.search("nothing").is_empty());
    }

    #[test]
    fn test_collection_recent_and_month_count() {
        let mut reports = Vec::new();
        for (i, date) in ["2025-04-21", "2025-04-02", "2025-03-30"].iter().enumerate() {
            let mut r = report(&i.to_string(), "P");
            r.date = date.to_string();
            reports.push(r);
        }
        let collection = ReportCollection::new(reports);

        assert_eq!(collection.recent(2).len(), 2);
        assert_eq!(collection.recent(10).len(), 3);
        assert_eq!(collection.count_in_month(2025, 4), 2);
        assert_eq!(collection.count_in_month(2025, 3), 1);
        assert_eq!(collection.count_in_month(2024, 4), 0);
    }

    #[test]
    fn test_collection_json_is_plain_array() {
        let collection = ReportCollection::new(vec![report("a", "Alpha")]);
        let json = collection.to_json().expect("シリアライズ失敗");
        assert!(json.starts_with('['));

        let restored = ReportCollection::from_json(&json).expect("デシリアライズ失敗");
        assert_eq!(restored, collection);
        assert!(ReportCollection::from_json("{not json").is_err());
    }

    #[test]
    fn test_profile_empty() {
        assert!(InspectorProfile::default().is_empty());
        let profile = InspectorProfile {
            name: "A. Smith".to_string(),
            ..Default::default()
        };
        assert!(!profile.is_empty());
    }
}
