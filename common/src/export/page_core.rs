//! Page construction core shared by preview and PDF export.
//!
//! 1レポート → ページ列の決定的な対応を定義する:
//! - 1ページ目: 報告書シート（見出し + 項目表 + コメント欄）
//! - 2ページ目以降: 添付画像1枚につき1ページ（images順）

use crate::layout::{SHEET_FIELDS, SHEET_TITLE, VISUAL_INSPECTION_QUESTION};
use crate::types::Report;
use regex::Regex;

/// 項目表の値セル
#[derive(Debug, Clone, PartialEq)]
pub enum SheetValue {
    Text(String),
    /// 本体 + 右側の小セル（Project Name + Job ID）
    WithSide { main: String, side: String },
    /// 回答セル + 設問と補足
    Question {
        answer: String,
        question: &'static str,
        detail: String,
    },
    /// 署名画像。未署名なら検査員名を薄く表示
    Signature {
        image: Option<String>,
        placeholder: String,
    },
}

/// 項目表の1行
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    pub label: &'static str,
    pub value: SheetValue,
}

/// 1ページ目の構造化シート
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSheet {
    pub title: &'static str,
    pub rows: Vec<SheetRow>,
    /// 段落ごとのブロック。段落がなければ空ブロック1つ
    pub comment_blocks: Vec<String>,
}

/// ページの中身
#[derive(Debug, Clone, PartialEq)]
pub enum PageContent {
    Sheet(ReportSheet),
    Attachment {
        /// 1始まりの添付番号
        number: usize,
        label: String,
        /// 画像のdata URL
        image: String,
    },
}

/// 論理ページ記述
#[derive(Debug, Clone, PartialEq)]
pub struct PageSpec {
    /// 0始まりのページ位置
    pub index: usize,
    pub content: PageContent,
}

impl PageSpec {
    pub fn label(&self) -> String {
        match &self.content {
            PageContent::Sheet(sheet) => sheet.title.to_string(),
            PageContent::Attachment { label, .. } => label.clone(),
        }
    }
}

/// 添付ページのラベル
pub fn attachment_label(number: usize) -> String {
    format!("Attachment #{}", number)
}

/// 報告書シートを構築
pub fn build_report_sheet(report: &Report) -> ReportSheet {
    let rows = SHEET_FIELDS
        .iter()
        .map(|field| SheetRow {
            label: field.label,
            value: sheet_value(report, field.key),
        })
        .collect();

    let mut comment_blocks = report.comment_paragraphs();
    if comment_blocks.is_empty() {
        comment_blocks.push(String::new());
    }

    ReportSheet {
        title: SHEET_TITLE,
        rows,
        comment_blocks,
    }
}

fn sheet_value(report: &Report, key: &str) -> SheetValue {
    match key {
        "dateTime" => SheetValue::Text(format!(
            "{} – {}",
            report.formatted_date(),
            report.time_range
        )),
        "projectName" => SheetValue::WithSide {
            main: report.project_name.clone(),
            side: report.job_id.clone(),
        },
        "ownerDeveloper" => SheetValue::Text(report.owner_developer.clone()),
        "projectAddress" => SheetValue::Text(report.project_address.clone()),
        "stageOfConstruction" => SheetValue::Text(report.stage_of_construction.clone()),
        "projectType" => SheetValue::Text(report.project_type.clone()),
        "inspectionType" => SheetValue::Text(report.inspection_type.clone()),
        "weather" => SheetValue::Text(report.weather.clone()),
        "photosTaken" => SheetValue::Question {
            answer: if report.photos_taken { "Yes" } else { "No" }.to_string(),
            question: VISUAL_INSPECTION_QUESTION,
            detail: report.visual_inspection_issue.clone(),
        },
        "inspectorName" => SheetValue::Text(report.inspector_name.clone()),
        "inspectorContact" => SheetValue::Text(format!(
            "PH: {}    Email: {}",
            report.inspector_phone, report.inspector_email
        )),
        "signature" => SheetValue::Signature {
            image: if report.is_signed() {
                Some(report.signature.clone())
            } else {
                None
            },
            placeholder: report.inspector_name.clone(),
        },
        _ => SheetValue::Text(String::new()),
    }
}

/// ページ列を構築（シート1枚 + 添付N枚）
pub fn build_pages(report: &Report) -> Vec<PageSpec> {
    let mut pages = Vec::with_capacity(report.images.len() + 1);
    pages.push(PageSpec {
        index: 0,
        content: PageContent::Sheet(build_report_sheet(report)),
    });

    for (i, image) in report.images.iter().enumerate() {
        pages.push(PageSpec {
            index: i + 1,
            content: PageContent::Attachment {
                number: i + 1,
                label: attachment_label(i + 1),
                image: image.clone(),
            },
        });
    }

    pages
}

/// 出力ファイル名: "<プロジェクト名（空白→_）>_<日付>_Report.pdf"
///
/// パス区切りやファイル名に使えない文字も`_`にする（1ファイル名に収める）
pub fn export_file_name(report: &Report) -> String {
    lazy_static::lazy_static! {
        static ref UNSAFE_RUN: Regex = Regex::new(r#"[\s/\\:*?"<>|]+"#).unwrap();
    }

    let project = UNSAFE_RUN.replace_all(&report.project_name, "_");
    let date = UNSAFE_RUN.replace_all(&report.date, "_");
    format!("{}_{}_Report.pdf", project, date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> Report {
        Report {
            id: "RPT-1".to_string(),
            date: "2025-04-21".to_string(),
            time_range: "10:30AM to 1:30PM".to_string(),
            project_name: "Main St".to_string(),
            inspector_name: "A. Smith".to_string(),
            inspector_phone: "555-0100".to_string(),
            inspector_email: "a@example.com".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_pages_without_images() {
        let pages = build_pages(&sample_report());
        assert_eq!(pages.len(), 1);
        assert!(matches!(pages[0].content, PageContent::Sheet(_)));
        assert_eq!(pages[0].label(), "Field Inspection Report");
    }

    #[test]
    fn test_pages_with_images_in_order() {
        let mut report = sample_report();
        report.images = vec!["img-a".to_string(), "img-b".to_string(), "img-c".to_string()];
        let pages = build_pages(&report);

        assert_eq!(pages.len(), 4);
        for (i, page) in pages.iter().skip(1).enumerate() {
            assert_eq!(page.index, i + 1);
            match &page.content {
                PageContent::Attachment { number, label, image } => {
                    assert_eq!(*number, i + 1);
                    assert_eq!(label, &format!("Attachment #{}", i + 1));
                    assert_eq!(image, &report.images[i]);
                }
                other => panic!("添付ページではない: {:?}", other),
            }
        }
    }

    #[test]
    fn test_sheet_rows_follow_field_order() {
        let sheet = build_report_sheet(&sample_report());
        let labels: Vec<&str> = sheet.rows.iter().map(|r| r.label).collect();
        let expected: Vec<&str> = SHEET_FIELDS.iter().map(|f| f.label).collect();
        assert_eq!(labels, expected);

        assert_eq!(
            sheet.rows[0].value,
            SheetValue::Text("04/21/2025 – 10:30AM to 1:30PM".to_string())
        );
        assert_eq!(
            sheet.rows[1].value,
            SheetValue::WithSide {
                main: "Main St".to_string(),
                side: "N/A".to_string()
            }
        );
    }

    #[test]
    fn test_sheet_signature_placeholder() {
        let sheet = build_report_sheet(&sample_report());
        let last = sheet.rows.last().expect("行がない");
        assert_eq!(
            last.value,
            SheetValue::Signature {
                image: None,
                placeholder: "A. Smith".to_string()
            }
        );
    }

    #[test]
    fn test_comment_blocks_placeholder() {
        let sheet = build_report_sheet(&sample_report());
        assert_eq!(sheet.comment_blocks, vec![String::new()]);

        let mut report = sample_report();
        report.general_comments = "One.\n\nTwo.".to_string();
        let sheet = build_report_sheet(&report);
        assert_eq!(sheet.comment_blocks, vec!["One.", "Two."]);
    }

    #[test]
    fn test_export_file_name() {
        let mut report = sample_report();
        report.date = "2025-01-10".to_string();
        assert_eq!(export_file_name(&report), "Main_St_2025-01-10_Report.pdf");

        report.project_name = "SPLOST  II\tSidewalk".to_string();
        assert_eq!(export_file_name(&report), "SPLOST_II_Sidewalk_2025-01-10_Report.pdf");
    }

    #[test]
    fn test_export_file_name_strips_path_separators() {
        let mut report = sample_report();
        report.date = "2025-01-10".to_string();

        report.project_name = "Bldg A/B Retrofit".to_string();
        assert_eq!(export_file_name(&report), "Bldg_A_B_Retrofit_2025-01-10_Report.pdf");

        report.project_name = r#"..\Lot 7: "North" Yard?"#.to_string();
        let name = export_file_name(&report);
        assert!(!name.contains(['/', '\\', ':', '"', '?']), "{}", name);
        assert_eq!(name, ".._Lot_7_North_Yard__2025-01-10_Report.pdf");
    }
}
