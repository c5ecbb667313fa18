use crate::ai_provider::AiProvider;
use crate::error::{ReporterError, Result};
use crate::imaging::image_bytes_to_data_url;
use crate::session::{FormSession, TextField, WEATHER_OPTIONS};
use clap::{Args, Parser, Subcommand, ValueEnum};
use field_report_common::{Report, ReportStatus};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "field-reporter")]
#[command(about = "Construction field inspection reports with PDF export", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// コメント整形に使うAIプロバイダ（設定ファイルより優先）
    #[arg(long, global = true)]
    pub ai_provider: Option<AiProvider>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// レポート一覧（ダッシュボード）
    List {
        /// プロジェクト名・検査員名・住所で絞り込み
        #[arg(short, long)]
        query: Option<String>,

        /// 新しい順にN件だけ表示
        #[arg(short, long)]
        recent: Option<usize>,
    },

    /// レポートの内容を表示
    Show {
        #[arg(required = true)]
        id: String,
    },

    /// 新規レポートを作成
    New {
        #[command(flatten)]
        draft: DraftArgs,
    },

    /// 既存レポートを編集
    Edit {
        #[arg(required = true)]
        id: String,

        #[command(flatten)]
        draft: DraftArgs,
    },

    /// レポートを削除
    Delete {
        #[arg(required = true)]
        id: String,

        /// 確認を省略
        #[arg(short, long)]
        yes: bool,
    },

    /// PDFを書き出し
    Export {
        #[arg(required = true)]
        id: String,

        /// 出力ディレクトリ（デフォルト: 設定のoutput_dir）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 書き出しと同じページを描画（PDFは作らない）
    Preview {
        #[arg(required = true)]
        id: String,

        /// ページ画像（PNG）の保存先
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 検査員設定（新規レポートの既定値）
    Profile {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        phone: Option<String>,
    },

    /// 設定を表示/編集
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        #[arg(long)]
        data_dir: Option<PathBuf>,

        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// 既定のAIプロバイダ
        #[arg(long)]
        provider: Option<AiProvider>,

        /// コメント整形のタイムアウト（秒）
        #[arg(long)]
        refine_timeout: Option<u64>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    Draft,
    Completed,
}

impl From<StatusArg> for ReportStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Draft => ReportStatus::Draft,
            StatusArg::Completed => ReportStatus::Completed,
        }
    }
}

/// ドラフトへの入力（新規・編集共通）
#[derive(Args, Debug, Clone, Default)]
pub struct DraftArgs {
    /// 過去レポートのプロジェクト情報を流用（プロジェクト名）
    #[arg(long)]
    pub from_project: Option<String>,

    #[arg(long)]
    pub project: Option<String>,

    #[arg(long)]
    pub job_id: Option<String>,

    #[arg(long)]
    pub owner: Option<String>,

    #[arg(long)]
    pub address: Option<String>,

    #[arg(long)]
    pub stage: Option<String>,

    #[arg(long)]
    pub project_type: Option<String>,

    #[arg(long)]
    pub inspection_type: Option<String>,

    /// 検査日 (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<String>,

    /// 例: "10:30AM to 1:30PM"
    #[arg(long)]
    pub time_range: Option<String>,

    /// 天候 (Sunny, Partly Cloudy, Windy など)
    #[arg(long, value_parser = parse_weather_condition)]
    pub weather_condition: Option<String>,

    /// 気温（°F、数値のみ）
    #[arg(long)]
    pub temperature: Option<String>,

    #[arg(long)]
    pub photos_taken: Option<bool>,

    #[arg(long)]
    pub visual_issue: Option<String>,

    #[arg(long)]
    pub inspector_name: Option<String>,

    #[arg(long)]
    pub inspector_phone: Option<String>,

    #[arg(long)]
    pub inspector_email: Option<String>,

    /// コメント本文（段落は空行で区切る）
    #[arg(long, conflicts_with = "comments_file")]
    pub comments: Option<String>,

    /// コメント本文をファイルから読み込み
    #[arg(long)]
    pub comments_file: Option<PathBuf>,

    /// コメント末尾に段落を追加
    #[arg(long = "append-paragraph")]
    pub append_paragraphs: Vec<String>,

    /// 添付画像（複数指定可、指定順に追加）
    #[arg(long = "image")]
    pub images: Vec<PathBuf>,

    /// 添付を削除（1始まりの番号、複数指定可）
    #[arg(long = "remove-image")]
    pub remove_images: Vec<usize>,

    /// 署名画像
    #[arg(long, conflicts_with = "clear_signature")]
    pub signature: Option<PathBuf>,

    #[arg(long)]
    pub clear_signature: bool,

    #[arg(long)]
    pub status: Option<StatusArg>,

    /// コメントをAIで整形
    #[arg(long)]
    pub refine: bool,

    /// 保存後すぐにPDFを書き出す
    #[arg(long)]
    pub export: bool,
}

/// 天候を選択肢と照合し、選択肢どおりの表記で返す
fn parse_weather_condition(value: &str) -> std::result::Result<String, String> {
    WEATHER_OPTIONS
        .iter()
        .find(|option| option.eq_ignore_ascii_case(value.trim()))
        .map(|option| option.to_string())
        .ok_or_else(|| format!("expected one of: {}", WEATHER_OPTIONS.join(", ")))
}

impl DraftArgs {
    /// 入力をドラフトに反映（コメント整形は呼び出し側で行う）
    pub async fn apply(&self, session: &mut FormSession, history: &[Report]) -> Result<()> {
        if let Some(project) = &self.from_project {
            if !session.quick_fill(history, project) {
                return Err(ReporterError::ReportNotFound(format!("project '{}'", project)));
            }
        }

        let texts = [
            (TextField::ProjectName, &self.project),
            (TextField::JobId, &self.job_id),
            (TextField::OwnerDeveloper, &self.owner),
            (TextField::ProjectAddress, &self.address),
            (TextField::StageOfConstruction, &self.stage),
            (TextField::ProjectType, &self.project_type),
            (TextField::InspectionType, &self.inspection_type),
            (TextField::Date, &self.date),
            (TextField::TimeRange, &self.time_range),
            (TextField::VisualInspectionIssue, &self.visual_issue),
            (TextField::InspectorName, &self.inspector_name),
            (TextField::InspectorPhone, &self.inspector_phone),
            (TextField::InspectorEmail, &self.inspector_email),
            (TextField::GeneralComments, &self.comments),
        ];
        for (field, value) in texts {
            if let Some(value) = value {
                session.set_text(field, value.as_str());
            }
        }

        if let Some(path) = &self.comments_file {
            let comments = tokio::fs::read_to_string(path).await?;
            session.set_text(TextField::GeneralComments, comments);
        }
        for paragraph in &self.append_paragraphs {
            if !session.draft().general_comments.trim().is_empty() {
                session.insert_paragraph();
            }
            let mut comments = session.draft().general_comments.clone();
            comments.push_str(paragraph);
            session.set_text(TextField::GeneralComments, comments);
        }

        if let Some(condition) = &self.weather_condition {
            session.set_weather_condition(condition.as_str());
        }
        if let Some(temperature) = &self.temperature {
            session.set_weather_temperature(temperature.as_str());
        }
        if let Some(taken) = self.photos_taken {
            session.set_photos_taken(taken);
        }
        if let Some(status) = self.status {
            session.set_status(status.into());
        }

        // 後ろから削除して番号のずれを防ぐ
        let mut removals = self.remove_images.clone();
        removals.sort_unstable_by(|a, b| b.cmp(a));
        removals.dedup();
        for number in removals {
            let index = number.checked_sub(1).ok_or(ReporterError::AttachmentIndex {
                index: 0,
                len: session.draft().images.len(),
            })?;
            session.remove_image(index)?;
        }
        if !self.images.is_empty() {
            session.attach_images(&self.images).await?;
        }

        if self.clear_signature {
            session.clear_signature();
        }
        if let Some(path) = &self.signature {
            let bytes = tokio::fs::read(path).await?;
            session.set_signature(image_bytes_to_data_url(&bytes)?);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use field_report_common::{InspectorProfile, ReportType};

    fn session() -> FormSession {
        FormSession::new_report_with(
            ReportType::FieldInspection,
            &InspectorProfile::default(),
            "draft-1".to_string(),
            "2025-01-10".to_string(),
            0,
        )
    }

    #[test]
    fn test_parse_new_command() {
        let cli = Cli::parse_from([
            "field-reporter",
            "new",
            "--project",
            "Main St",
            "--image",
            "a.png",
            "--image",
            "b.png",
            "--photos-taken",
            "false",
            "--export",
        ]);
        match cli.command {
            Commands::New { draft } => {
                assert_eq!(draft.project.as_deref(), Some("Main St"));
                assert_eq!(draft.images, vec![PathBuf::from("a.png"), PathBuf::from("b.png")]);
                assert_eq!(draft.photos_taken, Some(false));
                assert!(draft.export);
            }
            _ => panic!("newコマンドとして解析されない"),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["field-reporter", "delete", "r1", "--yes", "-v", "--ai-provider", "gemini"]);
        assert!(cli.verbose);
        assert_eq!(cli.ai_provider, Some(AiProvider::Gemini));
        assert!(matches!(cli.command, Commands::Delete { yes: true, .. }));
    }

    #[test]
    fn test_weather_condition_must_be_a_known_option() {
        let cli = Cli::parse_from(["field-reporter", "new", "--weather-condition", "partly cloudy"]);
        match cli.command {
            Commands::New { draft } => {
                assert_eq!(draft.weather_condition.as_deref(), Some("Partly Cloudy"));
            }
            _ => panic!("newコマンドとして解析されない"),
        }

        let err = Cli::try_parse_from(["field-reporter", "new", "--weather-condition", "Hail"]).unwrap_err();
        assert!(err.to_string().contains("Windy"));
    }

    #[tokio::test]
    async fn test_apply_fields_and_weather() {
        let mut session = session();
        let args = DraftArgs {
            project: Some("Main St".into()),
            inspector_name: Some("A. Smith".into()),
            weather_condition: Some("Windy".into()),
            temperature: Some("63".into()),
            comments: Some("First.".into()),
            append_paragraphs: vec!["Second.".into()],
            status: Some(StatusArg::Draft),
            ..Default::default()
        };
        args.apply(&mut session, &[]).await.unwrap();

        let draft = session.draft();
        assert_eq!(draft.project_name, "Main St");
        assert_eq!(draft.weather, "Windy / 63 F");
        assert_eq!(draft.general_comments, "First.\n\nSecond.");
        assert_eq!(draft.status, ReportStatus::Draft);
        assert!(session.validate().is_ok());
    }

    #[tokio::test]
    async fn test_apply_unknown_project_fails() {
        let mut session = session();
        let args = DraftArgs {
            from_project: Some("Nowhere".into()),
            ..Default::default()
        };
        assert!(matches!(
            args.apply(&mut session, &[]).await,
            Err(ReporterError::ReportNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_apply_removes_images_by_number() {
        let mut session = FormSession::edit(&Report {
            images: vec!["a".into(), "b".into(), "c".into()],
            ..Default::default()
        });
        let args = DraftArgs {
            remove_images: vec![1, 3],
            ..Default::default()
        };
        args.apply(&mut session, &[]).await.unwrap();
        assert_eq!(session.draft().images, vec!["b".to_string()]);

        let zero = DraftArgs {
            remove_images: vec![0],
            ..Default::default()
        };
        assert!(zero.apply(&mut session, &[]).await.is_err());
    }
}
