//! アプリケーション制御
//!
//! 起動時にレポート一覧を読み込み、表示中の画面・確定・削除・書き出しを仲介する。

use crate::error::{ReporterError, Result};
use crate::export::{ExportEngine, ExportedPdf, RenderedDocument};
use crate::session::{FormSession, ProfileForm};
use crate::storage::{KeyValueStore, ReportStore};
use chrono::Datelike;
use field_report_common::{InspectorProfile, Report, ReportCollection, ReportType};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// 表示中の画面
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Dashboard,
    Viewing(String),
    Creating,
    Editing(String),
    Settings,
}

/// ダッシュボードの集計
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardStats {
    pub total: usize,
    /// プロジェクト名の種類数
    pub projects: usize,
    pub this_month: usize,
}

/// 確定の結果
#[derive(Debug)]
pub struct Committed {
    pub report: Report,
    /// 書き出しを要求した場合のみSome。失敗しても保存は取り消さない
    pub export: Option<Result<ExportedPdf>>,
}

pub struct App<S: KeyValueStore> {
    store: ReportStore<S>,
    reports: ReportCollection,
    view: View,
    engine: ExportEngine,
    output_dir: PathBuf,
}

impl<S: KeyValueStore> App<S> {
    /// ストアから一覧を読み込んで起動（ダッシュボード表示）
    pub fn hydrate(mut store: ReportStore<S>, engine: ExportEngine, output_dir: impl Into<PathBuf>) -> Result<Self> {
        let reports = store.load_reports()?;
        log::debug!("hydrated {} report(s)", reports.len());
        Ok(Self {
            store,
            reports,
            view: View::Dashboard,
            engine,
            output_dir: output_dir.into(),
        })
    }

    pub fn reports(&self) -> &ReportCollection {
        &self.reports
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn store(&self) -> &ReportStore<S> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ReportStore<S> {
        &mut self.store
    }

    pub fn engine(&self) -> &ExportEngine {
        &self.engine
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// 表示中のレポート
    pub fn selected(&self) -> Option<&Report> {
        match &self.view {
            View::Viewing(id) | View::Editing(id) => self.reports.get(id),
            _ => None,
        }
    }

    pub fn report(&self, id: &str) -> Result<&Report> {
        self.reports
            .get(id)
            .ok_or_else(|| ReporterError::ReportNotFound(id.to_string()))
    }

    /// 設定画面を開き、保存済みの検査員設定を入力欄に読み込む
    pub fn open_settings(&mut self) -> Result<ProfileForm> {
        let form = ProfileForm::load(&self.store)?;
        self.view = View::Settings;
        Ok(form)
    }

    /// 検査員設定を保存（入力欄はクリアされる）
    pub fn save_settings(&mut self, form: &mut ProfileForm) -> Result<InspectorProfile> {
        form.save(&mut self.store)
    }

    pub fn open(&mut self, id: &str) -> Result<&Report> {
        self.report(id)?;
        self.view = View::Viewing(id.to_string());
        self.report(id)
    }

    /// 新規作成（検査員欄は保存済みの設定から）
    pub fn create_session(&mut self, report_type: ReportType) -> Result<FormSession> {
        let profile = self.store.load_profile()?;
        self.view = View::Creating;
        Ok(FormSession::new_report(report_type, &profile))
    }

    pub fn edit_session(&mut self, id: &str) -> Result<FormSession> {
        let session = FormSession::edit(self.report(id)?);
        self.view = View::Editing(id.to_string());
        Ok(session)
    }

    /// ドラフトを確定して表示画面へ。`export`なら保存成功後にPDFを書き出す
    pub async fn commit(&mut self, session: &FormSession, export: bool) -> Result<Committed> {
        let outcome = session.commit(&mut self.reports, &mut self.store, export)?;
        self.view = View::Viewing(outcome.report.id.clone());

        let export = if outcome.export_requested {
            Some(self.engine.export(&outcome.report, &self.output_dir).await)
        } else {
            None
        };

        Ok(Committed {
            report: outcome.report,
            export,
        })
    }

    /// 確認の上で削除し、ダッシュボードに戻る
    ///
    /// `confirm`がfalseなら何も変更せずOk(false)。確認自体の失敗もそのまま返す。
    pub fn delete<F>(&mut self, id: &str, confirm: F) -> Result<bool>
    where
        F: FnOnce(&Report) -> Result<bool>,
    {
        if !confirm(self.report(id)?)? {
            return Ok(false);
        }

        let mut updated = self.reports.clone();
        updated.remove(id);
        self.store.save_reports(&updated)?;
        self.reports = updated;
        self.view = View::Dashboard;

        log::info!("deleted report {}", id);
        Ok(true)
    }

    pub async fn export(&self, id: &str) -> Result<ExportedPdf> {
        self.engine.export(self.report(id)?, &self.output_dir).await
    }

    pub async fn preview(&self, id: &str) -> Result<RenderedDocument> {
        self.engine.preview(self.report(id)?).await
    }

    pub fn search(&self, query: &str) -> Vec<&Report> {
        self.reports.search(query)
    }

    pub fn stats(&self) -> DashboardStats {
        let today = chrono::Local::now();
        self.stats_for(today.year(), today.month())
    }

    pub fn stats_for(&self, year: i32, month: u32) -> DashboardStats {
        DashboardStats {
            total: self.reports.len(),
            projects: self
                .reports
                .iter()
                .map(|r| r.project_name.as_str())
                .collect::<HashSet<_>>()
                .len(),
            this_month: self.reports.count_in_month(year, month),
        }
    }
}
