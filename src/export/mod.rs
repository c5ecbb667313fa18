pub mod pdf;
pub mod raster;

use crate::error::{ReporterError, Result};
use field_report_common::{build_pages, export_file_name, PageLayout, PageSpec, Report};
use image::RgbImage;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub use pdf::assemble_pdf;
pub use raster::RasterRenderer;

/// ページ記述をビットマップに描画する
pub trait Renderer: Send + Sync {
    fn render(&self, page: &PageSpec, layout: &PageLayout) -> Result<RgbImage>;
}

/// 描画済みの1ページ
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub label: String,
    pub bitmap: RgbImage,
}

/// 描画済みのレポート（プレビュー・PDFの元）
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub file_name: String,
    pub pages: Vec<RenderedPage>,
}

impl RenderedDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.pages.iter().map(|p| p.label.as_str()).collect()
    }
}

/// 書き出したPDF
#[derive(Debug, Clone)]
pub struct ExportedPdf {
    pub path: PathBuf,
    pub page_count: usize,
}

/// 全ページを並列に描画（順序は保持）
///
/// 1ページでも失敗したら全体を失敗とする。
pub fn render_pages<R: Renderer + ?Sized>(
    pages: &[PageSpec],
    renderer: &R,
    layout: &PageLayout,
) -> Result<Vec<RenderedPage>> {
    if pages.is_empty() {
        return Err(ReporterError::NoPages);
    }

    pages
        .par_iter()
        .map(|page| -> Result<RenderedPage> {
            let bitmap = renderer.render(page, layout)?;
            Ok(RenderedPage {
                label: page.label(),
                bitmap,
            })
        })
        .collect()
}

pub fn render_document<R: Renderer + ?Sized>(
    report: &Report,
    renderer: &R,
    layout: &PageLayout,
) -> Result<RenderedDocument> {
    let pages = build_pages(report);
    log::debug!("rendering {} page(s) for {}", pages.len(), report.id);
    Ok(RenderedDocument {
        file_name: export_file_name(report),
        pages: render_pages(&pages, renderer, layout)?,
    })
}

/// 書き出し中フラグ。drop時に解除
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// プレビューとPDF書き出しの実行器
///
/// 同じエンジンでの同時実行は`ExportInProgress`で拒否する。
#[derive(Clone)]
pub struct ExportEngine {
    renderer: Arc<dyn Renderer>,
    layout: PageLayout,
    busy: Arc<AtomicBool>,
}

impl Default for ExportEngine {
    fn default() -> Self {
        Self::new(Arc::new(RasterRenderer))
    }
}

impl ExportEngine {
    pub fn new(renderer: Arc<dyn Renderer>) -> Self {
        Self::with_layout(renderer, PageLayout::a4())
    }

    pub fn with_layout(renderer: Arc<dyn Renderer>, layout: PageLayout) -> Self {
        Self {
            renderer,
            layout,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    fn begin(&self) -> Result<BusyGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| ReporterError::ExportInProgress)?;
        Ok(BusyGuard(self.busy.clone()))
    }

    async fn render(&self, report: &Report) -> Result<RenderedDocument> {
        let report = report.clone();
        let renderer = self.renderer.clone();
        let layout = self.layout.clone();
        tokio::task::spawn_blocking(move || render_document(&report, renderer.as_ref(), &layout))
            .await
            .map_err(|e| ReporterError::PdfGeneration(e.to_string()))?
    }

    /// 書き出しと同じページ列を描画する（ファイルは書かない）
    pub async fn preview(&self, report: &Report) -> Result<RenderedDocument> {
        let _guard = self.begin()?;
        self.render(report).await
    }

    /// PDFを生成して`output_dir`に保存
    ///
    /// 全ページの描画とPDF組み立てが成功してから書き込むので、
    /// 失敗時にファイルは残らない。
    pub async fn export(&self, report: &Report, output_dir: &Path) -> Result<ExportedPdf> {
        let _guard = self.begin()?;
        let document = self.render(report).await?;

        let layout = self.layout.clone();
        let title = report.project_name.clone();
        let pages = document.pages;
        let page_count = pages.len();
        let bytes = tokio::task::spawn_blocking(move || assemble_pdf(&title, &pages, &layout))
            .await
            .map_err(|e| ReporterError::PdfGeneration(e.to_string()))??;

        tokio::fs::create_dir_all(output_dir).await?;
        let path = output_dir.join(&document.file_name);
        let tmp = path.with_extension("pdf.tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;

        log::info!("exported {} ({} page(s))", path.display(), page_count);
        Ok(ExportedPdf { path, page_count })
    }
}
