//! field-reporter
//!
//! 現場検査レポートの作成・保存・PDF書き出し

pub mod ai_provider;
pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod imaging;
pub mod refine;
pub mod session;
pub mod storage;

pub use app::{App, View};
pub use error::{ReporterError, Result};
pub use export::{ExportEngine, RasterRenderer, Renderer};
pub use session::FormSession;
pub use storage::{FileStore, MemoryStore, ReportStore};
