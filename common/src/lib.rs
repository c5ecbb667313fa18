//! Field Report Common Library
//!
//! レポートの型・レイアウト・ページ構成を純粋関数として提供する（I/Oなし）

pub mod types;
pub mod layout;
pub mod error;
pub mod export;

pub use types::{
    comment_paragraphs, format_date, InspectorProfile, Report, ReportCollection, ReportStatus,
    ReportType,
};
pub use layout::PageLayout;
pub use error::{Error, Result};
pub use export::page_core::{build_pages, export_file_name, PageContent, PageSpec};
