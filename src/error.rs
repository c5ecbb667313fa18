use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReporterError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Please fill in required fields (Project, Date, Inspector Name)")]
    Validation { missing: Vec<&'static str> },

    #[error("Report not found: {0}")]
    ReportNotFound(String),

    #[error("Stored data under '{key}' is corrupt: {source}")]
    CorruptStore {
        key: String,
        #[source]
        source: field_report_common::Error,
    },

    #[error("Failed to decode image(s): {}", .0.join(", "))]
    ImageDecode(Vec<String>),

    #[error("Invalid image data: {0}")]
    InvalidImage(String),

    #[error("Attachment index {index} is out of range ({len} attached)")]
    AttachmentIndex { index: usize, len: usize },

    #[error("No report pages found to generate.")]
    NoPages,

    #[error("Failed to render page {page}: {reason}")]
    PageRender { page: usize, reason: String },

    #[error("Failed to generate PDF: {0}")]
    PdfGeneration(String),

    #[error("An export is already in progress")]
    ExportInProgress,

    #[error("AI Service unavailable: {0}")]
    RefineUnavailable(String),

    #[error("Prompt error: {0}")]
    Prompt(String),

    #[error(transparent)]
    Common(#[from] field_report_common::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReporterError>;
