use serde_json::json;
use thiserror::Error;

/// Errors surfaced by the portal pipeline and its handlers.
///
/// Every variant maps to a stable wire code so the UI can branch on it.
#[derive(Error, Debug)]
pub enum PortalError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("identifier already in use: {0}")]
    DuplicateId(String),

    #[error("validation failed")]
    Validation(Vec<FieldError>),

    #[error("bad params: {0}")]
    BadParams(String),

    #[error("action already in flight: {0}")]
    Busy(String),

    #[error("no data loaded for {0}")]
    NoDataSource(String),

    #[error("select a workspace first")]
    NoWorkspace,

    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(String),
}

/// Inline validation message attached to a single form field.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

impl PortalError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        PortalError::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            PortalError::NotFound { .. } => "not_found",
            PortalError::DuplicateId(_) => "duplicate_id",
            PortalError::Validation(_) => "validation_failed",
            PortalError::BadParams(_) => "bad_params",
            PortalError::Busy(_) => "busy",
            PortalError::NoDataSource(_) => "no_data_source",
            PortalError::NoWorkspace => "no_workspace",
            PortalError::Db(_) => "db_failed",
            PortalError::Io(_) => "io_failed",
        }
    }

    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            PortalError::NotFound { kind, id } => Some(json!({ "kind": kind, "id": id })),
            PortalError::Validation(errors) => Some(json!({ "fields": errors })),
            PortalError::DuplicateId(id) => Some(json!({ "id": id })),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for PortalError {
    fn from(e: anyhow::Error) -> Self {
        PortalError::Io(format!("{e:#}"))
    }
}

pub type Result<T> = std::result::Result<T, PortalError>;
