//! REST API types for the web client.
//!
//! Field names are camelCase on the wire. Errors share one JSON shape built
//! by [`error_response`], and [`import_error_status`] decides the status
//! code of every import failure.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::commit::CommitOutcome;
use crate::error::{ImportError, SessionError};
use crate::models::Guest;
use crate::preview::PreviewRow;
use crate::session::SessionView;

/// Response to opening an import session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenSessionResponse {
    pub session_id: String,
    pub wedding_id: String,
    pub step: String,
}

/// Response after a file was decoded and validated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    pub session_id: String,

    /// Summary from [`crate::preview::ImportPreview::status`].
    pub status: String,

    pub file_name: Option<String>,
    pub valid_count: usize,
    pub invalid_count: usize,
    pub can_commit: bool,
    pub rows: Vec<PreviewRow>,
}

impl PreviewResponse {
    pub fn new(view: SessionView, status: &str) -> Self {
        Self {
            status: status.to_string(),
            session_id: view.session_id,
            file_name: view.file_name,
            valid_count: view.valid_count,
            invalid_count: view.invalid_count,
            can_commit: view.can_commit,
            rows: view.rows,
        }
    }
}

/// Response after a successful commit. The client refreshes its guest list
/// when it sees this.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitResponse {
    pub inserted: usize,
    pub message: String,
    pub refresh: bool,
}

impl From<CommitOutcome> for CommitResponse {
    fn from(outcome: CommitOutcome) -> Self {
        Self {
            inserted: outcome.inserted,
            message: outcome.message(),
            refresh: true,
        }
    }
}

/// Guests of a wedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestListResponse {
    pub wedding_id: String,
    pub total: usize,
    pub guests: Vec<Guest>,
}

/// Query of the template download.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplateQuery {
    pub lang: Option<String>,
}

/// Status code for an import failure.
pub fn import_error_status(err: &ImportError) -> StatusCode {
    match err {
        ImportError::UnsupportedFormat(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        ImportError::Parse(_) | ImportError::NoValidRecords => StatusCode::UNPROCESSABLE_ENTITY,
        ImportError::Store(_) => StatusCode::BAD_GATEWAY,
        ImportError::Session(session) => session_error_status(session),
    }
}

/// Status code for a session failure.
pub fn session_error_status(err: &SessionError) -> StatusCode {
    match err {
        SessionError::NotFound(_) | SessionError::Closed => StatusCode::NOT_FOUND,
        SessionError::InvalidTransition { .. } => StatusCode::CONFLICT,
        SessionError::LockPoisoned => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Stable machine-readable code for an import failure.
pub fn import_error_code(err: &ImportError) -> &'static str {
    match err {
        ImportError::UnsupportedFormat(_) => "unsupported_format",
        ImportError::Parse(_) => "parse_error",
        ImportError::NoValidRecords => "no_valid_records",
        ImportError::Store(_) => "store_error",
        ImportError::Session(_) => "session_error",
    }
}

/// Create an error response
pub fn error_response(code: &str, error: &str) -> Value {
    json!({
        "status": "error",
        "code": code,
        "error": error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ParseError, StoreError};

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            import_error_status(&ImportError::UnsupportedFormat("a.csv".into())),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            import_error_status(&ImportError::Parse(ParseError::NoSheets)),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            import_error_status(&ImportError::NoValidRecords),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            import_error_status(&ImportError::Store(StoreError::Http("down".into()))),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            import_error_status(&ImportError::Session(SessionError::InvalidTransition {
                step: "importing",
                action: "commit",
            })),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_commit_response_asks_for_refresh() {
        let response = CommitResponse::from(CommitOutcome { inserted: 3 });
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["inserted"], 3);
        assert_eq!(value["message"], "3 guests imported");
        assert_eq!(value["refresh"], true);
    }

    #[test]
    fn test_error_response_shape() {
        let value = error_response("no_valid_records", "No valid guests to import");
        assert_eq!(value["status"], "error");
        assert_eq!(value["code"], "no_valid_records");
    }
}
