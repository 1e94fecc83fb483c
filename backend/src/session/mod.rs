//! Import session state machine.
//!
//! One session covers one file upload through one commit-or-cancel cycle:
//!
//! ```text
//!            file            decoded              confirm
//!  Upload ─────────▶ Processing ─────▶ Preview ─────────▶ Importing ──▶ Closed
//!    ▲                   │ parse error   │ reset             │ store error
//!    └───────────────────┘◀──────────────┘                   ▼
//!                                                          Preview
//! ```
//!
//! Any step can be closed. A decode or commit result that arrives after the
//! session was closed is dropped.

pub mod registry;

use serde::Serialize;
use uuid::Uuid;

pub use registry::SessionRegistry;

use crate::api::logs::{log, LogEntry};
use crate::commit::{build_payloads, insert_batch, CommitOutcome};
use crate::error::{ImportError, SessionError, SessionResult, StoreResult};
use crate::models::GuestInsertPayload;
use crate::parser::check_extension;
use crate::preview::{ImportPreview, PreviewRow};
use crate::store::GuestStore;
use crate::transform::pipeline::parse_guests;

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportStep {
    /// Waiting for a file.
    Upload,
    /// Decoding and validating `file_name`.
    Processing { file_name: String },
    /// Showing the parsed rows for review.
    Preview {
        file_name: String,
        preview: ImportPreview,
    },
    /// Batch insert in flight; the preview is kept for a retry.
    Importing {
        file_name: String,
        preview: ImportPreview,
    },
    /// Terminal.
    Closed,
}

impl ImportStep {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::Processing { .. } => "processing",
            Self::Preview { .. } => "preview",
            Self::Importing { .. } => "importing",
            Self::Closed => "closed",
        }
    }
}

/// One import dialog, scoped to a wedding.
#[derive(Debug, Clone)]
pub struct ImportSession {
    id: Uuid,
    wedding_id: String,
    step: ImportStep,
}

/// Serializable snapshot of a session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: String,
    pub wedding_id: String,
    pub step: &'static str,
    pub file_name: Option<String>,
    pub valid_count: usize,
    pub invalid_count: usize,
    pub can_commit: bool,
    pub rows: Vec<PreviewRow>,
}

impl ImportSession {
    pub fn new(wedding_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            wedding_id: wedding_id.into(),
            step: ImportStep::Upload,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn wedding_id(&self) -> &str {
        &self.wedding_id
    }

    pub fn step(&self) -> &ImportStep {
        &self.step
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.step, ImportStep::Closed)
    }

    pub fn file_name(&self) -> Option<&str> {
        match &self.step {
            ImportStep::Processing { file_name }
            | ImportStep::Preview { file_name, .. }
            | ImportStep::Importing { file_name, .. } => Some(file_name),
            ImportStep::Upload | ImportStep::Closed => None,
        }
    }

    pub fn preview(&self) -> Option<&ImportPreview> {
        match &self.step {
            ImportStep::Preview { preview, .. } | ImportStep::Importing { preview, .. } => {
                Some(preview)
            }
            _ => None,
        }
    }

    pub fn valid_count(&self) -> usize {
        self.preview().map_or(0, ImportPreview::valid_count)
    }

    pub fn invalid_count(&self) -> usize {
        self.preview().map_or(0, ImportPreview::invalid_count)
    }

    /// Whether the commit action is enabled: a preview with at least one
    /// valid row and no commit already in flight.
    pub fn can_commit(&self) -> bool {
        matches!(self.step, ImportStep::Preview { .. }) && self.valid_count() > 0
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            session_id: self.id.to_string(),
            wedding_id: self.wedding_id.clone(),
            step: self.step.name(),
            file_name: self.file_name().map(str::to_string),
            valid_count: self.valid_count(),
            invalid_count: self.invalid_count(),
            can_commit: self.can_commit(),
            rows: self.preview().map(ImportPreview::rows).unwrap_or_default(),
        }
    }

    fn refuse(&self, action: &'static str) -> SessionError {
        if self.is_closed() {
            SessionError::Closed
        } else {
            SessionError::InvalidTransition {
                step: self.step.name(),
                action,
            }
        }
    }

    fn note(&self, message: impl Into<String>) {
        log(LogEntry::info(message).with_session(self.id));
    }

    // -------------------------------------------------------------------------
    // Upload -> Processing -> Preview
    // -------------------------------------------------------------------------

    /// Accept a file for decoding.
    ///
    /// Names other than `.xlsx` / `.xls` are refused and the session stays
    /// on the upload step.
    pub fn begin_processing(&mut self, file_name: &str) -> Result<(), ImportError> {
        if !matches!(self.step, ImportStep::Upload) {
            return Err(self.refuse("upload a file").into());
        }
        check_extension(file_name)?;

        self.step = ImportStep::Processing {
            file_name: file_name.to_string(),
        };
        self.note(format!("Processing {}", file_name));
        Ok(())
    }

    /// Apply the decode result.
    ///
    /// Success moves to the preview; a failure returns to the upload step
    /// and hands the error back for the user notification.
    pub fn finish_processing(
        &mut self,
        result: Result<ImportPreview, ImportError>,
    ) -> Result<&ImportPreview, ImportError> {
        let file_name = match std::mem::replace(&mut self.step, ImportStep::Upload) {
            ImportStep::Processing { file_name } => file_name,
            other => {
                self.step = other;
                return Err(self.refuse("finish processing").into());
            }
        };

        match result {
            Ok(preview) => {
                self.note(format!(
                    "Preview ready: {} valid, {} invalid",
                    preview.valid_count(),
                    preview.invalid_count()
                ));
                self.step = ImportStep::Preview { file_name, preview };
                self.preview()
                    .ok_or_else(|| ImportError::from(self.refuse("show preview")))
            }
            Err(e) => {
                self.note(format!("Could not process {}: {}", file_name, e));
                Err(e)
            }
        }
    }

    /// Decode and validate a file in one go.
    pub fn load_file(
        &mut self,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<&ImportPreview, ImportError> {
        self.begin_processing(file_name)?;
        let result = parse_guests(file_name, bytes);
        self.finish_processing(result)
    }

    /// Discard the file and the parsed rows and go back to the upload step.
    pub fn reset(&mut self) -> SessionResult<()> {
        match self.step {
            ImportStep::Upload | ImportStep::Preview { .. } => {
                self.step = ImportStep::Upload;
                self.note("Reset to upload");
                Ok(())
            }
            _ => Err(self.refuse("reset")),
        }
    }

    // -------------------------------------------------------------------------
    // Preview -> Importing -> Closed
    // -------------------------------------------------------------------------

    /// Start a commit and return the payloads to send.
    ///
    /// Fails with [`ImportError::NoValidRecords`] when there is nothing to
    /// send; the session then stays on the preview.
    pub fn begin_commit(&mut self) -> Result<Vec<GuestInsertPayload>, ImportError> {
        let payloads = match &self.step {
            ImportStep::Preview { preview, .. } => build_payloads(&preview.guests, &self.wedding_id),
            _ => return Err(self.refuse("commit").into()),
        };
        if payloads.is_empty() {
            return Err(ImportError::NoValidRecords);
        }

        if let ImportStep::Preview { file_name, preview } =
            std::mem::replace(&mut self.step, ImportStep::Upload)
        {
            self.step = ImportStep::Importing { file_name, preview };
        }
        Ok(payloads)
    }

    /// Apply the store's answer to the commit.
    ///
    /// Success closes the session. A store failure returns to the preview
    /// with the same rows so the user can retry without re-uploading.
    pub fn finish_commit(
        &mut self,
        result: StoreResult<CommitOutcome>,
    ) -> Result<CommitOutcome, ImportError> {
        let (file_name, preview) = match std::mem::replace(&mut self.step, ImportStep::Closed) {
            ImportStep::Importing { file_name, preview } => (file_name, preview),
            other => {
                self.step = other;
                return Err(self.refuse("finish commit").into());
            }
        };

        match result {
            Ok(outcome) => {
                self.note(format!("{} from {}", outcome.message(), file_name));
                Ok(outcome)
            }
            Err(e) => {
                self.step = ImportStep::Preview { file_name, preview };
                Err(e.into())
            }
        }
    }

    /// Commit the valid rows through `store`.
    pub async fn commit<S: GuestStore>(&mut self, store: &S) -> Result<CommitOutcome, ImportError> {
        let payloads = self.begin_commit()?;
        let result = insert_batch(store, &payloads).await;
        self.finish_commit(result)
    }

    /// Close the dialog from any step.
    pub fn close(&mut self) {
        if !self.is_closed() {
            self.note(format!("Closed during {}", self.step.name()));
        }
        self.step = ImportStep::Closed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::store::MemoryStore;
    use rust_xlsxwriter::Workbook;

    fn sheet(rows: &[&[&str]]) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let ws = workbook.add_worksheet();
        for (r, row) in rows.iter().enumerate() {
            for (c, text) in row.iter().enumerate() {
                if !text.is_empty() {
                    ws.write_string(r as u32, c as u16, *text).unwrap();
                }
            }
        }
        workbook.save_to_buffer().unwrap()
    }

    fn mixed() -> Vec<u8> {
        sheet(&[
            &["Nombre", "Email"],
            &["Ana", "ana@example.com"],
            &["", "x@y.z"],
            &["Luis", ""],
        ])
    }

    fn previewing() -> ImportSession {
        let mut session = ImportSession::new("w-1");
        session.load_file("invitados.xlsx", &mixed()).unwrap();
        session
    }

    #[test]
    fn test_new_session_is_on_upload() {
        let session = ImportSession::new("w-1");
        assert_eq!(session.step(), &ImportStep::Upload);
        assert_eq!(session.valid_count(), 0);
        assert!(!session.can_commit());
    }

    #[test]
    fn test_load_file_moves_to_preview() {
        let session = previewing();
        assert_eq!(session.step().name(), "preview");
        assert_eq!(session.file_name(), Some("invitados.xlsx"));
        assert_eq!(session.valid_count(), 2);
        assert_eq!(session.invalid_count(), 1);
        assert!(session.can_commit());
    }

    #[test]
    fn test_unsupported_format_stays_on_upload() {
        let mut session = ImportSession::new("w-1");
        let err = session.load_file("invitados.csv", b"Nombre\nAna").unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedFormat(_)));
        assert_eq!(session.step(), &ImportStep::Upload);
    }

    #[test]
    fn test_parse_error_returns_to_upload() {
        let mut session = ImportSession::new("w-1");
        let err = session.load_file("invitados.xlsx", b"garbage").unwrap_err();
        assert!(matches!(err, ImportError::Parse(_)));
        assert_eq!(session.step(), &ImportStep::Upload);

        // The user can try again with a good file.
        session.load_file("invitados.xlsx", &mixed()).unwrap();
        assert_eq!(session.step().name(), "preview");
    }

    #[test]
    fn test_reset_clears_preview() {
        let mut session = previewing();
        session.reset().unwrap();
        assert_eq!(session.step(), &ImportStep::Upload);
        assert_eq!(session.valid_count(), 0);
        assert_eq!(session.invalid_count(), 0);
        assert!(session.view().rows.is_empty());
    }

    #[test]
    fn test_second_file_needs_reset() {
        let mut session = previewing();
        let err = session.load_file("otro.xlsx", &mixed()).unwrap_err();
        assert!(matches!(
            err,
            ImportError::Session(SessionError::InvalidTransition { step: "preview", .. })
        ));
    }

    #[test]
    fn test_begin_commit_twice_is_refused() {
        let mut session = previewing();
        let payloads = session.begin_commit().unwrap();
        assert_eq!(payloads.len(), 2);
        assert_eq!(session.step().name(), "importing");
        assert!(!session.can_commit());

        let err = session.begin_commit().unwrap_err();
        assert!(matches!(
            err,
            ImportError::Session(SessionError::InvalidTransition { step: "importing", .. })
        ));
        assert!(session.reset().is_err());
    }

    #[test]
    fn test_no_valid_rows_stays_on_preview() {
        let mut session = ImportSession::new("w-1");
        session
            .load_file("x.xlsx", &sheet(&[&["Name", "Email"], &["", "a@b.co"], &["B", "bad"]]))
            .unwrap();
        assert!(!session.can_commit());

        let err = session.begin_commit().unwrap_err();
        assert!(matches!(err, ImportError::NoValidRecords));
        assert_eq!(session.step().name(), "preview");
    }

    #[tokio::test]
    async fn test_commit_success_closes_session() {
        let store = MemoryStore::new();
        let mut session = previewing();

        let outcome = session.commit(&store).await.unwrap();
        assert_eq!(outcome.inserted, 2);
        assert!(session.is_closed());
        assert_eq!(store.insert_calls(), 1);
        assert_eq!(store.list_guests("w-1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_commit_failure_keeps_preview_for_retry() {
        let store = MemoryStore::new();
        store.fail_next_insert(StoreError::Http("timeout".into()));
        let mut session = previewing();
        let before = session.preview().cloned();

        let err = session.commit(&store).await.unwrap_err();
        assert!(matches!(err, ImportError::Store(_)));
        assert_eq!(session.step().name(), "preview");
        assert_eq!(session.preview().cloned(), before);

        let outcome = session.commit(&store).await.unwrap();
        assert_eq!(outcome.inserted, 2);
        assert_eq!(store.insert_calls(), 2);
    }

    #[test]
    fn test_close_during_import_drops_result() {
        let mut session = previewing();
        session.begin_commit().unwrap();
        session.close();

        let err = session
            .finish_commit(Ok(CommitOutcome { inserted: 2 }))
            .unwrap_err();
        assert!(matches!(err, ImportError::Session(SessionError::Closed)));
        assert!(session.is_closed());
    }

    #[test]
    fn test_close_during_processing_drops_result() {
        let mut session = ImportSession::new("w-1");
        session.begin_processing("invitados.xlsx").unwrap();
        session.close();

        let late = parse_guests("invitados.xlsx", &mixed());
        assert!(session.finish_processing(late).is_err());
        assert!(session.is_closed());
        assert!(session.preview().is_none());
    }

    #[test]
    fn test_view_snapshot() {
        let view = previewing().view();
        assert_eq!(view.step, "preview");
        assert_eq!(view.rows.len(), 3);
        assert_eq!(view.rows[1].position, 2);
        assert!(view.can_commit);
    }
}
