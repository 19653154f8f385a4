//! Master-resume editing: a cached copy of the backend resume, the text being
//! edited, and the derived `has_changes` flag.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::backend::ResumeStore;
use crate::models::resume::MasterResume;
use crate::session::SessionStore;

use super::{PipelineError, Precondition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResumeMessage {
    pub kind: MessageKind,
    pub text: String,
}

impl ResumeMessage {
    fn success(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Success,
            text: text.into(),
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Error,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResumeEditorView {
    pub text: String,
    pub resume: Option<MasterResume>,
    pub has_changes: bool,
    pub can_save: bool,
    pub is_saving: bool,
    pub message: Option<ResumeMessage>,
}

const RESUME_UPDATE: &str = "Resume update";

/// Explicit answer to the "delete your resume?" prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

/// `generation` changes on every reset; a backend call that finishes under
/// an older generation belongs to a previous account and is dropped.
#[derive(Debug, Default)]
struct EditorState {
    text: String,
    resume: Option<MasterResume>,
    is_saving: bool,
    message: Option<ResumeMessage>,
    generation: u64,
}

impl EditorState {
    fn has_changes(&self) -> bool {
        match &self.resume {
            Some(resume) => self.text != resume.raw_text,
            None => !self.text.trim().is_empty(),
        }
    }

    fn view(&self) -> ResumeEditorView {
        let has_changes = self.has_changes();
        ResumeEditorView {
            text: self.text.clone(),
            resume: self.resume.clone(),
            has_changes,
            can_save: has_changes && !self.is_saving,
            is_saving: self.is_saving,
            message: self.message.clone(),
        }
    }
}

pub struct ResumeEditor {
    resumes: Arc<dyn ResumeStore>,
    session: Arc<SessionStore>,
    state: Mutex<EditorState>,
}

impl ResumeEditor {
    pub fn new(resumes: Arc<dyn ResumeStore>, session: Arc<SessionStore>) -> Self {
        Self {
            resumes,
            session,
            state: Mutex::new(EditorState::default()),
        }
    }

    pub fn view(&self) -> ResumeEditorView {
        self.state().view()
    }

    /// Keystroke analogue: replaces the edited text.
    pub fn set_text(&self, text: String) -> ResumeEditorView {
        let mut state = self.state();
        state.text = text;
        state.view()
    }

    /// Replaces cache and text with the backend copy. Backend failures land
    /// in the message slot.
    pub async fn load(&self) -> Result<ResumeEditorView, PipelineError> {
        let token = self.token()?;
        let generation = self.state().generation;

        let result = self.resumes.get_master(&token).await;

        let mut state = self.state();
        if state.generation != generation {
            debug!("Dropping resume load from a previous session");
            return Ok(state.view());
        }
        match result {
            Ok(resume) => {
                state.text = resume
                    .as_ref()
                    .map(|r| r.raw_text.clone())
                    .unwrap_or_default();
                state.resume = resume;
                state.message = None;
                Ok(state.view())
            }
            Err(e) => {
                warn!("Failed to load master resume: {e}");
                state.message = Some(ResumeMessage::error(e.to_string()));
                Ok(state.view())
            }
        }
    }

    pub async fn save(&self) -> Result<ResumeEditorView, PipelineError> {
        let token = self.token()?;

        let (text, generation) = {
            let mut state = self.state();
            if state.is_saving {
                return Err(PipelineError::Busy(RESUME_UPDATE));
            }
            if !state.has_changes() {
                return Err(Precondition::NoChanges.into());
            }
            state.is_saving = true;
            state.message = None;
            (state.text.clone(), state.generation)
        };

        let result = self.resumes.put_master(&token, &text).await;

        let mut state = self.state();
        if state.generation != generation {
            debug!("Dropping resume save from a previous session");
            return Ok(state.view());
        }
        state.is_saving = false;
        match result {
            Ok(resume) => {
                info!("Master resume saved ({} chars)", resume.raw_text.chars().count());
                state.resume = Some(resume);
                state.message = Some(ResumeMessage::success("Resume saved successfully"));
            }
            Err(e) => {
                warn!("Failed to save master resume: {e}");
                state.message = Some(ResumeMessage::error(e.to_string()));
            }
        }
        Ok(state.view())
    }

    /// Declining is a no-op, not an error.
    pub async fn delete(&self, confirmation: Confirmation) -> Result<ResumeEditorView, PipelineError> {
        if confirmation == Confirmation::Declined {
            return Ok(self.view());
        }
        let token = self.token()?;
        let generation = {
            let mut state = self.state();
            if state.is_saving {
                return Err(PipelineError::Busy(RESUME_UPDATE));
            }
            if state.resume.is_none() {
                return Err(Precondition::ResumeNotUploaded.into());
            }
            state.is_saving = true;
            state.message = None;
            state.generation
        };

        let result = self.resumes.delete_master(&token).await;

        let mut state = self.state();
        if state.generation != generation {
            debug!("Dropping resume delete from a previous session");
            return Ok(state.view());
        }
        state.is_saving = false;
        match result {
            Ok(()) => {
                info!("Master resume deleted");
                state.resume = None;
                state.text.clear();
                state.message = Some(ResumeMessage::success("Resume deleted"));
            }
            Err(e) => {
                warn!("Failed to delete master resume: {e}");
                state.message = Some(ResumeMessage::error(e.to_string()));
            }
        }
        Ok(state.view())
    }

    /// Forgets everything tied to the current account. In-flight calls
    /// finish against the old generation and are ignored.
    pub fn reset(&self) {
        let mut state = self.state();
        let generation = state.generation + 1;
        *state = EditorState {
            generation,
            ..Default::default()
        };
    }

    fn token(&self) -> Result<String, PipelineError> {
        self.session
            .token()
            .filter(|_| self.session.is_authenticated())
            .ok_or_else(|| Precondition::NotAuthenticated.into())
    }

    fn state(&self) -> MutexGuard<'_, EditorState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::Notify;

    use crate::pipeline::tests::{anonymous_session, authenticated_session, wait_until, FakeResumes};

    async fn editor(resumes: Arc<FakeResumes>) -> ResumeEditor {
        ResumeEditor::new(resumes, authenticated_session().await)
    }

    #[tokio::test]
    async fn test_load_clears_has_changes() {
        let resumes = Arc::new(FakeResumes::with_resume("Jane Doe\nRust"));
        let editor = editor(resumes).await;

        let view = editor.load().await.unwrap();

        assert_eq!(view.text, "Jane Doe\nRust");
        assert!(!view.has_changes);
        assert!(!view.can_save);
    }

    #[tokio::test]
    async fn test_has_changes_tracks_cached_text() {
        let editor = editor(Arc::new(FakeResumes::with_resume("abc"))).await;
        editor.load().await.unwrap();

        assert!(editor.set_text("abcd".to_string()).has_changes);
        assert!(!editor.set_text("abc".to_string()).has_changes);
    }

    #[tokio::test]
    async fn test_has_changes_without_resume_means_non_blank() {
        let editor = editor(Arc::new(FakeResumes::default())).await;
        editor.load().await.unwrap();

        assert!(!editor.set_text("   \n".to_string()).has_changes);
        assert!(editor.set_text("Jane".to_string()).has_changes);
    }

    #[tokio::test]
    async fn test_save_replaces_cache_and_reports_success() {
        let resumes = Arc::new(FakeResumes::default());
        let editor = editor(resumes.clone()).await;
        editor.set_text("New resume".to_string());

        let view = editor.save().await.unwrap();

        assert!(!view.has_changes);
        assert!(!view.is_saving);
        assert_eq!(view.resume.unwrap().raw_text, "New resume");
        assert_eq!(view.message.unwrap().kind, MessageKind::Success);
        assert_eq!(resumes.stored().unwrap().raw_text, "New resume");
    }

    #[tokio::test]
    async fn test_save_without_changes_is_rejected() {
        let editor = editor(Arc::new(FakeResumes::with_resume("same"))).await;
        editor.load().await.unwrap();

        let err = editor.save().await.unwrap_err();

        assert!(matches!(err, PipelineError::Precondition(Precondition::NoChanges)));
    }

    #[tokio::test]
    async fn test_failed_save_keeps_changes_and_shows_detail() {
        let resumes = Arc::new(FakeResumes {
            fail_writes: true,
            ..Default::default()
        });
        let editor = editor(resumes).await;
        editor.set_text("draft".to_string());

        let view = editor.save().await.unwrap();

        assert!(view.has_changes);
        assert_eq!(
            view.message,
            Some(ResumeMessage::error("Resume text must not be empty"))
        );
    }

    #[tokio::test]
    async fn test_declined_delete_issues_no_call() {
        let resumes = Arc::new(FakeResumes::with_resume("keep me"));
        let editor = editor(resumes.clone()).await;
        editor.load().await.unwrap();

        let view = editor.delete(Confirmation::Declined).await.unwrap();

        assert_eq!(view.text, "keep me");
        assert!(resumes.stored().is_some());
    }

    #[tokio::test]
    async fn test_confirmed_delete_clears_cache_and_text() {
        let resumes = Arc::new(FakeResumes::with_resume("gone"));
        let editor = editor(resumes.clone()).await;
        editor.load().await.unwrap();

        let view = editor.delete(Confirmation::Confirmed).await.unwrap();

        assert!(view.resume.is_none());
        assert_eq!(view.text, "");
        assert!(!view.has_changes);
        assert!(resumes.stored().is_none());
    }

    #[tokio::test]
    async fn test_save_is_busy_while_delete_is_in_flight() {
        let gate = Arc::new(Notify::new());
        let resumes = Arc::new(FakeResumes {
            write_gate: Some(gate.clone()),
            ..FakeResumes::with_resume("gone")
        });
        let editor = Arc::new(editor(resumes.clone()).await);
        editor.load().await.unwrap();

        let deleting = editor.clone();
        let delete = tokio::spawn(async move { deleting.delete(Confirmation::Confirmed).await });
        wait_until(|| editor.view().is_saving).await;

        editor.set_text("second thoughts".to_string());
        let err = editor.save().await.unwrap_err();
        assert!(matches!(err, PipelineError::Busy("Resume update")));
        let err = editor.delete(Confirmation::Confirmed).await.unwrap_err();
        assert!(matches!(err, PipelineError::Busy("Resume update")));

        gate.notify_one();
        let view = delete.await.unwrap().unwrap();
        assert!(view.resume.is_none());
        assert!(!view.is_saving);
        assert!(resumes.stored().is_none());
    }

    #[tokio::test]
    async fn test_requires_session() {
        let editor = ResumeEditor::new(
            Arc::new(FakeResumes::with_resume("x")),
            anonymous_session(),
        );

        let err = editor.load().await.unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Precondition(Precondition::NotAuthenticated)
        ));
        assert!(editor.view().resume.is_none());
    }
}
