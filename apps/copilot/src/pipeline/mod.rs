//! Pipeline Controller: the UI-side orchestrator.
//!
//! Analysis runs `idle -> extracting -> summarizing -> done`, falling into
//! `error` from either in-flight stage. Tailoring is a second machine
//! (`idle -> tailoring -> done | error`) gated on a finished analysis, a
//! session and a stored master resume. Status gates reentry: a second run
//! while one is in flight is rejected, never queued.

pub mod analysis;
pub mod handlers;
pub mod resume_editor;
pub mod tailoring;

use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::backend::ResumeStore;
use crate::contexts::TabRegistry;
use crate::models::cover_letter::{CoverLetter, CoverLetterOptions};
use crate::models::job::ExtractedJob;
use crate::models::summary::JobSummary;
use crate::models::tailor::TailoredResumeResult;
use crate::models::user::Session;
use crate::router::{Context, MessageRouter, MessageType, Request, Response, RouterError};
use crate::backend::ExternalCredential;
use crate::session::{SessionError, SessionStore};
use crate::storage::StorageError;

use self::analysis::{AnalysisStatus, AnalysisView, ManualEntry};
use self::resume_editor::ResumeEditor;
use self::tailoring::{TailorEngine, TailorMode, TailorStatus, TailoringView};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{0} already in progress")]
    Busy(&'static str),

    #[error(transparent)]
    Precondition(#[from] Precondition),

    #[error(transparent)]
    Router(#[from] RouterError),

    #[error("{0}")]
    Upstream(String),
}

/// Distinguished, user-fixable reasons an operation cannot start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Precondition {
    #[error("Analyze a job posting first")]
    AnalysisNotDone,

    #[error("Please sign in first")]
    NotAuthenticated,

    #[error("Please upload your master resume first")]
    ResumeNotUploaded,

    #[error("No changes to save")]
    NoChanges,
}

impl Precondition {
    pub fn code(self) -> &'static str {
        match self {
            Precondition::AnalysisNotDone => "ANALYSIS_NOT_DONE",
            Precondition::NotAuthenticated => "NOT_AUTHENTICATED",
            Precondition::ResumeNotUploaded => "RESUME_NOT_UPLOADED",
            Precondition::NoChanges => "NO_CHANGES",
        }
    }
}

/// Tailoring view plus the account generation it belongs to. The generation
/// moves on every sign-in and sign-out; runs started under an older one never
/// write back.
#[derive(Debug, Default)]
struct TailoringSlot {
    view: TailoringView,
    generation: u64,
}

pub struct PipelineController {
    router: Arc<MessageRouter>,
    tabs: Arc<TabRegistry>,
    session: Arc<SessionStore>,
    resumes: Arc<dyn ResumeStore>,
    tailor_engine: Arc<dyn TailorEngine>,
    editor: ResumeEditor,
    analysis: Mutex<AnalysisView>,
    tailoring: Mutex<TailoringSlot>,
}

impl PipelineController {
    pub fn new(
        router: Arc<MessageRouter>,
        tabs: Arc<TabRegistry>,
        session: Arc<SessionStore>,
        resumes: Arc<dyn ResumeStore>,
        tailor_mode: TailorMode,
    ) -> Self {
        let tailor_engine = tailoring::engine_for(tailor_mode, router.clone(), resumes.clone());
        Self {
            editor: ResumeEditor::new(resumes.clone(), session.clone()),
            router,
            tabs,
            session,
            resumes,
            tailor_engine,
            analysis: Mutex::new(AnalysisView::default()),
            tailoring: Mutex::new(TailoringSlot::default()),
        }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn editor(&self) -> &ResumeEditor {
        &self.editor
    }

    pub fn analysis_view(&self) -> AnalysisView {
        self.analysis().clone()
    }

    pub fn tailoring_view(&self) -> TailoringView {
        self.tailoring().view.clone()
    }

    /// One full pipeline run. Every run starts over from `extracting`; the
    /// previous job, summary and error are dropped up front. Stage failures
    /// end in the `error` state and are returned as part of the view.
    pub async fn analyze(&self, manual: Option<ManualEntry>) -> Result<AnalysisView, PipelineError> {
        {
            let mut analysis = self.analysis();
            if analysis.status.in_flight() {
                return Err(PipelineError::Busy("Analysis"));
            }
            *analysis = AnalysisView {
                status: AnalysisStatus::Extracting,
                ..Default::default()
            };
        }
        info!("Analysis: extracting");

        let extracted = match manual {
            Some(entry) => Ok(entry.into_job()),
            None => self.extract_from_active_tab().await,
        };
        let job = match extracted {
            Ok(job) if job.text().is_empty() => {
                return Ok(self.fail_analysis("No job description text found".to_string()))
            }
            Ok(job) => job,
            Err(message) => return Ok(self.fail_analysis(message)),
        };

        {
            let mut analysis = self.analysis();
            analysis.status = AnalysisStatus::Summarizing;
            analysis.job = Some(job.clone());
        }
        info!(
            "Analysis: summarizing {} chars from {:?} source",
            job.text().chars().count(),
            job.source()
        );

        match self.summarize(job.text()).await {
            Ok(summary) => {
                let mut analysis = self.analysis();
                analysis.status = AnalysisStatus::Done;
                analysis.summary = Some(summary);
                info!("Analysis: done");
                Ok(analysis.clone())
            }
            Err(message) => Ok(self.fail_analysis(message)),
        }
    }

    /// Runs tailoring for the analysed job. Precondition failures leave the
    /// tailoring state untouched and never reach the tailoring engine.
    pub async fn tailor(&self) -> Result<TailoringView, PipelineError> {
        let job = self.analyzed_job()?;
        let token = self.session_token()?;

        let (previous, generation) = {
            let mut tailoring = self.tailoring();
            if tailoring.view.status == TailorStatus::Tailoring {
                return Err(PipelineError::Busy("Tailoring"));
            }
            let previous = std::mem::replace(
                &mut tailoring.view,
                TailoringView {
                    status: TailorStatus::Tailoring,
                    job_url: Some(job.url().to_string()),
                    ..Default::default()
                },
            );
            (previous, tailoring.generation)
        };

        let resume = match self.resumes.get_master(&token).await {
            Ok(Some(resume)) => resume,
            Ok(None) => {
                let mut tailoring = self.tailoring();
                if tailoring.generation == generation {
                    tailoring.view = previous;
                }
                return Err(Precondition::ResumeNotUploaded.into());
            }
            Err(e) => return Ok(self.finish_tailoring(generation, Err(e.to_string()))),
        };

        info!("Tailoring: resume against {}", job.url());
        let result = self
            .tailor_engine
            .tailor(&token, job.text(), &resume.raw_text)
            .await;
        Ok(self.finish_tailoring(generation, result))
    }

    /// Cover letters are not part of either state machine: the result is
    /// returned directly.
    pub async fn cover_letter(
        &self,
        mut options: CoverLetterOptions,
    ) -> Result<CoverLetter, PipelineError> {
        let job = self.analyzed_job()?;
        let token = self.session_token()?;

        let resume = self
            .resumes
            .get_master(&token)
            .await
            .map_err(|e| PipelineError::Upstream(e.to_string()))?
            .ok_or(Precondition::ResumeNotUploaded)?;

        if options.job_title.trim().is_empty() {
            options.job_title = job.title().to_string();
        }

        let request = Request::CoverLetter {
            job_text: job.text().to_string(),
            resume_text: resume.raw_text,
            options,
        };
        match self.router.send(Context::Background, request).await? {
            Response::CoverLetter(outcome) => outcome.into_result().map_err(PipelineError::Upstream),
            other => Err(RouterError::unexpected(MessageType::CoverLetter, &other).into()),
        }
    }

    /// Establishes a session and pulls that account's master resume into the
    /// editor. A failed resume load only lands in the editor's message slot.
    pub async fn sign_in(&self, credential: &ExternalCredential) -> Result<Session, SessionError> {
        let session = self.session.establish(credential).await?;
        self.reset_account_state();
        self.load_editor().await;
        Ok(session)
    }

    /// Startup counterpart of [`Self::sign_in`]: restores the persisted
    /// session and, if there is one, loads the editor from the backend.
    pub async fn restore_session(&self) -> Result<Option<Session>, StorageError> {
        let session = self.session.load().await?;
        self.reset_account_state();
        if session.is_some() {
            self.load_editor().await;
        }
        Ok(session)
    }

    /// Tears the session down and forgets everything tied to the account.
    pub async fn sign_out(&self) -> Result<(), StorageError> {
        let cleared = self.session.teardown().await;
        self.reset_account_state();
        cleared
    }

    fn reset_account_state(&self) {
        self.editor.reset();
        let mut tailoring = self.tailoring();
        tailoring.generation += 1;
        tailoring.view = TailoringView::default();
    }

    async fn load_editor(&self) {
        if let Err(e) = self.editor.load().await {
            warn!("Master resume not loaded: {e}");
        }
    }

    async fn extract_from_active_tab(&self) -> Result<ExtractedJob, String> {
        let tab = self
            .tabs
            .active()
            .ok_or_else(|| "No active tab found".to_string())?;

        match self.router.send(Context::Page(tab), Request::ExtractJob).await {
            Ok(Response::Job(job)) => Ok(job),
            Ok(other) => Err(RouterError::unexpected(MessageType::ExtractJob, &other).to_string()),
            Err(e) => Err(e.to_string()),
        }
    }

    async fn summarize(&self, job_text: &str) -> Result<JobSummary, String> {
        let request = Request::Summarize {
            job_text: job_text.to_string(),
        };
        match self.router.send(Context::Background, request).await {
            Ok(Response::Summary(outcome)) => outcome.into_result(),
            Ok(other) => Err(RouterError::unexpected(MessageType::Summarize, &other).to_string()),
            Err(e) => Err(e.to_string()),
        }
    }

    fn fail_analysis(&self, message: String) -> AnalysisView {
        warn!("Analysis failed: {message}");
        let mut analysis = self.analysis();
        analysis.status = AnalysisStatus::Error;
        analysis.summary = None;
        analysis.error = Some(message);
        analysis.clone()
    }

    fn finish_tailoring(
        &self,
        generation: u64,
        result: Result<TailoredResumeResult, String>,
    ) -> TailoringView {
        let mut slot = self.tailoring();
        if slot.generation != generation {
            debug!("Dropping tailoring result from a previous session");
            return slot.view.clone();
        }
        let tailoring = &mut slot.view;
        match result {
            Ok(result) => {
                info!("Tailoring: done");
                tailoring.status = TailorStatus::Done;
                tailoring.result = Some(result);
                tailoring.error = None;
            }
            Err(message) => {
                warn!("Tailoring failed: {message}");
                tailoring.status = TailorStatus::Error;
                tailoring.result = None;
                tailoring.error = Some(message);
            }
        }
        tailoring.clone()
    }

    fn analyzed_job(&self) -> Result<ExtractedJob, Precondition> {
        let analysis = self.analysis();
        match (&analysis.status, &analysis.job) {
            (AnalysisStatus::Done, Some(job)) => Ok(job.clone()),
            _ => Err(Precondition::AnalysisNotDone),
        }
    }

    fn session_token(&self) -> Result<String, Precondition> {
        self.session
            .token()
            .filter(|_| self.session.is_authenticated())
            .ok_or(Precondition::NotAuthenticated)
    }

    fn analysis(&self) -> MutexGuard<'_, AnalysisView> {
        self.analysis.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn tailoring(&self) -> MutexGuard<'_, TailoringSlot> {
        self.tailoring.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
