use serde::{Deserialize, Serialize};

use crate::models::job::{ExtractedJob, JobSource};
use crate::models::summary::JobSummary;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    #[default]
    Idle,
    Extracting,
    Summarizing,
    Done,
    Error,
}

impl AnalysisStatus {
    pub fn in_flight(self) -> bool {
        matches!(self, AnalysisStatus::Extracting | AnalysisStatus::Summarizing)
    }
}

/// Snapshot of the analysis state machine as the UI renders it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisView {
    pub status: AnalysisStatus,
    pub job: Option<ExtractedJob>,
    pub summary: Option<JobSummary>,
    pub error: Option<String>,
}

/// Job text supplied by the user instead of read from the page.
#[derive(Debug, Clone, Deserialize)]
pub struct ManualEntry {
    pub text: String,
    #[serde(default = "default_manual_source")]
    pub source: JobSource,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

fn default_manual_source() -> JobSource {
    JobSource::Paste
}

impl ManualEntry {
    pub fn into_job(self) -> ExtractedJob {
        ExtractedJob::new(
            self.url.unwrap_or_default(),
            self.title.unwrap_or_default(),
            &self.text,
            self.source,
        )
    }
}
