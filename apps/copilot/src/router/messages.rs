//! Request/response contract between the UI, page and background contexts.

use std::fmt;

use crate::models::cover_letter::{CoverLetter, CoverLetterOptions};
use crate::models::job::ExtractedJob;
use crate::models::summary::JobSummary;
use crate::models::tailor::TailoredResumeResult;
use crate::reasoning::ReasoningOutcome;

/// Wire tag of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    ExtractJob,
    Summarize,
    Tailor,
    CoverLetter,
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MessageType::ExtractJob => "EXTRACT_JOB",
            MessageType::Summarize => "SUMMARIZE",
            MessageType::Tailor => "TAILOR",
            MessageType::CoverLetter => "COVER_LETTER",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    ExtractJob,
    Summarize {
        job_text: String,
    },
    Tailor {
        job_text: String,
        resume_text: String,
    },
    CoverLetter {
        job_text: String,
        resume_text: String,
        options: CoverLetterOptions,
    },
}

impl Request {
    pub fn message_type(&self) -> MessageType {
        match self {
            Request::ExtractJob => MessageType::ExtractJob,
            Request::Summarize { .. } => MessageType::Summarize,
            Request::Tailor { .. } => MessageType::Tailor,
            Request::CoverLetter { .. } => MessageType::CoverLetter,
        }
    }
}

/// One response variant per request type.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Job(ExtractedJob),
    Summary(ReasoningOutcome<JobSummary>),
    Tailored(ReasoningOutcome<TailoredResumeResult>),
    CoverLetter(ReasoningOutcome<CoverLetter>),
}

impl Response {
    pub fn message_type(&self) -> MessageType {
        match self {
            Response::Job(_) => MessageType::ExtractJob,
            Response::Summary(_) => MessageType::Summarize,
            Response::Tailored(_) => MessageType::Tailor,
            Response::CoverLetter(_) => MessageType::CoverLetter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_type_tags() {
        let request = Request::Summarize {
            job_text: "x".to_string(),
        };
        assert_eq!(request.message_type(), MessageType::Summarize);
        assert_eq!(request.message_type().to_string(), "SUMMARIZE");
        assert_eq!(MessageType::ExtractJob.to_string(), "EXTRACT_JOB");
    }
}
