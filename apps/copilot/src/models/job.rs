use serde::{Deserialize, Serialize};

/// Upper bound on job text handed to the reasoning service, in characters.
pub const MAX_JOB_TEXT_CHARS: usize = 6000;

/// Where the job text came from. Only `Dom` is produced by the page extractor;
/// the other two are manual entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobSource {
    Dom,
    Selection,
    Paste,
}

/// One extraction attempt. Fields are private so the normalisation applied in
/// [`ExtractedJob::new`] cannot be bypassed after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedJob {
    url: String,
    title: String,
    text: String,
    source: JobSource,
}

impl ExtractedJob {
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        raw_text: &str,
        source: JobSource,
    ) -> Self {
        Self {
            url: url.into(),
            title: title.into().trim().to_string(),
            text: normalize_job_text(raw_text),
            source,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn source(&self) -> JobSource {
        self.source
    }
}

/// Collapses every whitespace run to a single space, trims, and caps the
/// result at [`MAX_JOB_TEXT_CHARS`].
pub fn normalize_job_text(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_chars(collapsed, MAX_JOB_TEXT_CHARS)
}

fn truncate_chars(mut text: String, max_chars: usize) -> String {
    if let Some((byte_idx, _)) = text.char_indices().nth(max_chars) {
        text.truncate(byte_idx);
        // a cut may land right after a space
        let trimmed_len = text.trim_end().len();
        text.truncate(trimmed_len);
    }
    text
}
