use serde::{Deserialize, Serialize};

/// Optional hints interpolated into the cover letter prompt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverLetterOptions {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub job_title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverLetter {
    pub cover_letter: String,
    pub cover_letter_latex: String,
    pub key_points_highlighted: Vec<String>,
    pub customization_notes: Vec<String>,
}
