use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeMade {
    pub change: String,
    pub rationale: String,
}

/// Tailoring recommendation for one (job, master resume) pair.
///
/// Wire names follow the backend's snake_case contract. `tailored_resume_latex`
/// defaults to empty because backends that render LaTeX server-side omit it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TailoredResumeResult {
    #[serde(rename = "tailored_resume")]
    pub tailored_resume_plain: String,
    #[serde(default)]
    pub tailored_resume_latex: String,
    pub changes_made: Vec<ChangeMade>,
    pub keywords_matched: Vec<String>,
    pub keywords_missing: Vec<String>,
    pub keyword_variants_used: Vec<String>,
    pub clarifying_questions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tailored_result_deserializes_backend_shape() {
        let json = r#"{
            "tailored_resume": "Jane Doe\nRust Engineer",
            "tailored_resume_latex": "\\documentclass{article}",
            "changes_made": [{"change": "Moved storage work first", "rationale": "Matches role focus"}],
            "keywords_matched": ["Rust"],
            "keywords_missing": ["Kafka"],
            "keyword_variants_used": ["Developer -> Engineer"],
            "clarifying_questions": ["Have you run Kafka in production?"]
        }"#;
        let result: TailoredResumeResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.tailored_resume_plain, "Jane Doe\nRust Engineer");
        assert_eq!(result.changes_made[0].rationale, "Matches role focus");
        assert_eq!(result.keywords_missing, vec!["Kafka"]);
    }

    #[test]
    fn test_latex_is_optional() {
        let json = r#"{
            "tailored_resume": "plain",
            "changes_made": [],
            "keywords_matched": [],
            "keywords_missing": [],
            "keyword_variants_used": [],
            "clarifying_questions": []
        }"#;
        let result: TailoredResumeResult = serde_json::from_str(json).unwrap();
        assert!(result.tailored_resume_latex.is_empty());
    }
}
