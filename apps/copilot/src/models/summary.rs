use serde::{Deserialize, Serialize};

/// Structured summary of one job posting. The reasoning service is asked to
/// keep each list to 5-8 items; nothing here enforces that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSummary {
    pub role_overview: String,
    pub responsibilities: Vec<String>,
    pub requirements: Vec<String>,
    pub tech_and_tools: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_uses_camel_case_wire_names() {
        let json = r#"{
            "roleOverview": "Own the storage layer",
            "responsibilities": ["Design compaction"],
            "requirements": ["5+ years Rust"],
            "techAndTools": ["Rust", "Tokio"]
        }"#;
        let summary: JobSummary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.role_overview, "Own the storage layer");
        assert_eq!(summary.tech_and_tools, vec!["Rust", "Tokio"]);
    }

    #[test]
    fn test_summary_missing_field_is_rejected() {
        let json = r#"{"roleOverview": "x", "responsibilities": [], "requirements": []}"#;
        assert!(serde_json::from_str::<JobSummary>(json).is_err());
    }
}
