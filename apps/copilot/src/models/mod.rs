pub mod cover_letter;
pub mod job;
pub mod resume;
pub mod summary;
pub mod tailor;
pub mod timestamp;
pub mod user;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier issued by the resume backend. Older deployments hand out integer
/// primary keys, newer ones UUID strings; both are accepted verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(id) => write!(f, "{id}"),
            RecordId::Text(id) => f.write_str(id),
        }
    }
}
