use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{timestamp, RecordId};

/// The user's canonical resume as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterResume {
    pub id: RecordId,
    pub user_id: RecordId,
    pub raw_text: String,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub updated_at: DateTime<Utc>,
}
