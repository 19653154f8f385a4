use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{timestamp, RecordId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: RecordId,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Bearer token plus the identity it was issued for. Also the body of a
/// successful auth exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_from_minimal_backend_payload() {
        let json = r#"{"token": "jwt", "user": {"id": 7, "email": "a@b.c", "name": null}}"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.user.id, RecordId::Int(7));
        assert!(session.user.name.is_none());
        assert!(session.user.created_at.is_none());
    }
}
