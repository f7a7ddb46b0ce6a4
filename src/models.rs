use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// A shortened link record from the `links` table.
///
/// This is also the JSON shape exchanged with clients, so fields are
/// serialized in camelCase and timestamps as RFC 3339 strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub id: String,
    pub code: String,
    pub target_url: String,
    pub total_clicks: i64,
    pub last_clicked: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Link {
    /// Build a fresh, never-visited link. Used by registry backends only.
    pub(crate) fn new(code: &str, target_url: &str) -> Self {
        let now = now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            code: code.to_owned(),
            target_url: target_url.to_owned(),
            total_clicks: 0,
            last_clicked: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Public short URL for this link under `base_url` (no trailing slash).
    pub fn short_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.code)
    }
}

/// Body of `POST /api/links`.
///
/// `target_url` is optional at the serde level so a missing field surfaces as
/// a validation message instead of a deserialization rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinkRequest {
    pub target_url: Option<String>,
    pub code: Option<String>,
}

/// Current time at millisecond precision.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}
