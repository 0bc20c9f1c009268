//! Backend session tokens as persisted between runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Access tokens are refreshed this many seconds before they expire.
pub const REFRESH_MARGIN_SECONDS: i64 = 60;

/// Bearer session kept by the session store.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredSession {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Unix timestamp (seconds) at which the access token expires.
    #[serde(default)]
    pub expires_at: Option<i64>,
}

impl StoredSession {
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }

    /// A token without a known expiry is treated as fresh.
    pub fn is_access_token_fresh(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at - REFRESH_MARGIN_SECONDS > now.timestamp(),
            None => true,
        }
    }
}

/// Session returned by the refresh endpoint.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct RefreshedSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

impl RefreshedSession {
    /// Merges the refreshed tokens into the previously stored session.
    ///
    /// Tokens the refresh response omits keep their stored values.
    #[must_use]
    pub fn into_stored(self, previous: &StoredSession, now: DateTime<Utc>) -> StoredSession {
        let expires_at = self
            .expires_at
            .or_else(|| self.expires_in.map(|secs| now.timestamp() + secs))
            .or(previous.expires_at);

        StoredSession {
            access_token: Some(self.access_token),
            refresh_token: self.refresh_token.or_else(|| previous.refresh_token.clone()),
            expires_at,
        }
    }
}
