use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// User profile stored by the backend service.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Lead-search API key saved by the user.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Any other attributes the backend returns.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Profile {
    /// Stored lead-search key, ignoring blank values.
    pub fn stored_api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// Applies a successful update locally when the backend does not echo the
    /// profile back.
    #[must_use]
    pub fn merged_with(&self, update: &ProfileUpdate) -> Profile {
        let mut merged = self.clone();
        if let Some(first_name) = &update.first_name {
            merged.first_name = Some(first_name.clone());
        }
        if let Some(last_name) = &update.last_name {
            merged.last_name = Some(last_name.clone());
        }
        if let Some(api_key) = &update.api_key {
            merged.api_key = Some(api_key.clone());
        }
        let full_name = format!(
            "{} {}",
            merged.first_name.as_deref().unwrap_or_default(),
            merged.last_name.as_deref().unwrap_or_default()
        );
        merged.full_name = Some(full_name.trim().to_string());
        merged
    }
}

/// Partial profile update. Only changed attributes are sent.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none() && self.api_key.is_none()
    }
}
