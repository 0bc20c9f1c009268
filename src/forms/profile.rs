use serde::Deserialize;
use validator::Validate;

use crate::domain::profile::{Profile, ProfileUpdate};
use crate::forms::FormError;

#[derive(Clone, Debug, Default, Deserialize, Validate)]
/// Form data for editing the account profile.
pub struct ProfileForm {
    #[serde(default)]
    #[validate(length(max = 100))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub last_name: String,
    /// Left blank to keep the stored key.
    #[serde(default)]
    #[validate(length(max = 256))]
    pub api_key: String,
}

impl ProfileForm {
    /// Prefills the name fields from the stored profile. The key is never
    /// echoed back into the form.
    pub fn from_profile(profile: Option<&Profile>) -> Self {
        Self {
            first_name: profile
                .and_then(|p| p.first_name.clone())
                .unwrap_or_default(),
            last_name: profile
                .and_then(|p| p.last_name.clone())
                .unwrap_or_default(),
            api_key: String::new(),
        }
    }

    /// Builds the update containing only the attributes that changed.
    pub fn into_update(self, current: Option<&Profile>) -> Result<ProfileUpdate, FormError> {
        self.validate()?;

        let stored_first = current
            .and_then(|p| p.first_name.as_deref())
            .unwrap_or_default();
        let stored_last = current
            .and_then(|p| p.last_name.as_deref())
            .unwrap_or_default();

        let first_name = self.first_name.trim();
        let last_name = self.last_name.trim();
        let api_key = self.api_key.trim();

        let update = ProfileUpdate {
            first_name: (first_name != stored_first).then(|| first_name.to_string()),
            last_name: (last_name != stored_last).then(|| last_name.to_string()),
            api_key: (!api_key.is_empty()).then(|| api_key.to_string()),
        };

        if update.is_empty() {
            return Err(FormError::NoChanges);
        }
        Ok(update)
    }
}
