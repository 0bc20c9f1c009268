use crate::domain::profile::Profile;
use crate::domain::types::AccessToken;
use crate::forms::profile::ProfileForm;
use crate::repository::errors::RepositoryError;
use crate::repository::{ProfileReader, ProfileWriter};
use crate::services::auth::CredentialProvider;
use crate::services::{ServiceError, ServiceResult};

async fn require_token<C>(credentials: &C) -> ServiceResult<AccessToken>
where
    C: CredentialProvider + ?Sized,
{
    credentials.get().await?.ok_or(ServiceError::Unauthorized)
}

/// Maps a rejected bearer token to a sign-out.
fn backend_error<C>(credentials: &C, err: RepositoryError) -> ServiceError
where
    C: CredentialProvider + ?Sized,
{
    match err {
        RepositoryError::Unauthorized => {
            log::warn!("Backend rejected the session, signing out");
            credentials.clear();
            ServiceError::Unauthorized
        }
        err => {
            log::error!("Profile request failed: {err}");
            ServiceError::from(err)
        }
    }
}

/// Loads the profile of the signed-in user.
pub async fn load_profile<R, C>(repo: &R, credentials: &C) -> ServiceResult<Option<Profile>>
where
    R: ProfileReader + ?Sized,
    C: CredentialProvider + ?Sized,
{
    let token = require_token(credentials).await?;

    repo.get_profile(&token)
        .await
        .map_err(|err| backend_error(credentials, err))
}

/// Sends the changed profile attributes and returns the resulting profile.
///
/// Nothing is sent when the form does not change anything.
pub async fn save_profile<R, C>(
    repo: &R,
    credentials: &C,
    form: ProfileForm,
    current: Option<&Profile>,
) -> ServiceResult<Profile>
where
    R: ProfileWriter + ?Sized,
    C: CredentialProvider + ?Sized,
{
    let update = form.into_update(current)?;
    let token = require_token(credentials).await?;

    let saved = repo
        .update_profile(&token, &update)
        .await
        .map_err(|err| backend_error(credentials, err))?;

    log::info!("Profile updated");
    Ok(saved.unwrap_or_else(|| current.cloned().unwrap_or_default().merged_with(&update)))
}

/// The lead-search key stored in the profile, if any.
pub async fn stored_api_key<R, C>(repo: &R, credentials: &C) -> ServiceResult<Option<String>>
where
    R: ProfileReader + ?Sized,
    C: CredentialProvider + ?Sized,
{
    let profile = load_profile(repo, credentials).await?;
    Ok(profile
        .as_ref()
        .and_then(Profile::stored_api_key)
        .map(str::to_string))
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::forms::FormError;
    use crate::repository::mock::{MockCredentials, MockRepository};

    fn signed_in() -> MockCredentials {
        let mut credentials = MockCredentials::new();
        credentials
            .expect_get()
            .returning(|| Ok(Some(AccessToken::new("bearer").unwrap())));
        credentials
    }

    fn stored() -> Profile {
        Profile {
            first_name: Some("Ada".to_string()),
            last_name: Some("Lovelace".to_string()),
            api_key: Some("key-1".to_string()),
            ..Profile::default()
        }
    }

    /// Ensures a missing session is reported without calling the backend.
    #[tokio::test]
    async fn load_requires_session() {
        let mut repo = MockRepository::new();
        repo.expect_get_profile().times(0);
        let mut credentials = MockCredentials::new();
        credentials.expect_get().returning(|| Ok(None));

        let result = load_profile(&repo, &credentials).await;

        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    /// Ensures a 401 from the backend clears the stored session.
    #[tokio::test]
    async fn rejected_token_clears_credentials() {
        let mut repo = MockRepository::new();
        repo.expect_get_profile()
            .returning(|_| Err(RepositoryError::Unauthorized));
        let mut credentials = signed_in();
        credentials.expect_clear().times(1).return_const(());

        let result = load_profile(&repo, &credentials).await;

        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    /// Ensures the stored key is exposed as the default credential.
    #[tokio::test]
    async fn stored_key_comes_from_profile() {
        let mut repo = MockRepository::new();
        repo.expect_get_profile()
            .withf(|token| token.as_str() == "bearer")
            .returning(|_| Ok(Some(stored())));

        let key = stored_api_key(&repo, &signed_in()).await.unwrap();

        assert_eq!(key.as_deref(), Some("key-1"));
    }

    /// Ensures only changed attributes are sent.
    #[tokio::test]
    async fn save_sends_only_changes() {
        let mut repo = MockRepository::new();
        repo.expect_update_profile()
            .withf(|_, update| {
                update.first_name.as_deref() == Some("Grace")
                    && update.last_name.is_none()
                    && update.api_key.is_none()
            })
            .returning(|_, _| Ok(None));
        let current = stored();
        let form = ProfileForm {
            first_name: "Grace".to_string(),
            last_name: "Lovelace".to_string(),
            api_key: String::new(),
        };

        let saved = save_profile(&repo, &signed_in(), form, Some(&current))
            .await
            .unwrap();

        assert_eq!(saved.full_name.as_deref(), Some("Grace Lovelace"));
        assert_eq!(saved.stored_api_key(), Some("key-1"));
    }

    /// Ensures an unchanged form issues no request.
    #[tokio::test]
    async fn save_without_changes_is_rejected() {
        let mut repo = MockRepository::new();
        repo.expect_update_profile().times(0);
        let mut credentials = MockCredentials::new();
        credentials.expect_get().times(0);
        let current = stored();
        let form = ProfileForm::from_profile(Some(&current));

        let result = save_profile(&repo, &credentials, form, Some(&current)).await;

        assert!(matches!(result, Err(ServiceError::Form(FormError::NoChanges))));
    }
}
