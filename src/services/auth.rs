//! Bearer session handling for calls to the backend service.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::session::StoredSession;
use crate::domain::types::AccessToken;
use crate::repository::{SessionStore, TokenRefresher};
use crate::services::{ServiceError, ServiceResult};

/// Source of the current backend bearer token.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Returns a usable access token, or `None` when the user must sign in.
    async fn get(&self) -> ServiceResult<Option<AccessToken>>;

    /// Forgets the stored session.
    fn clear(&self);
}

/// Credential provider backed by a session store and the refresh endpoint.
pub struct SessionCredentials<S, R> {
    store: S,
    refresher: R,
}

impl<S, R> SessionCredentials<S, R>
where
    S: SessionStore,
    R: TokenRefresher,
{
    pub fn new(store: S, refresher: R) -> Self {
        Self { store, refresher }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[async_trait]
impl<S, R> CredentialProvider for SessionCredentials<S, R>
where
    S: SessionStore,
    R: TokenRefresher,
{
    async fn get(&self) -> ServiceResult<Option<AccessToken>> {
        ensure_fresh_token(&self.store, &self.refresher, Utc::now()).await
    }

    fn clear(&self) {
        clear_session(&self.store);
    }
}

fn clear_session<S>(store: &S)
where
    S: SessionStore + ?Sized,
{
    if let Err(err) = store.clear_session() {
        log::error!("Failed to clear stored session: {err}");
    }
}

/// Returns a fresh access token, refreshing the stored session when needed.
///
/// A session that cannot be refreshed is cleared.
pub async fn ensure_fresh_token<S, R>(
    store: &S,
    refresher: &R,
    now: DateTime<Utc>,
) -> ServiceResult<Option<AccessToken>>
where
    S: SessionStore + ?Sized,
    R: TokenRefresher + ?Sized,
{
    let session = store.load_session().map_err(|err| {
        log::error!("Failed to load stored session: {err}");
        ServiceError::from(err)
    })?;

    if session.is_empty() {
        return Ok(None);
    }

    if let Some(access_token) = session.access_token.as_deref() {
        if session.is_access_token_fresh(now) {
            return Ok(AccessToken::new(access_token).ok());
        }
    }

    let Some(refresh_token) = session.refresh_token.as_deref() else {
        log::info!("Access token expired and no refresh token is stored");
        clear_session(store);
        return Ok(None);
    };

    match refresher.refresh_session(refresh_token).await {
        Ok(Some(refreshed)) if !refreshed.access_token.trim().is_empty() => {
            let stored = refreshed.into_stored(&session, now);
            store_refreshed(store, &stored)?;
            log::info!("Session refreshed");
            Ok(stored.access_token.and_then(|token| AccessToken::new(token).ok()))
        }
        Ok(_) => {
            log::info!("Refresh token rejected, clearing session");
            clear_session(store);
            Ok(None)
        }
        Err(err) => {
            log::warn!("Refresh token call failed: {err}");
            clear_session(store);
            Ok(None)
        }
    }
}

/// Stores the tokens handed out by the sign-in redirect.
pub fn sign_in<S>(
    store: &S,
    access_token: &str,
    refresh_token: Option<&str>,
    expires_at: Option<i64>,
) -> ServiceResult<()>
where
    S: SessionStore + ?Sized,
{
    let access_token = AccessToken::new(access_token)?;
    let session = StoredSession {
        access_token: Some(access_token.into_inner()),
        refresh_token: refresh_token
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string),
        expires_at,
    };

    store.store_session(&session).map_err(|err| {
        log::error!("Failed to store session: {err}");
        ServiceError::from(err)
    })?;
    log::info!("Signed in");
    Ok(())
}

fn store_refreshed<S>(store: &S, session: &StoredSession) -> ServiceResult<()>
where
    S: SessionStore + ?Sized,
{
    store.store_session(session).map_err(|err| {
        log::error!("Failed to store refreshed session: {err}");
        ServiceError::from(err)
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::domain::session::RefreshedSession;
    use crate::repository::MemorySessionStore;
    use crate::repository::errors::{RepositoryError, RepositoryResult};

    const NOW: i64 = 1_700_000_000;

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(NOW, 0).single().expect("valid timestamp")
    }

    enum Reply {
        Session(RefreshedSession),
        Rejected,
        Offline,
    }

    struct FakeRefresher(Reply);

    #[async_trait]
    impl TokenRefresher for FakeRefresher {
        async fn refresh_session(
            &self,
            refresh_token: &str,
        ) -> RepositoryResult<Option<RefreshedSession>> {
            assert_eq!(refresh_token, "refresh");
            match &self.0 {
                Reply::Session(session) => Ok(Some(session.clone())),
                Reply::Rejected => Ok(None),
                Reply::Offline => Err(RepositoryError::ConnectionError("offline".into())),
            }
        }
    }

    /// Refresher that fails the test when called.
    struct UnusedRefresher;

    #[async_trait]
    impl TokenRefresher for UnusedRefresher {
        async fn refresh_session(&self, _: &str) -> RepositoryResult<Option<RefreshedSession>> {
            panic!("refresh must not be called");
        }
    }

    fn stored(access: Option<&str>, refresh: Option<&str>, expires_at: Option<i64>) -> StoredSession {
        StoredSession {
            access_token: access.map(str::to_string),
            refresh_token: refresh.map(str::to_string),
            expires_at,
        }
    }

    /// Ensures an empty store yields no token.
    #[tokio::test]
    async fn empty_session_has_no_token() {
        let store = MemorySessionStore::default();

        let token = ensure_fresh_token(&store, &UnusedRefresher, now()).await.unwrap();

        assert!(token.is_none());
    }

    /// Ensures a token outside the refresh margin is returned without refreshing.
    #[tokio::test]
    async fn fresh_token_is_returned_as_is() {
        let store = MemorySessionStore::new(stored(Some("access"), Some("refresh"), Some(NOW + 600)));

        let token = ensure_fresh_token(&store, &UnusedRefresher, now()).await.unwrap();

        assert_eq!(token.unwrap().as_str(), "access");
    }

    /// Ensures an expired token without a refresh token clears the session.
    #[tokio::test]
    async fn expired_token_without_refresh_token_clears_session() {
        let store = MemorySessionStore::new(stored(Some("access"), None, Some(NOW + 30)));

        let token = ensure_fresh_token(&store, &UnusedRefresher, now()).await.unwrap();

        assert!(token.is_none());
        assert!(store.load_session().unwrap().is_empty());
    }

    /// Ensures a successful refresh is stored and keeps the old refresh token.
    #[tokio::test]
    async fn refresh_stores_new_session() {
        let store = MemorySessionStore::new(stored(Some("old"), Some("refresh"), Some(NOW - 10)));
        let refresher = FakeRefresher(Reply::Session(RefreshedSession {
            access_token: "new".to_string(),
            refresh_token: None,
            expires_at: None,
            expires_in: Some(3600),
        }));

        let token = ensure_fresh_token(&store, &refresher, now()).await.unwrap();

        assert_eq!(token.unwrap().as_str(), "new");
        assert_eq!(
            store.load_session().unwrap(),
            stored(Some("new"), Some("refresh"), Some(NOW + 3600))
        );
    }

    /// Ensures sign-in stores the tokens and rejects a blank access token.
    #[test]
    fn sign_in_stores_tokens() {
        let store = MemorySessionStore::default();

        assert!(matches!(
            sign_in(&store, " ", None, None),
            Err(ServiceError::TypeConstraint(_))
        ));
        sign_in(&store, "access", Some(" "), Some(NOW)).unwrap();

        assert_eq!(store.load_session().unwrap(), stored(Some("access"), None, Some(NOW)));
    }

    /// Ensures the credential provider clears the backing store.
    #[tokio::test]
    async fn session_credentials_clear_store() {
        let credentials = SessionCredentials::new(
            MemorySessionStore::new(stored(Some("access"), None, None)),
            UnusedRefresher,
        );

        assert_eq!(credentials.get().await.unwrap().unwrap().as_str(), "access");
        credentials.clear();

        assert!(credentials.get().await.unwrap().is_none());
        assert!(credentials.store().load_session().unwrap().is_empty());
    }

    /// Ensures a rejected or failed refresh signs the user out.
    #[tokio::test]
    async fn failed_refresh_clears_session() {
        for reply in [Reply::Rejected, Reply::Offline] {
            let store = MemorySessionStore::new(stored(None, Some("refresh"), None));

            let token = ensure_fresh_token(&store, &FakeRefresher(reply), now())
                .await
                .unwrap();

            assert!(token.is_none());
            assert!(store.load_session().unwrap().is_empty());
        }
    }
}
