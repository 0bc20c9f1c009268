//! Seams to the external collaborators: the lead-search API, the backend
//! profile/auth service and the local session storage.

use async_trait::async_trait;

use crate::domain::profile::{Profile, ProfileUpdate};
use crate::domain::session::{RefreshedSession, StoredSession};
use crate::domain::types::{AccessToken, ApiKey};
use crate::dto::search::{FindPeopleRequest, FindPeopleResponse};
use crate::repository::errors::RepositoryResult;

pub mod errors;
#[cfg(feature = "client")]
pub mod http;
#[cfg(feature = "test-mocks")]
pub mod mock;
pub mod session;

#[cfg(feature = "client")]
pub use http::HttpRepository;
pub use session::{FileSessionStore, MemorySessionStore};

#[async_trait]
pub trait LeadSearcher: Send + Sync {
    /// Issues one find-people call. The key is sent verbatim as `Authorization`.
    async fn find_people(
        &self,
        api_key: &ApiKey,
        request: &FindPeopleRequest,
    ) -> RepositoryResult<FindPeopleResponse>;
}

#[async_trait]
pub trait ProfileReader: Send + Sync {
    async fn get_profile(&self, token: &AccessToken) -> RepositoryResult<Option<Profile>>;
}

#[async_trait]
pub trait ProfileWriter: Send + Sync {
    /// Returns the stored profile when the backend echoes it back.
    async fn update_profile(
        &self,
        token: &AccessToken,
        update: &ProfileUpdate,
    ) -> RepositoryResult<Option<Profile>>;
}

#[async_trait]
pub trait TokenRefresher: Send + Sync {
    /// `Ok(None)` when the backend rejects the refresh token.
    async fn refresh_session(&self, refresh_token: &str)
    -> RepositoryResult<Option<RefreshedSession>>;
}

pub trait SessionStore: Send + Sync {
    fn load_session(&self) -> RepositoryResult<StoredSession>;
    fn store_session(&self, session: &StoredSession) -> RepositoryResult<()>;
    fn clear_session(&self) -> RepositoryResult<()>;
}
