//! Mock collaborators for isolating services in tests.

use async_trait::async_trait;
use mockall::mock;

use crate::domain::profile::{Profile, ProfileUpdate};
use crate::domain::session::{RefreshedSession, StoredSession};
use crate::domain::types::{AccessToken, ApiKey};
use crate::dto::search::{FindPeopleRequest, FindPeopleResponse};
use crate::repository::errors::RepositoryResult;
use crate::repository::{LeadSearcher, ProfileReader, ProfileWriter, SessionStore, TokenRefresher};
use crate::services::ServiceResult;
use crate::services::auth::CredentialProvider;

mock! {
    pub Repository {}

    #[async_trait]
    impl LeadSearcher for Repository {
        async fn find_people(
            &self,
            api_key: &ApiKey,
            request: &FindPeopleRequest,
        ) -> RepositoryResult<FindPeopleResponse>;
    }

    #[async_trait]
    impl ProfileReader for Repository {
        async fn get_profile(&self, token: &AccessToken) -> RepositoryResult<Option<Profile>>;
    }

    #[async_trait]
    impl ProfileWriter for Repository {
        async fn update_profile(
            &self,
            token: &AccessToken,
            update: &ProfileUpdate,
        ) -> RepositoryResult<Option<Profile>>;
    }

    #[async_trait]
    impl TokenRefresher for Repository {
        async fn refresh_session(
            &self,
            refresh_token: &str,
        ) -> RepositoryResult<Option<RefreshedSession>>;
    }
}

mock! {
    pub SessionStorage {}

    impl SessionStore for SessionStorage {
        fn load_session(&self) -> RepositoryResult<StoredSession>;
        fn store_session(&self, session: &StoredSession) -> RepositoryResult<()>;
        fn clear_session(&self) -> RepositoryResult<()>;
    }
}

mock! {
    pub Credentials {}

    #[async_trait]
    impl CredentialProvider for Credentials {
        async fn get(&self) -> ServiceResult<Option<AccessToken>>;
        fn clear(&self);
    }
}
