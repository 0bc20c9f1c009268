//! reqwest-backed implementation of the collaborator traits.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use serde_json::{Value, json};

use crate::domain::profile::{Profile, ProfileUpdate};
use crate::domain::session::RefreshedSession;
use crate::domain::types::{AccessToken, ApiKey};
use crate::dto::search::{FindPeopleRequest, FindPeopleResponse};
use crate::models::config::AppConfig;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{LeadSearcher, ProfileReader, ProfileWriter, TokenRefresher};

/// Talks to the find-people endpoint and the backend service over HTTP.
#[derive(Clone, Debug)]
pub struct HttpRepository {
    client: reqwest::Client,
    find_people_url: String,
    api_base_url: String,
}

impl HttpRepository {
    pub fn new(config: &AppConfig) -> RepositoryResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            find_people_url: config.find_people_url.clone(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn profile_url(&self) -> String {
        format!("{}/icp/api/profile", self.api_base_url)
    }

    fn refresh_url(&self) -> String {
        format!("{}/api/auth/refresh", self.api_base_url)
    }
}

/// Reads the body, mapping non-success statuses to [`RepositoryError::Api`].
async fn read_body(response: reqwest::Response) -> RepositoryResult<String> {
    let status = response.status();
    let body = response.text().await?;

    if status == StatusCode::UNAUTHORIZED {
        return Err(RepositoryError::Unauthorized);
    }
    if !status.is_success() {
        return Err(RepositoryError::from_status(
            status.as_u16(),
            status.canonical_reason(),
            &body,
        ));
    }
    Ok(body)
}

fn parse_profile(body: &str) -> Option<Profile> {
    let mut value: Value = serde_json::from_str(body).ok()?;
    let profile = value.get_mut("profile").map(Value::take)?;
    match serde_json::from_value(profile) {
        Ok(profile) => Some(profile),
        Err(err) => {
            log::warn!("Ignoring malformed profile payload: {err}");
            None
        }
    }
}

#[async_trait]
impl LeadSearcher for HttpRepository {
    async fn find_people(
        &self,
        api_key: &ApiKey,
        request: &FindPeopleRequest,
    ) -> RepositoryResult<FindPeopleResponse> {
        let response = self
            .client
            .post(&self.find_people_url)
            .header(AUTHORIZATION, api_key.as_str())
            .json(request)
            .send()
            .await?;

        // A 401 here is a rejected API key, not an expired session.
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(RepositoryError::from_status(
                status.as_u16(),
                status.canonical_reason(),
                &body,
            ));
        }

        let value: Value = serde_json::from_str(&body)
            .map_err(|err| RepositoryError::Unexpected(format!("Invalid JSON response: {err}")))?;

        Ok(FindPeopleResponse::from_value(value))
    }
}

#[async_trait]
impl ProfileReader for HttpRepository {
    async fn get_profile(&self, token: &AccessToken) -> RepositoryResult<Option<Profile>> {
        let response = self
            .client
            .get(self.profile_url())
            .bearer_auth(token.as_str())
            .send()
            .await?;

        let body = read_body(response).await?;
        Ok(parse_profile(&body))
    }
}

#[async_trait]
impl ProfileWriter for HttpRepository {
    async fn update_profile(
        &self,
        token: &AccessToken,
        update: &ProfileUpdate,
    ) -> RepositoryResult<Option<Profile>> {
        let response = self
            .client
            .put(self.profile_url())
            .bearer_auth(token.as_str())
            .json(update)
            .send()
            .await?;

        let body = read_body(response).await?;
        Ok(parse_profile(&body))
    }
}

#[async_trait]
impl TokenRefresher for HttpRepository {
    async fn refresh_session(
        &self,
        refresh_token: &str,
    ) -> RepositoryResult<Option<RefreshedSession>> {
        let response = self
            .client
            .post(self.refresh_url())
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            return Ok(None);
        }

        let body = read_body(response).await?;
        let mut value: Value = serde_json::from_str(&body)?;
        let session = match value.get_mut("session").map(Value::take) {
            Some(session @ Value::Object(_)) => session,
            _ => value,
        };

        Ok(serde_json::from_value(session).ok())
    }
}
