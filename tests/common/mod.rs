//! Shared fixtures for integration tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use pushkind_leads::domain::types::ApiKey;
use pushkind_leads::dto::search::{FindPeopleRequest, FindPeopleResponse};
use pushkind_leads::repository::LeadSearcher;
use pushkind_leads::repository::errors::RepositoryResult;

/// Lead-search API answering with raw response bodies, in order.
pub struct FakeApi {
    bodies: Mutex<VecDeque<Value>>,
    requests: Mutex<Vec<(String, Value)>>,
}

impl FakeApi {
    pub fn new(bodies: impl IntoIterator<Item = Value>) -> Self {
        Self {
            bodies: Mutex::new(bodies.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Authorization header and JSON body of every request sent so far.
    pub fn requests(&self) -> Vec<(String, Value)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LeadSearcher for FakeApi {
    async fn find_people(
        &self,
        api_key: &ApiKey,
        request: &FindPeopleRequest,
    ) -> RepositoryResult<FindPeopleResponse> {
        let body = serde_json::to_value(request).unwrap();
        self.requests
            .lock()
            .unwrap()
            .push((api_key.as_str().to_string(), body));
        let response = self
            .bodies
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected find-people request");
        Ok(FindPeopleResponse::from_value(response))
    }
}
