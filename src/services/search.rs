//! Pagination controller and the search session it owns.
//!
//! The external API hands out a forward-only cursor, so pages are fetched
//! strictly in order: page one on submit, then each next page with the token
//! returned by the previous call. Already fetched pages are served from the
//! [`PageStore`] without touching the network.
//!
//! While a request is in flight `submit` and `fetch_next_page` do nothing, so
//! there is never more than one outstanding request per session.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::COST_PER_SEARCH;
use crate::PAGE_SIZE;
use crate::domain::filter::Query;
use crate::domain::lead::SearchStatus;
use crate::domain::types::{ApiKey, PageNumber, PaginationToken};
use crate::dto::search::{FindPeopleRequest, FindPeopleResponse, SearchView};
use crate::forms::FormError;
use crate::forms::search::{SearchForm, SearchPayload};
use crate::pagination::{PageLinks, PageStore};
use crate::repository::LeadSearcher;
use crate::services::{ServiceError, ServiceResult};

/// Mutable state of one search view.
#[derive(Debug, Default)]
struct SearchSession {
    query: Option<Query>,
    api_key: Option<ApiKey>,
    store: PageStore,
    /// Continuation token of the last successful call.
    token: Option<PaginationToken>,
    search_count: u64,
    status: SearchStatus,
    error_message: Option<String>,
    total: Option<u64>,
    success: Option<bool>,
}

impl SearchSession {
    /// Clears results of the previous submission. The search counter survives.
    fn start_submission(&mut self, query: Query, api_key: ApiKey) {
        self.store.reset();
        self.query = Some(query);
        self.api_key = Some(api_key);
        self.token = None;
        self.total = None;
        self.success = None;
        self.error_message = None;
        self.status = SearchStatus::Submitting;
    }

    fn record_page(&mut self, number: PageNumber, response: FindPeopleResponse) {
        let lead_count = response.leads.len();
        if lead_count > 0 {
            self.search_count += 1;
        }
        if response.total.is_some() {
            self.total = response.total;
        }
        if response.success.is_some() {
            self.success = response.success;
        }
        self.token = response.token;
        self.store.add_page(number, response.leads);
        self.store.select_page(number);
        self.error_message = None;
        self.status = SearchStatus::Idle;

        log::info!(
            "Fetched page {number} with {lead_count} leads, more pages: {}",
            self.token.is_some()
        );
    }

    fn record_failure(&mut self, message: String) {
        self.error_message = Some(message);
        self.status = SearchStatus::Error;
    }
}

/// Drives the lead-search API for a single search view.
pub struct SearchController<L> {
    api: L,
    page_size: usize,
    session: Mutex<SearchSession>,
}

impl<L> SearchController<L>
where
    L: LeadSearcher,
{
    pub fn new(api: L) -> Self {
        Self::with_page_size(api, PAGE_SIZE)
    }

    /// The page size is fixed for the lifetime of the controller.
    pub fn with_page_size(api: L, page_size: usize) -> Self {
        Self {
            api,
            page_size,
            session: Mutex::new(SearchSession::default()),
        }
    }

    pub fn api(&self) -> &L {
        &self.api
    }

    fn session(&self) -> MutexGuard<'_, SearchSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn status(&self) -> SearchStatus {
        self.session().status
    }

    /// Validates and submits a search form.
    pub async fn submit_form(&self, form: SearchForm) -> ServiceResult<()> {
        if form.api_key.trim().is_empty() {
            return Err(ServiceError::MissingCredential);
        }
        let payload = SearchPayload::try_from(form)?;
        self.submit(payload.query, &payload.api_key).await
    }

    /// Starts a new search and fetches its first page.
    ///
    /// Validation failures leave the session untouched and issue no request.
    /// A failed request leaves the session in [`SearchStatus::Error`] with the
    /// error message, ready for another submit.
    pub async fn submit(&self, query: Query, credential: &str) -> ServiceResult<()> {
        let api_key = ApiKey::new(credential).map_err(|_| {
            log::warn!("Search submitted without an API key");
            ServiceError::MissingCredential
        })?;
        if query.is_empty() {
            log::warn!("Search submitted without filters");
            return Err(FormError::EmptyQuery.into());
        }

        let request = {
            let mut session = self.session();
            if session.status.is_busy() {
                log::warn!("Ignoring submit while a request is in flight");
                return Ok(());
            }
            log::info!(
                "Submitting search on {}",
                query.keys().collect::<Vec<_>>().join(", ")
            );
            session.start_submission(query.clone(), api_key.clone());
            FindPeopleRequest::first_page(query, self.page_size)
        };

        let result = self.api.find_people(&api_key, &request).await;

        let mut session = self.session();
        match result {
            Ok(response) => {
                session.record_page(PageNumber::FIRST, response);
                Ok(())
            }
            Err(err) => {
                log::error!("Search request failed: {err}");
                session.record_failure(err.to_string());
                Err(err.into())
            }
        }
    }

    /// Fetches the page after the last loaded one and selects it.
    ///
    /// Does nothing when there are no further pages, nothing was submitted yet
    /// or a request is already in flight. A failed fetch keeps the token so
    /// the same page can be requested again.
    pub async fn fetch_next_page(&self) -> ServiceResult<()> {
        let (api_key, request, number) = {
            let mut session = self.session();
            if session.status.is_busy() {
                log::warn!("Ignoring page fetch while a request is in flight");
                return Ok(());
            }
            let (Some(query), Some(api_key), Some(token)) =
                (&session.query, &session.api_key, &session.token)
            else {
                log::debug!("No further pages to fetch");
                return Ok(());
            };

            let request = FindPeopleRequest::continuation(query.clone(), self.page_size, token.clone());
            let api_key = api_key.clone();
            let number = session.store.next_page_number();
            session.status = SearchStatus::LoadingPage;
            session.error_message = None;
            (api_key, request, number)
        };

        let result = self.api.find_people(&api_key, &request).await;

        let mut session = self.session();
        match result {
            Ok(response) => {
                session.record_page(number, response);
                Ok(())
            }
            Err(err) => {
                log::error!("Fetching page {number} failed: {err}");
                session.record_failure(err.to_string());
                Err(err.into())
            }
        }
    }

    /// Shows a loaded page or fetches the next one.
    ///
    /// Any other page is rejected with [`ServiceError::Sequencing`] because the
    /// API can only continue from the last issued token. Fetching while another
    /// request is in flight fails with [`ServiceError::Busy`].
    pub async fn go_to_page(&self, target: usize) -> ServiceResult<()> {
        let target = PageNumber::new(target)?;

        {
            let mut session = self.session();
            if session.store.select_page(target) {
                return Ok(());
            }
            if session.status.is_busy() {
                log::warn!("Ignoring request for page {target} while a request is in flight");
                return Err(ServiceError::Busy);
            }
            let next = session.store.next_page_number();
            if target != next || session.token.is_none() {
                log::warn!("Rejected request for page {target}, next loadable page is {next}");
                return Err(ServiceError::Sequencing {
                    requested: target.get(),
                    next: next.get(),
                });
            }
        }

        self.fetch_next_page().await?;
        if self.session().store.select_page(target) {
            Ok(())
        } else {
            Err(ServiceError::Busy)
        }
    }

    /// Read model of the session.
    pub fn view(&self) -> SearchView {
        let session = self.session();
        let has_more = session.token.is_some();
        let loading = session.status.is_busy();

        SearchView {
            status: session.status,
            error_message: session.error_message.clone(),
            current_page: session.store.current_page().get(),
            page_numbers: session.store.page_numbers(),
            has_more,
            visible_leads: session.store.visible_leads().to_vec(),
            all_leads: session.store.all_leads().to_vec(),
            total: session.total,
            success: session.success,
            search_count: session.search_count,
            total_cost: session.search_count as f64 * COST_PER_SEARCH,
            page_links: PageLinks::new(&session.store, has_more, loading),
        }
    }
}
