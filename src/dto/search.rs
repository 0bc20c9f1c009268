//! Wire format of the find-people API and the read model of a search session.

use serde::Serialize;
use serde_json::Value;

use crate::domain::filter::Query;
use crate::domain::lead::{LeadRecord, SearchStatus};
use crate::domain::types::PaginationToken;
use crate::pagination::PageLinks;

/// Pagination block of a find-people request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RequestPagination {
    pub size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<PaginationToken>,
}

/// Body POSTed to the find-people endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FindPeopleRequest {
    pub query: Query,
    pub pagination: RequestPagination,
}

impl FindPeopleRequest {
    /// Request for the first page of a query.
    pub fn first_page(query: Query, size: usize) -> Self {
        Self {
            query,
            pagination: RequestPagination { size, token: None },
        }
    }

    /// Request continuing from a previously returned token.
    pub fn continuation(query: Query, size: usize, token: PaginationToken) -> Self {
        Self {
            query,
            pagination: RequestPagination {
                size,
                token: Some(token),
            },
        }
    }
}

/// One page of results as returned by the find-people endpoint.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FindPeopleResponse {
    pub leads: Vec<LeadRecord>,
    /// Server-reported number of matches.
    pub total: Option<u64>,
    pub success: Option<bool>,
    /// `None` when there are no further pages.
    pub token: Option<PaginationToken>,
}

impl FindPeopleResponse {
    /// Extracts a page from a decoded response body.
    ///
    /// The body may be wrapped in a one-element array. A missing or malformed
    /// `leads` field yields an empty page, and a missing or blank token means
    /// the result set is exhausted.
    pub fn from_value(value: Value) -> Self {
        let mut body = match value {
            Value::Array(items) => items.into_iter().next().unwrap_or(Value::Null),
            other => other,
        };

        let leads = match body.get_mut("leads").map(Value::take) {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(record) => Some(record),
                    other => {
                        log::warn!("Skipping non-object lead entry: {other}");
                        None
                    }
                })
                .collect(),
            Some(Value::Null) | None => Vec::new(),
            Some(other) => {
                log::warn!("Response field `leads` is not an array: {other}");
                Vec::new()
            }
        };

        let token = body
            .get("pagination")
            .and_then(|pagination| pagination.get("token"))
            .and_then(Value::as_str)
            .and_then(|token| PaginationToken::new(token).ok());

        Self {
            leads,
            total: body.get("total").and_then(Value::as_u64),
            success: body.get("success").and_then(Value::as_bool),
            token,
        }
    }
}

/// Snapshot of a search session rendered by the presentation layer.
#[derive(Clone, Debug, Serialize)]
pub struct SearchView {
    pub status: SearchStatus,
    pub error_message: Option<String>,
    pub current_page: usize,
    /// Loaded page numbers, ascending.
    pub page_numbers: Vec<usize>,
    pub has_more: bool,
    pub visible_leads: Vec<LeadRecord>,
    pub all_leads: Vec<LeadRecord>,
    pub total: Option<u64>,
    pub success: Option<bool>,
    /// Successful calls that returned at least one lead.
    pub search_count: u64,
    pub total_cost: f64,
    pub page_links: PageLinks,
}

impl SearchView {
    pub fn is_loading(&self) -> bool {
        self.status.is_busy()
    }

    /// Cost formatted the way it is displayed next to the search form.
    pub fn formatted_cost(&self) -> String {
        format!("{:.3}", self.total_cost)
    }
}
