//! Client for the find-people lead-search API.
//!
//! Search forms are normalized into a [`domain::filter::Query`], submitted
//! through [`services::search::SearchController`] and paged through with the
//! API's continuation tokens. Fetched leads can be exported as JSON or CSV.

pub mod domain;
pub mod dto;
pub mod error_conversions;
pub mod forms;
pub mod models;
pub mod pagination;
pub mod repository;
pub mod services;

/// Number of leads requested per page.
pub const PAGE_SIZE: usize = 50;

/// Price of one find-people call that returned at least one lead.
pub const COST_PER_SEARCH: f64 = 0.019;
