use serde::Serialize;
use serde_json::{Map, Value};

use crate::domain::types::PageNumber;

/// A single result row. The schema belongs to the external API and is not
/// validated locally.
pub type LeadRecord = Map<String, Value>;

/// One fetched batch of leads, numbered by fetch order within a session.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Page {
    pub number: PageNumber,
    pub leads: Vec<LeadRecord>,
}

impl Page {
    #[must_use]
    pub fn new(number: PageNumber, leads: Vec<LeadRecord>) -> Self {
        Self { number, leads }
    }
}

/// Lifecycle of a search session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    #[default]
    Idle,
    Submitting,
    LoadingPage,
    Error,
}

impl SearchStatus {
    /// A request is in flight.
    pub fn is_busy(self) -> bool {
        matches!(self, Self::Submitting | Self::LoadingPage)
    }
}
