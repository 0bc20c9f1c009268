//! Documents produced by the export buttons.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::lead::LeadRecord;

/// JSON export of fetched leads.
#[derive(Debug, Serialize)]
pub struct JsonExport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    pub leads: &'a [LeadRecord],
    #[serde(rename = "downloadedAt")]
    pub downloaded_at: DateTime<Utc>,
}
