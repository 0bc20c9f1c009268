//! Search form input and its normalization into the API query object.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::domain::filter::{FilterField, Query};
use crate::forms::FormError;

/// Catalogue entry for an include/exclude filter field.
#[derive(Debug)]
pub struct FieldConfig {
    pub key: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub include_placeholder: &'static str,
    pub exclude_placeholder: &'static str,
    /// API query keys populated by this field.
    pub payload_keys: &'static [&'static str],
}

/// Catalogue entry for a numeric range field.
#[derive(Debug)]
pub struct RangeFieldConfig {
    pub key: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub more_than_placeholder: &'static str,
    pub less_than_or_equal_placeholder: &'static str,
}

pub const INCLUDE_EXCLUDE_FIELDS: [FieldConfig; 4] = [
    FieldConfig {
        key: "location",
        label: "Location",
        description: "City, state, or country. For best results use alpha-2 codes (US, IN, FR).",
        include_placeholder: "US, IN, New York",
        exclude_placeholder: "Los Angeles",
        payload_keys: &["location"],
    },
    FieldConfig {
        key: "currentJobTitle",
        label: "Current Job Title",
        description: "Open text search for a person's current job title.",
        include_placeholder: "Software Engineer, Manager",
        exclude_placeholder: "Intern",
        payload_keys: &["currentJobTitle"],
    },
    FieldConfig {
        key: "industry",
        label: "Industry / Current Company",
        description: "Matches industry keywords and the company where the person currently works.",
        include_placeholder: "Google, Microsoft",
        exclude_placeholder: "Facebook",
        payload_keys: &["industry", "currentCompanyName"],
    },
    FieldConfig {
        key: "keyword",
        label: "Keyword",
        description: "Search across the entire profile (titles, descriptions, skills, education).",
        include_placeholder: "CEO, Co-Founder",
        exclude_placeholder: "Sales",
        payload_keys: &["keyword"],
    },
];

pub const HEADCOUNT_FIELD: RangeFieldConfig = RangeFieldConfig {
    key: "headcount",
    label: "Headcount (Staff Size)",
    description: "Filter by company size using more-than and less-than operators.",
    more_than_placeholder: "10",
    less_than_or_equal_placeholder: "20",
};

/// Looks up an include/exclude field by its form key.
pub fn field_config(key: &str) -> Option<&'static FieldConfig> {
    INCLUDE_EXCLUDE_FIELDS.iter().find(|config| config.key == key)
}

/// Raw comma-separated include/exclude text of one field.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct IncludeExcludeInput {
    #[serde(default)]
    pub include: String,
    #[serde(default)]
    pub exclude: String,
}

/// Raw headcount bounds as typed by the user.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeInput {
    #[serde(default)]
    pub more_than: String,
    #[serde(default)]
    pub less_than_or_equal: String,
}

/// Structured search form: include/exclude text per field plus headcount.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchForm {
    #[serde(default)]
    pub api_key: String,
    /// Keyed by [`FieldConfig::key`].
    #[serde(default)]
    pub filters: BTreeMap<String, IncludeExcludeInput>,
    #[serde(default)]
    pub headcount: RangeInput,
}

impl SearchForm {
    /// Sets the include text of a field.
    pub fn include(mut self, key: &str, terms: impl Into<String>) -> Self {
        self.filters.entry(key.to_string()).or_default().include = terms.into();
        self
    }

    /// Sets the exclude text of a field.
    pub fn exclude(mut self, key: &str, terms: impl Into<String>) -> Self {
        self.filters.entry(key.to_string()).or_default().exclude = terms.into();
        self
    }

    /// Parses every field of the form, including the empty ones.
    pub fn fields(&self) -> Vec<FilterField> {
        let mut fields: Vec<FilterField> = self
            .filters
            .iter()
            .map(|(key, input)| {
                let payload_keys = match field_config(key) {
                    Some(config) => config.payload_keys.iter().map(|k| k.to_string()).collect(),
                    None => {
                        log::debug!("Unknown filter field {key}, sending it under its own name");
                        vec![key.clone()]
                    }
                };
                FilterField::IncludeExclude {
                    key: key.clone(),
                    payload_keys,
                    include: split_terms(&input.include),
                    exclude: split_terms(&input.exclude),
                }
            })
            .collect();

        fields.push(FilterField::Range {
            key: HEADCOUNT_FIELD.key.to_string(),
            more_than: parse_bound(&self.headcount.more_than),
            less_than_or_equal: parse_bound(&self.headcount.less_than_or_equal),
        });

        fields
    }
}

/// Converts the form into the API query object.
///
/// Never fails: fields without a usable value are left out, so a blank form
/// yields an empty query. Callers decide whether an empty query is acceptable.
pub fn normalize(form: &SearchForm) -> Query {
    form.fields().iter().collect()
}

/// Splits comma-separated text, trimming tokens and dropping empty ones.
fn split_terms(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(str::to_string)
        .collect()
}

/// Values that are not integers count as absent.
fn parse_bound(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

/// Query and credential extracted from a submitted search form.
#[derive(Debug)]
pub struct SearchPayload {
    pub query: Query,
    pub api_key: String,
}

impl TryFrom<SearchForm> for SearchPayload {
    type Error = FormError;

    fn try_from(form: SearchForm) -> Result<Self, Self::Error> {
        let query = normalize(&form);
        if query.is_empty() {
            return Err(FormError::EmptyQuery);
        }
        Ok(Self {
            query,
            api_key: form.api_key,
        })
    }
}

/// Single-text search form: one text box per field, include-only.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickSearchForm {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub keywords: String,
    #[serde(default)]
    pub job_titles: String,
    /// Free text such as `"> 50"` or `"50"`.
    #[serde(default)]
    pub staff_size: String,
}

impl From<QuickSearchForm> for SearchForm {
    fn from(form: QuickSearchForm) -> Self {
        let mut search = SearchForm {
            api_key: form.api_key,
            ..SearchForm::default()
        }
        .include("location", form.location)
        .include("industry", form.industry)
        .include("keyword", form.keywords)
        .include("currentJobTitle", form.job_titles);

        if let Some(more_than) = parse_staff_size(&form.staff_size) {
            search.headcount.more_than = more_than;
        }
        search
    }
}

/// Picks the number after `>` if present, otherwise the first number.
fn parse_staff_size(raw: &str) -> Option<String> {
    let after_gt = raw
        .match_indices('>')
        .find_map(|(idx, _)| leading_digits(raw[idx + 1..].trim_start()));

    after_gt
        .or_else(|| {
            raw.find(|c: char| c.is_ascii_digit())
                .and_then(|idx| leading_digits(&raw[idx..]))
        })
        .map(str::to_string)
}

fn leading_digits(s: &str) -> Option<&str> {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    (end > 0).then(|| &s[..end])
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::filter::FilterExpression;

    fn as_json(query: &Query) -> serde_json::Value {
        serde_json::to_value(query).unwrap()
    }

    /// Ensures a blank form yields an empty query.
    #[test]
    fn blank_form_normalizes_to_empty_query() {
        let form = SearchForm::default()
            .include("location", "  ")
            .exclude("keyword", " , ,");

        assert!(normalize(&form).is_empty());
    }

    /// Ensures terms are trimmed and blank terms dropped.
    #[test]
    fn terms_are_trimmed_and_filtered() {
        let form = SearchForm::default().include("location", " a , ,b ");

        assert_eq!(
            normalize(&form).get("location"),
            Some(&FilterExpression::include(["a", "b"]))
        );
    }

    /// Ensures industry terms also filter on the company name.
    #[test]
    fn industry_populates_both_backing_keys() {
        let form = SearchForm::default().include("industry", "Google");

        assert_eq!(
            as_json(&normalize(&form)),
            json!({
                "industry": {"include": ["Google"]},
                "currentCompanyName": {"include": ["Google"]},
            })
        );
    }

    /// Ensures a headcount bound that is not a number is left out.
    #[test]
    fn unparseable_headcount_bound_is_dropped() {
        let mut form = SearchForm::default();
        form.headcount.more_than = "10".to_string();
        form.headcount.less_than_or_equal = "abc".to_string();

        assert_eq!(as_json(&normalize(&form)), json!({"headcount": {">": 10}}));
    }

    /// Ensures include and exclude terms of a field share one expression.
    #[test]
    fn include_and_exclude_share_one_filter_object() {
        let form = SearchForm::default()
            .include("currentJobTitle", "Engineer, Manager")
            .exclude("currentJobTitle", "Intern");

        assert_eq!(
            as_json(&normalize(&form)),
            json!({"currentJobTitle": {"include": ["Engineer", "Manager"], "exclude": ["Intern"]}})
        );
    }

    /// Ensures fields outside the catalogue keep their own key.
    #[test]
    fn unknown_fields_use_their_own_key() {
        let form = SearchForm::default().include("skills", "rust");

        assert_eq!(as_json(&normalize(&form)), json!({"skills": {"include": ["rust"]}}));
    }

    /// Ensures a payload is never built from an empty query.
    #[test]
    fn payload_rejects_empty_query() {
        let form = SearchForm {
            api_key: "key".to_string(),
            ..SearchForm::default()
        };

        assert!(matches!(
            SearchPayload::try_from(form),
            Err(FormError::EmptyQuery)
        ));
    }

    /// Ensures the form reads the camelCase JSON body.
    #[test]
    fn form_deserializes_from_camel_case_json() {
        let form: SearchForm = serde_json::from_value(json!({
            "apiKey": "key",
            "filters": {"location": {"include": "US"}},
            "headcount": {"moreThan": "5", "lessThanOrEqual": "50"},
        }))
        .unwrap();

        assert_eq!(
            as_json(&normalize(&form)),
            json!({"location": {"include": ["US"]}, "headcount": {">": 5, "<=": 50}})
        );
    }

    /// Ensures the quick form maps onto the structured fields.
    #[test]
    fn quick_form_maps_onto_structured_fields() {
        let quick = QuickSearchForm {
            api_key: "key".to_string(),
            location: "US, FR".to_string(),
            keywords: "CEO".to_string(),
            job_titles: "Founder".to_string(),
            staff_size: "between 5 and > 50".to_string(),
            ..QuickSearchForm::default()
        };

        let form = SearchForm::from(quick);

        assert_eq!(form.api_key, "key");
        assert_eq!(
            as_json(&normalize(&form)),
            json!({
                "location": {"include": ["US", "FR"]},
                "keyword": {"include": ["CEO"]},
                "currentJobTitle": {"include": ["Founder"]},
                "headcount": {">": 50},
            })
        );
    }

    /// Ensures the staff size text falls back to its first number.
    #[test]
    fn staff_size_falls_back_to_first_number() {
        assert_eq!(parse_staff_size("about 200 people"), Some("200".to_string()));
        assert_eq!(parse_staff_size(">  15"), Some("15".to_string()));
        assert_eq!(parse_staff_size("> many"), None);
        assert_eq!(parse_staff_size(""), None);
    }
}
