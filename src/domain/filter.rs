//! Search filters and the query object understood by the lead-search API.
//!
//! A [`FilterField`] is what the user edits; a [`Query`] is what gets sent.
//! Fields that carry no usable value never show up in the query.

use std::collections::BTreeMap;

use serde::Serialize;

/// Include/exclude term lists for a single API field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TermsFilter {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
}

/// Numeric bounds serialized with the API's operator keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RangeFilter {
    #[serde(rename = ">", skip_serializing_if = "Option::is_none")]
    pub more_than: Option<i64>,
    #[serde(rename = "<=", skip_serializing_if = "Option::is_none")]
    pub less_than_or_equal: Option<i64>,
}

/// A single filter expression of the query object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FilterExpression {
    Terms(TermsFilter),
    Range(RangeFilter),
}

impl FilterExpression {
    /// Shorthand for an include-only term filter.
    pub fn include<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Terms(TermsFilter {
            include: terms.into_iter().map(Into::into).collect(),
            exclude: Vec::new(),
        })
    }

    /// Shorthand for an exclude-only term filter.
    pub fn exclude<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Terms(TermsFilter {
            include: Vec::new(),
            exclude: terms.into_iter().map(Into::into).collect(),
        })
    }
}

/// User-editable predicate source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilterField {
    /// Free-text terms written under every backing API key.
    IncludeExclude {
        key: String,
        payload_keys: Vec<String>,
        include: Vec<String>,
        exclude: Vec<String>,
    },
    /// Headcount-style numeric bounds.
    Range {
        key: String,
        more_than: Option<i64>,
        less_than_or_equal: Option<i64>,
    },
}

impl FilterField {
    /// Form key of the field.
    pub fn key(&self) -> &str {
        match self {
            Self::IncludeExclude { key, .. } | Self::Range { key, .. } => key,
        }
    }

    /// Returns `true` when the field contributes nothing to a query.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::IncludeExclude {
                include, exclude, ..
            } => include.is_empty() && exclude.is_empty(),
            Self::Range {
                more_than,
                less_than_or_equal,
                ..
            } => more_than.is_none() && less_than_or_equal.is_none(),
        }
    }

    /// Builds the filter expression for this field, if it has a usable value.
    pub fn expression(&self) -> Option<FilterExpression> {
        if self.is_empty() {
            return None;
        }

        let expression = match self {
            Self::IncludeExclude {
                include, exclude, ..
            } => FilterExpression::Terms(TermsFilter {
                include: include.clone(),
                exclude: exclude.clone(),
            }),
            Self::Range {
                more_than,
                less_than_or_equal,
                ..
            } => FilterExpression::Range(RangeFilter {
                more_than: *more_than,
                less_than_or_equal: *less_than_or_equal,
            }),
        };

        Some(expression)
    }

    /// API keys the field's expression is written under.
    pub fn payload_keys(&self) -> Vec<&str> {
        match self {
            Self::IncludeExclude { payload_keys, .. } => {
                payload_keys.iter().map(String::as_str).collect()
            }
            Self::Range { key, .. } => vec![key.as_str()],
        }
    }
}

/// Mapping from API field name to filter expression.
///
/// Built fresh for every submission and never mutated after it is sent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Query(BTreeMap<String, FilterExpression>);

impl Query {
    /// Creates an empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion used by callers that assemble queries by hand.
    pub fn with(mut self, key: impl Into<String>, expression: FilterExpression) -> Self {
        self.0.insert(key.into(), expression);
        self
    }

    /// Writes the field's expression under each of its backing keys.
    pub fn apply(&mut self, field: &FilterField) {
        let Some(expression) = field.expression() else {
            return;
        };
        for key in field.payload_keys() {
            self.0.insert(key.to_string(), expression.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &str) -> Option<&FilterExpression> {
        self.0.get(key)
    }

    /// API field names present in the query, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<'a> FromIterator<&'a FilterField> for Query {
    fn from_iter<T: IntoIterator<Item = &'a FilterField>>(iter: T) -> Self {
        let mut query = Query::new();
        for field in iter {
            query.apply(field);
        }
        query
    }
}
