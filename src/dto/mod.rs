//! DTO modules that bridge services with the API and the presentation layer.

pub mod export;
pub mod search;
