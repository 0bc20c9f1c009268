//! Domain values and entities shared by the search client layers.

pub mod filter;
pub mod lead;
pub mod profile;
pub mod session;
pub mod types;
