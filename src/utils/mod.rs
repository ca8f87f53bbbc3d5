//! Utilities module aggregator exposing path and testing helpers.

pub mod path;
