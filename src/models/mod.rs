//! HTTP API request / response types.

pub mod snippet;
