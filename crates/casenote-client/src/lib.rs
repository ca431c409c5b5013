//! # casenote-client
//!
//! Fetch pipeline for the casenote aggregator: the outbound fetch
//! capability, the record source adapter, the detail enricher, and the
//! aggregation pipeline that joins them while isolating every failure to
//! its own note or source.

pub mod config;
pub mod enrich;
pub mod fetch;
pub mod mock;
pub mod pipeline;
pub mod source;

pub use config::ClientConfig;
pub use fetch::{FetchResponse, HttpFetcher, RecordFetch};
pub use source::CaseNoteClient;
