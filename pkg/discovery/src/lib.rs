//! Cluster discovery: the HTTP client, the resource-catalog aggregator,
//! namespace and subject suggestions, and the stale-response guard.

pub mod catalog;
pub mod client;
pub mod generation;
pub mod subjects;

pub use catalog::{Discovery, discover_resources};
pub use client::{ClientOptions, ClusterClient};
pub use generation::{Fetched, Generation, Ticket};
