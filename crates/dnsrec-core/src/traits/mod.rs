//! Core traits for the record reconciler
//!
//! This module defines the abstract interfaces of the two external collaborators.
//!
//! - [`ZoneRecordApi`]: Fetch and mutate zone records via a provider API
//! - [`StateStore`]: Hold tracked resource state between runs

pub mod api_client;
pub mod state_store;

pub use api_client::{ZoneRecordApi, ZoneRecordApiFactory};
pub use state_store::{StateStore, StateStoreFactory, StoredResource};
