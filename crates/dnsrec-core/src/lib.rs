// # dnsrec-core
//
// Core library for reconciling declared DNS records against a provider's
// zone record API.
//
// ## Architecture Overview
//
// - **RecordReconciler**: Create/Read/Update/Delete/Import for one record,
//   translating between declared fields and API calls
// - **ZoneRecordApi**: Trait for the provider API client
// - **StateStore**: Trait for the declarative state holder
// - **RecordLifecycle**: Plans changes and writes reconciler outcomes to state
// - **ProviderRegistry**: Plugin-based registry for API clients and stores
//
// ## Design Principles
//
// 1. **Explicit dependencies**: Every reconciler call receives its API client
//    and account; nothing is global
// 2. **Typed boundary**: Fields are deserialized once into `RecordSpec` and
//    `RecordState`; internal logic never reads an untyped map
// 3. **Typed failures**: A missing record is recognized by its HTTP status,
//    never by the text of an error message
// 4. **Single shot**: One API round trip per step, no retries

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod plan;
pub mod reconciler;
pub mod record;
pub mod registry;
pub mod state;
pub mod traits;

// Re-export core types for convenience
pub use config::{Manifest, ProviderConfig, ResourceConfig, StateStoreConfig};
pub use error::{ApiError, Error, Result};
pub use lifecycle::{ApplyOutcome, RecordLifecycle};
pub use plan::Plan;
pub use reconciler::{ReadOutcome, RecordReconciler};
pub use record::{
    ImportKey, RecordSpec, RecordState, ZoneRecord, ZoneRecordAttributes, ZoneRecordUpdate,
};
pub use registry::ProviderRegistry;
pub use state::{FileStateStore, MemoryStateStore};
pub use traits::{StateStore, StoredResource, ZoneRecordApi, ZoneRecordApiFactory};
