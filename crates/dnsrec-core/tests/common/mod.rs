//! Test doubles and common utilities for contract tests
//!
//! `MockZoneApi` behaves like a small in-memory zone record service and
//! records every call it receives, so tests can assert both outcomes and
//! outgoing payloads.

#![allow(dead_code)]

use async_trait::async_trait;
use dnsrec_core::error::ApiError;
use dnsrec_core::record::{ZoneRecord, ZoneRecordAttributes, ZoneRecordUpdate};
use dnsrec_core::traits::ZoneRecordApi;
use dnsrec_core::RecordSpec;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

pub const ACCOUNT: &str = "1010";

/// A call received by the mock
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    Create {
        account: String,
        zone: String,
        attributes: ZoneRecordAttributes,
    },
    Get {
        account: String,
        zone: String,
        id: i64,
    },
    Update {
        account: String,
        zone: String,
        id: i64,
        update: ZoneRecordUpdate,
    },
    Delete {
        account: String,
        zone: String,
        id: i64,
    },
}

impl ApiCall {
    pub fn kind(&self) -> &'static str {
        match self {
            ApiCall::Create { .. } => "create",
            ApiCall::Get { .. } => "get",
            ApiCall::Update { .. } => "update",
            ApiCall::Delete { .. } => "delete",
        }
    }
}

#[derive(Default)]
struct Inner {
    records: Mutex<HashMap<(String, i64), ZoneRecord>>,
    calls: Mutex<Vec<ApiCall>>,
    failures: Mutex<HashMap<&'static str, (usize, ApiError)>>,
    next_id: AtomicI64,
}

/// In-memory zone record service; clones share the same zones
#[derive(Clone, Default)]
pub struct MockZoneApi {
    inner: Arc<Inner>,
}

impl MockZoneApi {
    pub fn new() -> Self {
        let api = Self::default();
        api.inner.next_id.store(1000, Ordering::SeqCst);
        api
    }

    /// Make the next call of `kind` fail with `error`
    pub fn fail_next(&self, kind: &'static str, error: ApiError) {
        self.fail_after(kind, 0, error);
    }

    /// Let `skip` calls of `kind` through, then fail the one after with `error`
    pub fn fail_after(&self, kind: &'static str, skip: usize, error: ApiError) {
        self.inner
            .failures
            .lock()
            .unwrap()
            .insert(kind, (skip, error));
    }

    /// Put a record into a zone directly, bypassing the call log
    pub fn seed(&self, zone: &str, record: ZoneRecord) {
        self.inner
            .records
            .lock()
            .unwrap()
            .insert((zone.to_string(), record.id), record);
    }

    /// Delete a record behind the reconciler's back
    pub fn remove_remote(&self, zone: &str, id: i64) {
        self.inner
            .records
            .lock()
            .unwrap()
            .remove(&(zone.to_string(), id));
    }

    /// Change a record behind the reconciler's back
    pub fn edit_remote(&self, zone: &str, id: i64, edit: impl FnOnce(&mut ZoneRecord)) {
        if let Some(record) = self
            .inner
            .records
            .lock()
            .unwrap()
            .get_mut(&(zone.to_string(), id))
        {
            edit(record);
        }
    }

    pub fn remote(&self, zone: &str, id: i64) -> Option<ZoneRecord> {
        self.inner
            .records
            .lock()
            .unwrap()
            .get(&(zone.to_string(), id))
            .cloned()
    }

    pub fn remote_count(&self) -> usize {
        self.inner.records.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.inner.calls.lock().unwrap().clone()
    }

    pub fn call_kinds(&self) -> Vec<&'static str> {
        self.calls().iter().map(ApiCall::kind).collect()
    }

    pub fn clear_calls(&self) {
        self.inner.calls.lock().unwrap().clear();
    }

    pub fn last_update(&self) -> Option<ZoneRecordUpdate> {
        self.calls().into_iter().rev().find_map(|call| match call {
            ApiCall::Update { update, .. } => Some(update),
            _ => None,
        })
    }

    fn log(&self, call: ApiCall) -> Result<(), ApiError> {
        let kind = call.kind();
        self.inner.calls.lock().unwrap().push(call);
        let mut failures = self.inner.failures.lock().unwrap();
        let fail = match failures.get_mut(kind) {
            Some((skip, _)) if *skip > 0 => {
                *skip -= 1;
                false
            }
            Some(_) => true,
            None => false,
        };
        if !fail {
            return Ok(());
        }
        match failures.remove(kind) {
            Some((_, error)) => Err(error),
            None => Ok(()),
        }
    }

    fn not_found(id: i64) -> ApiError {
        ApiError::status(404, format!("Record `{}` not found", id))
    }
}

#[async_trait]
impl ZoneRecordApi for MockZoneApi {
    async fn create_record(
        &self,
        account: &str,
        zone: &str,
        attributes: &ZoneRecordAttributes,
    ) -> Result<ZoneRecord, ApiError> {
        self.log(ApiCall::Create {
            account: account.to_string(),
            zone: zone.to_string(),
            attributes: attributes.clone(),
        })?;

        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        let record = ZoneRecord {
            id,
            zone_id: zone.to_string(),
            name: attributes.name.clone(),
            record_type: attributes.record_type.clone(),
            content: attributes.content.clone(),
            regions: if attributes.regions.is_empty() {
                vec!["global".to_string()]
            } else {
                attributes.regions.clone()
            },
            ttl: attributes.ttl.unwrap_or(3600),
            priority: attributes.priority,
        };
        self.seed(zone, record.clone());
        Ok(record)
    }

    async fn get_record(
        &self,
        account: &str,
        zone: &str,
        record_id: i64,
    ) -> Result<ZoneRecord, ApiError> {
        self.log(ApiCall::Get {
            account: account.to_string(),
            zone: zone.to_string(),
            id: record_id,
        })?;

        self.remote(zone, record_id)
            .ok_or_else(|| Self::not_found(record_id))
    }

    async fn update_record(
        &self,
        account: &str,
        zone: &str,
        record_id: i64,
        update: &ZoneRecordUpdate,
    ) -> Result<ZoneRecord, ApiError> {
        self.log(ApiCall::Update {
            account: account.to_string(),
            zone: zone.to_string(),
            id: record_id,
            update: update.clone(),
        })?;

        let mut records = self.inner.records.lock().unwrap();
        let record = records
            .get_mut(&(zone.to_string(), record_id))
            .ok_or_else(|| Self::not_found(record_id))?;

        if let Some(name) = &update.name {
            record.name = name.clone();
        }
        if let Some(content) = &update.content {
            record.content = content.clone();
        }
        if let Some(regions) = &update.regions {
            record.regions = regions.clone();
        }
        if let Some(ttl) = update.ttl {
            record.ttl = ttl;
        }
        if let Some(priority) = update.priority {
            record.priority = Some(priority);
        }
        Ok(record.clone())
    }

    async fn delete_record(
        &self,
        account: &str,
        zone: &str,
        record_id: i64,
    ) -> Result<(), ApiError> {
        self.log(ApiCall::Delete {
            account: account.to_string(),
            zone: zone.to_string(),
            id: record_id,
        })?;

        self.inner
            .records
            .lock()
            .unwrap()
            .remove(&(zone.to_string(), record_id))
            .map(|_| ())
            .ok_or_else(|| Self::not_found(record_id))
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// A record with a non-empty name
pub fn www_spec() -> RecordSpec {
    RecordSpec::new("example.com", "www", "A", "192.0.2.1").with_regions(["SV1", "AMS"])
}

/// A record at the zone apex
pub fn apex_spec() -> RecordSpec {
    RecordSpec::new("example.com", "", "A", "192.0.2.10").with_regions(["global"])
}

/// An MX record with priority
pub fn mx_spec() -> RecordSpec {
    RecordSpec::new("example.com", "", "MX", "mx.example.net")
        .with_regions(["global"])
        .with_ttl("600")
        .with_priority("10")
}

/// A record as it might exist before being imported
pub fn existing_record(id: i64) -> ZoneRecord {
    ZoneRecord {
        id,
        zone_id: "example.com".to_string(),
        name: "api".to_string(),
        record_type: "CNAME".to_string(),
        content: "lb.example.net".to_string(),
        regions: vec!["global".to_string()],
        ttl: 300,
        priority: None,
    }
}
