//! Typed record model
//!
//! Desired attributes ([`RecordSpec`]) come in from configuration, tracked
//! attributes ([`RecordState`]) go out to the state store, and the three
//! `ZoneRecord*` types are the request/response shapes of the provider API.
//! All field translation between them lives here.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{Error, Result};

/// TTL applied when a declaration does not set one
pub const DEFAULT_TTL: &str = "3600";

fn default_ttl() -> String {
    DEFAULT_TTL.to_string()
}

/// Desired state of a record, as declared
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSpec {
    /// Zone the record belongs to (forces replacement)
    pub domain: String,

    /// Subdomain label, empty for the zone apex
    pub name: String,

    /// Record type such as `A`, `CNAME`, `MX` (forces replacement)
    #[serde(rename = "type")]
    pub record_type: String,

    /// Record content
    pub value: String,

    /// Regions the record is served from
    pub regions: BTreeSet<String>,

    /// Time-to-live in seconds, string encoded
    #[serde(default = "default_ttl")]
    pub ttl: String,

    /// Priority, string encoded; only meaningful for some types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

impl RecordSpec {
    /// Declare a record with the default TTL and no priority
    pub fn new(
        domain: impl Into<String>,
        name: impl Into<String>,
        record_type: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            name: name.into(),
            record_type: record_type.into(),
            value: value.into(),
            regions: BTreeSet::new(),
            ttl: default_ttl(),
            priority: None,
        }
    }

    /// Set the regions
    pub fn with_regions<I, S>(mut self, regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.regions = regions.into_iter().map(Into::into).collect();
        self
    }

    /// Set the TTL
    pub fn with_ttl(mut self, ttl: impl Into<String>) -> Self {
        self.ttl = ttl.into();
        self
    }

    /// Set the priority
    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    /// Check the fields a declaration must carry
    ///
    /// `name` may be empty; `regions` may be an empty set.
    pub fn validate(&self) -> Result<()> {
        if self.domain.is_empty() {
            return Err(Error::config("record domain cannot be empty"));
        }
        if self.record_type.is_empty() {
            return Err(Error::config("record type cannot be empty"));
        }
        if self.value.is_empty() {
            return Err(Error::config("record value cannot be empty"));
        }
        Ok(())
    }
}

/// Tracked state of a record, as last read from the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordState {
    /// Remote-assigned record ID, string encoded
    pub id: String,
    /// Zone the record belongs to
    pub domain: String,
    /// The zone's own identifier as reported by the API
    pub domain_id: String,
    /// Subdomain label
    pub name: String,
    /// Fully qualified host name derived from `name` and `domain`
    pub hostname: String,
    /// Record type
    #[serde(rename = "type")]
    pub record_type: String,
    /// Record content
    pub value: String,
    /// Regions the record is served from
    pub regions: BTreeSet<String>,
    /// Time-to-live in seconds, string encoded
    pub ttl: String,
    /// Priority, string encoded
    pub priority: String,
}

impl RecordState {
    /// Translate an API response into tracked state
    ///
    /// `domain` is the zone the caller addressed; the response does not
    /// echo it back in the same form.
    pub fn from_response(domain: &str, record: &ZoneRecord) -> Self {
        Self {
            id: record.id.to_string(),
            domain: domain.to_string(),
            domain_id: record.zone_id.clone(),
            name: record.name.clone(),
            hostname: hostname(&record.name, domain),
            record_type: record.record_type.clone(),
            value: record.content.clone(),
            regions: record.regions.iter().cloned().collect(),
            ttl: record.ttl.to_string(),
            priority: record.priority.unwrap_or(0).to_string(),
        }
    }
}

/// Create request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneRecordAttributes {
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub content: String,
    pub regions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
}

impl ZoneRecordAttributes {
    /// Build the create body from a declaration
    ///
    /// The zone is not part of the body; it is the routing target of the call.
    pub fn from_spec(spec: &RecordSpec) -> Self {
        Self {
            record_type: spec.record_type.clone(),
            name: spec.name.clone(),
            content: spec.value.clone(),
            regions: spec.regions.iter().cloned().collect(),
            ttl: lenient_int("ttl", Some(&spec.ttl)),
            priority: lenient_int("priority", spec.priority.as_deref()),
        }
    }
}

/// Sparse update request body
///
/// Unset fields are left out of the JSON entirely so the API keeps their
/// current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneRecordUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
}

impl ZoneRecordUpdate {
    /// Build the update body from the mutable part of a declaration
    ///
    /// `regions` is always sent, even when empty. `type` and `domain` are
    /// never sent.
    pub fn from_spec(spec: &RecordSpec) -> Self {
        Self {
            name: Some(spec.name.clone()),
            content: Some(spec.value.clone()).filter(|v| !v.is_empty()),
            regions: Some(spec.regions.iter().cloned().collect()),
            ttl: lenient_int("ttl", Some(&spec.ttl)),
            priority: lenient_int("priority", spec.priority.as_deref()),
        }
    }

    /// Names of the fields that will be serialized
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.name.is_some() {
            fields.push("name");
        }
        if self.content.is_some() {
            fields.push("content");
        }
        if self.regions.is_some() {
            fields.push("regions");
        }
        if self.ttl.is_some() {
            fields.push("ttl");
        }
        if self.priority.is_some() {
            fields.push("priority");
        }
        fields
    }
}

/// A zone record as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneRecord {
    pub id: i64,
    pub zone_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub content: String,
    #[serde(default)]
    pub regions: Vec<String>,
    pub ttl: i64,
    #[serde(default)]
    pub priority: Option<i64>,
}

/// Fully qualified host name of a record
pub fn hostname(name: &str, domain: &str) -> String {
    if name.is_empty() {
        domain.to_string()
    } else {
        format!("{}.{}", name, domain)
    }
}

/// Parse a string-encoded integer field, dropping it when unparseable
///
/// Unparseable and empty values are omitted from the request instead of
/// failing the operation.
pub fn lenient_int(field: &str, raw: Option<&str>) -> Option<i64> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<i64>() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Ignoring unparseable {} {:?}: {}", field, raw, e);
            None
        }
    }
}

/// Parse a stored resource identity into a numeric record ID
pub fn parse_record_id(id: &str) -> Result<i64> {
    id.parse::<i64>()
        .map_err(|e| Error::invalid_identity(id, e))
}

/// Composite `DOMAIN_RECORDID` key used to adopt an existing record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportKey {
    pub domain: String,
    pub id: String,
}

impl ImportKey {
    /// Split a key into its domain and record ID parts
    ///
    /// The key must contain exactly one underscore with text on both sides.
    /// The ID part is not checked here; reading it validates it.
    pub fn parse(key: &str) -> Result<Self> {
        let parts: Vec<&str> = key.split('_').collect();
        match parts.as_slice() {
            [domain, id] if !domain.is_empty() && !id.is_empty() => Ok(Self {
                domain: (*domain).to_string(),
                id: (*id).to_string(),
            }),
            _ => Err(Error::invalid_import_key(key)),
        }
    }
}

impl std::fmt::Display for ImportKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.domain, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_record() -> ZoneRecord {
        ZoneRecord {
            id: 1234,
            zone_id: "example.com".to_string(),
            name: "www".to_string(),
            record_type: "A".to_string(),
            content: "192.0.2.1".to_string(),
            regions: vec!["SV1".to_string(), "AMS".to_string()],
            ttl: 600,
            priority: None,
        }
    }

    #[test]
    fn test_hostname() {
        assert_eq!(hostname("www", "example.com"), "www.example.com");
        assert_eq!(hostname("", "example.com"), "example.com");
    }

    #[test]
    fn test_spec_defaults_from_json() {
        let spec: RecordSpec = serde_json::from_value(serde_json::json!({
            "domain": "example.com",
            "name": "",
            "type": "A",
            "value": "192.0.2.1",
            "regions": ["global"]
        }))
        .unwrap();

        assert_eq!(spec.ttl, "3600");
        assert_eq!(spec.priority, None);
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_spec_requires_regions() {
        let result: std::result::Result<RecordSpec, _> =
            serde_json::from_value(serde_json::json!({
                "domain": "example.com",
                "name": "www",
                "type": "A",
                "value": "192.0.2.1"
            }));
        assert!(result.is_err());
    }

    #[test]
    fn test_state_from_response() {
        let state = RecordState::from_response("example.com", &api_record());

        assert_eq!(state.id, "1234");
        assert_eq!(state.domain_id, "example.com");
        assert_eq!(state.hostname, "www.example.com");
        assert_eq!(state.value, "192.0.2.1");
        assert_eq!(state.ttl, "600");
        assert_eq!(state.priority, "0");
        assert_eq!(
            state.regions.into_iter().collect::<Vec<_>>(),
            vec!["AMS".to_string(), "SV1".to_string()]
        );
    }

    #[test]
    fn test_response_accepts_null_priority() {
        let record: ZoneRecord = serde_json::from_value(serde_json::json!({
            "id": 5,
            "zone_id": "example.com",
            "parent_id": null,
            "name": "",
            "content": "mx.example.net",
            "ttl": 3600,
            "priority": null,
            "type": "MX",
            "regions": ["global"],
            "system_record": false
        }))
        .unwrap();
        assert_eq!(record.priority, None);
    }

    #[test]
    fn test_create_attributes_lenient_numbers() {
        let spec = RecordSpec::new("example.com", "mail", "MX", "mx.example.net")
            .with_regions(["global"])
            .with_ttl("ten")
            .with_priority("10");

        let attrs = ZoneRecordAttributes::from_spec(&spec);
        assert_eq!(attrs.ttl, None);
        assert_eq!(attrs.priority, Some(10));

        let body = serde_json::to_value(&attrs).unwrap();
        assert!(body.get("ttl").is_none());
        assert!(body.get("zone_id").is_none());
        assert_eq!(body["type"], "MX");
    }

    #[test]
    fn test_update_omits_unset_fields() {
        let spec = RecordSpec::new("example.com", "www", "A", "192.0.2.2");
        let update = ZoneRecordUpdate::from_spec(&spec);

        assert_eq!(update.field_names(), vec!["name", "content", "regions", "ttl"]);

        let body = serde_json::to_value(&update).unwrap();
        assert!(body.get("priority").is_none());
        assert!(body.get("type").is_none());
        assert_eq!(body["regions"], serde_json::json!([]));
    }

    #[test]
    fn test_parse_record_id() {
        assert_eq!(parse_record_id("1234").unwrap(), 1234);
        assert!(matches!(
            parse_record_id("abc"),
            Err(Error::InvalidIdentity { .. })
        ));
        assert!(matches!(
            parse_record_id(""),
            Err(Error::InvalidIdentity { .. })
        ));
    }

    #[test]
    fn test_import_key_parse() {
        let key = ImportKey::parse("example.com_1234").unwrap();
        assert_eq!(key.domain, "example.com");
        assert_eq!(key.id, "1234");
        assert_eq!(key.to_string(), "example.com_1234");

        for bad in ["malformed", "a_b_c", "_1234", "example.com_", ""] {
            assert!(
                matches!(ImportKey::parse(bad), Err(Error::InvalidImportKey { .. })),
                "{bad:?} should be rejected"
            );
        }
    }
}
