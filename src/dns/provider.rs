use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;

use super::domain::ParsedDomain;
use super::xmlrpc::Value;
use crate::error::{Result, UpdateError};

/// Record type of the records this updater rewrites.
pub const ADDRESS_RECORD_TYPE: &str = "A";

#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A zone record as the provider returns it.
///
/// Fields other than `type` and `rdata` (record id, ttl, priority) are
/// carried through untouched so the record can be sent back as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneRecord {
    fields: BTreeMap<String, Value>,
}

impl ZoneRecord {
    pub fn new(fields: BTreeMap<String, Value>) -> Self {
        Self { fields }
    }

    pub fn record_type(&self) -> Option<&str> {
        self.fields.get("type").and_then(Value::as_str)
    }

    pub fn rdata(&self) -> Option<&str> {
        self.fields.get("rdata").and_then(Value::as_str)
    }

    pub fn set_rdata(&mut self, rdata: impl Into<String>) {
        self.fields
            .insert("rdata".to_string(), Value::String(rdata.into()));
    }

    pub fn is_address_record(&self) -> bool {
        self.record_type() == Some(ADDRESS_RECORD_TYPE)
    }

    pub fn to_value(&self) -> Value {
        Value::Struct(self.fields.clone())
    }
}

impl TryFrom<Value> for ZoneRecord {
    type Error = UpdateError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Struct(fields) => Ok(Self { fields }),
            other => Err(UpdateError::remote(format!(
                "expected zone record struct, got {other:?}"
            ))),
        }
    }
}

/// Remote zone-management API.
#[async_trait]
pub trait ZoneApi: Send + Sync {
    /// List the account's domains; used only to check credentials.
    async fn get_domains(&self, creds: &Credentials) -> Result<Value>;

    /// Fetch all zone records for a subdomain of a parent domain.
    async fn get_zone_records(
        &self,
        creds: &Credentials,
        domain: &ParsedDomain,
    ) -> Result<Vec<ZoneRecord>>;

    /// Replace a zone record with the submitted one.
    async fn update_zone_record(
        &self,
        creds: &Credentials,
        domain: &ParsedDomain,
        record: &ZoneRecord,
    ) -> Result<Value>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;
}
