//! In-memory zone API for unit tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::dns::xmlrpc::Value;
use crate::dns::{Credentials, ParsedDomain, ZoneApi, ZoneRecord};
use crate::error::{Result, UpdateError};

pub(crate) fn creds() -> Credentials {
    Credentials {
        username: "user@loopiaapi".to_string(),
        password: "secret".to_string(),
    }
}

pub(crate) fn record(record_type: &str, rdata: &str, id: i64) -> ZoneRecord {
    let mut fields = BTreeMap::new();
    fields.insert("type".to_string(), Value::from(record_type));
    fields.insert("rdata".to_string(), Value::from(rdata));
    fields.insert("record_id".to_string(), Value::Int(id));
    fields.insert("ttl".to_string(), Value::Int(3600));
    ZoneRecord::new(fields)
}

pub(crate) struct FakeZoneApi {
    domains: Value,
    zones: HashMap<(String, String), Vec<ZoneRecord>>,
    failing_parent: Option<String>,
    calls: Mutex<Vec<String>>,
    updates: Mutex<Vec<(ParsedDomain, ZoneRecord)>>,
}

impl FakeZoneApi {
    pub(crate) fn new() -> Self {
        Self {
            domains: Value::Array(Vec::new()),
            zones: HashMap::new(),
            failing_parent: None,
            calls: Mutex::new(Vec::new()),
            updates: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_domains(mut self, domains: Value) -> Self {
        self.domains = domains;
        self
    }

    pub(crate) fn rejecting_credentials(self) -> Self {
        self.with_domains(Value::Array(vec![Value::from("AUTH_ERROR")]))
    }

    pub(crate) fn with_zone(mut self, subdomain: &str, parent: &str, records: Vec<ZoneRecord>) -> Self {
        self.zones
            .insert((subdomain.to_string(), parent.to_string()), records);
        self
    }

    pub(crate) fn failing_on(mut self, parent: &str) -> Self {
        self.failing_parent = Some(parent.to_string());
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn updates(&self) -> Vec<(ParsedDomain, ZoneRecord)> {
        self.updates.lock().unwrap().clone()
    }

    fn record_call(&self, name: &str) {
        self.calls.lock().unwrap().push(name.to_string());
    }
}

#[async_trait]
impl ZoneApi for FakeZoneApi {
    async fn get_domains(&self, _creds: &Credentials) -> Result<Value> {
        self.record_call("getDomains");
        Ok(self.domains.clone())
    }

    async fn get_zone_records(
        &self,
        _creds: &Credentials,
        domain: &ParsedDomain,
    ) -> Result<Vec<ZoneRecord>> {
        self.record_call("getZoneRecords");
        if self.failing_parent.as_deref() == Some(domain.parent.as_str()) {
            return Err(UpdateError::remote("connection reset"));
        }
        Ok(self
            .zones
            .get(&(domain.subdomain.clone(), domain.parent.clone()))
            .cloned()
            .unwrap_or_default())
    }

    async fn update_zone_record(
        &self,
        _creds: &Credentials,
        domain: &ParsedDomain,
        record: &ZoneRecord,
    ) -> Result<Value> {
        self.record_call("updateZoneRecord");
        self.updates
            .lock()
            .unwrap()
            .push((domain.clone(), record.clone()));
        Ok(Value::from("OK"))
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}
