use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use super::domain::ParsedDomain;
use super::provider::{Credentials, ZoneApi, ZoneRecord};
use super::xmlrpc::{self, Value};
use crate::error::{Result, UpdateError};

pub const LOOPIA_API_ENDPOINT: &str = "https://api.loopia.se/RPCSERV";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct LoopiaClient {
    client: Client,
    endpoint: Url,
}

impl LoopiaClient {
    pub fn new(endpoint: Url) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self { client, endpoint })
    }

    fn auth_params(creds: &Credentials) -> Vec<Value> {
        vec![
            Value::from(creds.username.as_str()),
            Value::from(creds.password.as_str()),
        ]
    }

    async fn call(&self, method: &str, params: &[Value]) -> Result<Value> {
        tracing::debug!("Calling {} on {}", method, self.endpoint);

        let response = self
            .client
            .post(self.endpoint.clone())
            .header("Content-Type", "text/xml; charset=utf-8")
            .body(xmlrpc::encode_call(method, params))
            .send()
            .await
            .map_err(|e| UpdateError::remote(format!("{method} request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(UpdateError::remote(format!(
                "Loopia API error ({status}) on {method}: {body}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| UpdateError::remote(format!("Failed to read {method} response: {e}")))?;

        xmlrpc::decode_response(&body)
    }
}

#[async_trait]
impl ZoneApi for LoopiaClient {
    async fn get_domains(&self, creds: &Credentials) -> Result<Value> {
        self.call("getDomains", &Self::auth_params(creds)).await
    }

    async fn get_zone_records(
        &self,
        creds: &Credentials,
        domain: &ParsedDomain,
    ) -> Result<Vec<ZoneRecord>> {
        let mut params = Self::auth_params(creds);
        params.push(Value::from(domain.parent.as_str()));
        params.push(Value::from(domain.subdomain.as_str()));

        match self.call("getZoneRecords", &params).await? {
            Value::Array(items) => items.into_iter().map(ZoneRecord::try_from).collect(),
            other => Err(UpdateError::remote(format!(
                "getZoneRecords returned {other:?} for {}.{}",
                domain.subdomain, domain.parent
            ))),
        }
    }

    async fn update_zone_record(
        &self,
        creds: &Credentials,
        domain: &ParsedDomain,
        record: &ZoneRecord,
    ) -> Result<Value> {
        let mut params = Self::auth_params(creds);
        params.push(Value::from(domain.parent.as_str()));
        params.push(Value::from(domain.subdomain.as_str()));
        params.push(record.to_value());

        self.call("updateZoneRecord", &params).await
    }

    fn provider_name(&self) -> &'static str {
        "loopia"
    }
}
