#![allow(dead_code)]

use std::net::Ipv4Addr;

use loopia_ddns::dns::{create_client, Credentials, DomainName, ZoneApi};
use loopia_ddns::state::IpStateStore;
use loopia_ddns::updater::UpdateRequest;
use reqwest::Url;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockBuilder, MockServer, ResponseTemplate};

pub const RPC_PATH: &str = "/RPCSERV";

pub fn method_response(value: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<methodResponse>
  <params>
    <param>
      <value>{value}</value>
    </param>
  </params>
</methodResponse>"#
    )
}

pub fn string_array(items: &[&str]) -> String {
    let values: String = items
        .iter()
        .map(|s| format!("<value><string>{s}</string></value>"))
        .collect();
    format!("<array><data>{values}</data></array>")
}

pub fn zone_record(record_type: &str, rdata: &str, id: i64) -> String {
    format!(
        r#"<struct>
  <member><name>type</name><value><string>{record_type}</string></value></member>
  <member><name>ttl</name><value><int>3600</int></value></member>
  <member><name>priority</name><value><int>0</int></value></member>
  <member><name>rdata</name><value><string>{rdata}</string></value></member>
  <member><name>record_id</name><value><int>{id}</int></value></member>
</struct>"#
    )
}

pub fn zone_records(records: &[String]) -> String {
    let values: String = records
        .iter()
        .map(|r| format!("<value>{r}</value>"))
        .collect();
    format!("<array><data>{values}</data></array>")
}

pub fn xml_ok(value: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("Content-Type", "text/xml")
        .set_body_string(method_response(value))
}

/// A POST to the RPC path calling `rpc_method`.
pub fn rpc(rpc_method: &str) -> MockBuilder {
    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .and(body_string_contains(format!("<methodName>{rpc_method}</methodName>")))
}

pub fn credentials() -> Credentials {
    Credentials {
        username: "user@loopiaapi".to_string(),
        password: "secret".to_string(),
    }
}

pub fn request(domains: &[&str]) -> UpdateRequest {
    UpdateRequest {
        domains: domains.iter().map(|d| DomainName::new(d).unwrap()).collect(),
        credentials: credentials(),
        force: false,
        explicit_ip: None,
    }
}

pub fn client(server: &MockServer) -> Arc<dyn ZoneApi> {
    let url = Url::parse(&format!("{}{}", server.uri(), RPC_PATH)).unwrap();
    create_client(url).unwrap()
}

/// State store in a fresh temp dir, optionally seeded with an address.
pub async fn state_store(last: Option<Ipv4Addr>) -> (TempDir, IpStateStore) {
    let dir = TempDir::new().unwrap();
    let store = IpStateStore::new(dir.path().join("externalip"));
    if let Some(ip) = last {
        store.write_last(ip).await.unwrap();
    }
    (dir, store)
}
