use std::net::Ipv4Addr;
use std::sync::LazyLock;
use std::time::Duration;

use anyhow::{Context, Result};
use regex::Regex;
use reqwest::Client;

pub const EXTERNAL_IP_CHECK_URL: &str = "http://checkip.dyndns.org";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

static DOTTED_QUAD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}").unwrap());

/// Ask `url` for our public address.
///
/// Returns `Ok(None)` when the response carries no IPv4 address.
pub async fn get_external_ip(url: &str) -> Result<Option<Ipv4Addr>> {
    let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

    let body = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to reach IP check service {url}"))?
        .error_for_status()?
        .text()
        .await
        .context("Failed to read IP check response")?;

    let ip = extract_ipv4(&body);
    tracing::debug!("IP check service {} reported {:?}", url, ip);
    Ok(ip)
}

/// First dotted-quad in `text` that is a valid IPv4 address.
pub fn extract_ipv4(text: &str) -> Option<Ipv4Addr> {
    DOTTED_QUAD
        .find_iter(text)
        .find_map(|m| m.as_str().parse().ok())
}
