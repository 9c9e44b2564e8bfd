use std::io::IsTerminal;

use anyhow::{anyhow, Context, Result};

use crate::config::FileCredentials;
use crate::dns::Credentials;

/// Combine command-line and config-file credentials.
///
/// Command-line values win. A password that is still missing is prompted
/// for when stdin is a terminal.
pub fn resolve_credentials(
    cli_username: Option<String>,
    cli_password: Option<String>,
    file: Option<&FileCredentials>,
) -> Result<Credentials> {
    resolve_with(cli_username, cli_password, file, prompt_password)
}

fn resolve_with(
    cli_username: Option<String>,
    cli_password: Option<String>,
    file: Option<&FileCredentials>,
    prompt: impl FnOnce() -> Result<Option<String>>,
) -> Result<Credentials> {
    let username = pick(cli_username, file.and_then(|f| f.username.as_deref()))
        .ok_or_else(|| {
            anyhow!("No username given. Pass --username or set it in the [credentials] section of the config file.")
        })?;

    let password = match pick(cli_password, file.and_then(|f| f.password.as_deref())) {
        Some(password) => password,
        None => prompt()?.ok_or_else(|| {
            anyhow!("No password given. Pass --password or set it in the [credentials] section of the config file.")
        })?,
    };

    Ok(Credentials { username, password })
}

fn pick(cli: Option<String>, file: Option<&str>) -> Option<String> {
    cli.filter(|v| !v.is_empty())
        .or_else(|| file.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string))
}

fn prompt_password() -> Result<Option<String>> {
    if !std::io::stdin().is_terminal() {
        return Ok(None);
    }

    let password = rpassword::prompt_password("Loopia API password: ")
        .context("Failed to read password")?;

    Ok(Some(password).filter(|p| !p.is_empty()))
}
