use std::net::Ipv4Addr;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use reqwest::Url;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use loopia_ddns::{
    config::{expand_home, Settings},
    dns::{create_client, DomainName},
    ip,
    secrets,
    state::IpStateStore,
    updater::{run_update, RunOutcome, UpdateRequest, UpdateResult},
};

/// Loopia IP Updater: keeps Loopia domains pointed at this machine's
/// external IP. Run it from cron as often as you see fit.
///
/// Credentials can be kept in ~/.loopiaapi.toml:
///
///     [credentials]
///     username = "USERNAME@loopiaapi"
///     password = "PASSWORD"
#[derive(Parser)]
#[command(name = "loopia-ddns")]
#[command(version, verbatim_doc_comment)]
struct Cli {
    /// The domains to update when the server's IP changes
    #[arg(required = true)]
    domains: Vec<String>,

    /// The URL at which the Loopia XML-RPC API exists
    #[arg(short = 'e', long)]
    api_endpoint: Option<String>,

    /// Username if not supplied in the config file
    #[arg(short, long)]
    username: Option<String>,

    /// Password if not supplied in the config file
    #[arg(short, long)]
    password: Option<String>,

    /// Config file location
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Update to this IP instead of looking up the external one
    #[arg(short, long)]
    ip_address: Option<Ipv4Addr>,

    /// Update the domains even if no new IP was encountered
    #[arg(short, long)]
    force_update: bool,

    /// Where the last known external IP is kept
    #[arg(short, long)]
    state_file: Option<PathBuf>,

    /// Service used to look up the external IP
    #[arg(long)]
    ip_check_url: Option<String>,
}

fn init_logging(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = match cli.config.as_deref() {
        Some(path) => Settings::load(&expand_home(path))?,
        None => Settings::load_or_default(&Settings::default_config_path())?,
    };

    init_logging(&settings.updater.log_level);

    // Reject bad domains before anything touches the network.
    let domains = cli
        .domains
        .iter()
        .map(|d| DomainName::new(d))
        .collect::<Result<Vec<_>, _>>()?;

    let credentials = secrets::resolve_credentials(
        cli.username,
        cli.password,
        settings.credentials.as_ref(),
    )?;

    let endpoint = cli
        .api_endpoint
        .unwrap_or_else(|| settings.updater.api_endpoint.clone());
    let endpoint = Url::parse(&endpoint)
        .with_context(|| format!("Invalid API endpoint: {endpoint}"))?;

    let state_path = cli
        .state_file
        .as_deref()
        .map(expand_home)
        .unwrap_or_else(|| settings.state_path());
    let store = IpStateStore::new(state_path);

    let current_ip = match cli.ip_address {
        Some(ip) => ip,
        None => {
            let url = cli
                .ip_check_url
                .unwrap_or_else(|| settings.updater.ip_check_url.clone());
            ip::get_external_ip(&url)
                .await?
                .ok_or_else(|| anyhow!("No IP address found in response from {url}"))?
        }
    };
    info!("Current external IP: {}", current_ip);

    let request = UpdateRequest {
        domains,
        credentials,
        force: cli.force_update,
        explicit_ip: cli.ip_address,
    };

    let api = create_client(endpoint)?;

    match run_update(&*api, &store, &request, current_ip).await {
        Ok(RunOutcome::UpToDate) => {
            println!("Everything looks fine");
        }
        Ok(RunOutcome::Updated { ip, results }) => {
            report(&results);
            if results.is_empty() {
                println!("No A records found to point at {}", ip);
            }
        }
        Err(failure) => {
            report(&failure.completed);
            return Err(failure.error.into());
        }
    }

    Ok(())
}

fn report(results: &[UpdateResult]) {
    for result in results {
        println!(
            "Zone record updated for {}. (Old ip: {}. New ip: {}).",
            result.domain, result.old_ip, result.new_ip
        );
    }
}
