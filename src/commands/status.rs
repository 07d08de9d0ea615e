//! `ollachat status`: probe the relay and the model backend

use crate::config::Config;
use crate::error::Result;
use crate::providers::{HttpRelayClient, OllamaBackend, Relay};
use colored::{ColoredString, Colorize};

/// Reachability of both hops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusReport {
    pub relay_online: bool,
    pub backend_online: bool,
}

/// Probe the relay at `client.api_url` and the backend at `relay.backend_url`
pub async fn check_status(config: &Config) -> Result<StatusReport> {
    let relay = HttpRelayClient::new(&config.client)?;
    let backend = OllamaBackend::new(&config.relay)?;

    let (relay_online, backend_online) = tokio::join!(relay.is_online(), backend.is_online());
    tracing::debug!(relay_online, backend_online, "Status probe finished");

    Ok(StatusReport {
        relay_online,
        backend_online,
    })
}

/// Print reachability of the relay and the backend
pub async fn run_status(config: &Config) -> Result<()> {
    let report = check_status(config).await?;

    println!(
        "Relay   {}  {}",
        indicator(report.relay_online),
        config.client.api_url
    );
    println!(
        "Backend {}  {}",
        indicator(report.backend_online),
        config.relay.backend_url
    );

    if !report.relay_online {
        println!("\nStart the relay with {}.", "ollachat serve".cyan());
    }

    Ok(())
}

pub(crate) fn indicator(online: bool) -> ColoredString {
    if online {
        "connected".green()
    } else {
        "disconnected".red()
    }
}
