//! # Skill Runtime
//!
//! Serves the example "hello" skill behind the authenticating gateway.
//!
//! ## Startup Sequence
//!
//! 1. Parse CLI / environment settings
//! 2. Load the host trust store
//! 3. Build the certificate fetcher (HTTPS + URL cache) and request gate
//! 4. Register the skill endpoint and serve until Ctrl+C
//!
//! ```bash
//! SKILL_APP_ID=amzn1.ask.skill.xxxx skill-runtime --port 3000
//! ```

mod hello;

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use skill_auth::domain::policy::humantime_serde::parse_duration;
use skill_auth::{load_system_trust_store, CachingFetcher, HttpCertificateFetcher, RequestGate};
use skill_gateway::{EndpointRegistry, GatewayConfig, SkillEndpoint, SkillGatewayService};

/// Environment variable name used by earlier deployments.
const LEGACY_APP_ID_ENV: &str = "ASK_APP_ID";

#[derive(Parser, Debug)]
#[command(name = "skill-runtime")]
#[command(version)]
#[command(about = "Authenticating voice-assistant skill server", long_about = None)]
struct Cli {
    /// Bind address
    #[arg(long, env = "SKILL_HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    /// Listen port
    #[arg(short, long, env = "SKILL_PORT", default_value_t = 3000)]
    port: u16,

    /// Path the hello skill is served on
    #[arg(long, env = "SKILL_ENDPOINT", default_value = "/skills/hello")]
    endpoint: String,

    /// Application id expected on requests (falls back to ASK_APP_ID)
    #[arg(long, env = "SKILL_APP_ID")]
    app_id: Option<String>,

    /// Certificate fetch timeout, e.g. "10s" or "500ms"
    #[arg(long, env = "SKILL_FETCH_TIMEOUT", value_parser = parse_duration)]
    fetch_timeout: Option<Duration>,
}

impl Cli {
    fn application_id(&self) -> Result<String> {
        let app_id = self
            .app_id
            .clone()
            .or_else(|| std::env::var(LEGACY_APP_ID_ENV).ok())
            .unwrap_or_default();
        if app_id.trim().is_empty() {
            bail!("an application id is required (--app-id, SKILL_APP_ID or {LEGACY_APP_ID_ENV})");
        }
        Ok(app_id)
    }

    fn gateway_config(&self) -> GatewayConfig {
        let mut config = GatewayConfig::default();
        config.http.host = self.host;
        config.http.port = self.port;
        if let Some(timeout) = self.fetch_timeout {
            config.auth.fetch_timeout = timeout;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let app_id = cli.application_id()?;
    let config = cli.gateway_config();

    let trust_store = load_system_trust_store().context("loading system trust store")?;
    let http = HttpCertificateFetcher::new(&config.auth).context("building HTTPS client")?;
    let fetcher = Arc::new(CachingFetcher::new(http));
    let gate = RequestGate::new(fetcher.clone(), trust_store, config.auth.clone());

    let registry = EndpointRegistry::new().with_endpoint(SkillEndpoint::new(
        "hello",
        cli.endpoint.as_str(),
        app_id,
        hello::hello_handler,
    ))?;

    let service = SkillGatewayService::new(config, registry, Arc::new(gate))?;
    service.start(shutdown_signal()).await?;

    info!(
        cached = fetcher.len(),
        hits = fetcher.hits(),
        misses = fetcher.misses(),
        "Certificate cache statistics"
    );
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => warn!(error = %e, "Failed to listen for Ctrl+C; shutting down"),
    }
}
