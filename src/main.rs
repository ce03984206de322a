//! centrifuge-bridge CLI entry point

mod cli;

use crate::cli::{Cli, Commands};
use anyhow::{bail, Context, Result};
use centrifuge_bridge::auth::ChannelRules;
use centrifuge_bridge::channels::PrefixedChannels;
use centrifuge_bridge::{CentrifugoClient, CentrifugoConfig, ChannelAuthorizer};
use clap::Parser;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = build_config(&cli)?;
    let client = CentrifugoClient::new(config).context("Failed to build HTTP client")?;

    match cli.command {
        Commands::Publish {
            channels,
            event,
            payload,
        } => publish(client, cli.channel_prefix, channels, event, payload).await,
        Commands::Status => status(client).await,
    }
}

fn build_config(cli: &Cli) -> Result<CentrifugoConfig> {
    let url = cli.url.clone().context("CENTRIFUGO_URL or --url required")?;
    let api_key = cli
        .api_key
        .clone()
        .context("CENTRIFUGO_API_KEY or --api-key required")?;

    let mut config =
        CentrifugoConfig::new(url, api_key).timeout(Duration::from_secs(cli.timeout_secs));
    if cli.insecure {
        config = config.dangerous_skip_cert_verify();
    }

    Ok(config)
}

async fn publish(
    client: CentrifugoClient,
    channel_prefix: Option<String>,
    channels: Vec<String>,
    event: String,
    payload: Option<Map<String, Value>>,
) -> Result<()> {
    // Publishing never consults the policy
    let mut authorizer = ChannelAuthorizer::new(Arc::new(client), Arc::new(ChannelRules::new()));
    if let Some(prefix) = channel_prefix {
        authorizer = authorizer.with_formatter(Arc::new(PrefixedChannels::new(prefix)));
    }

    authorizer
        .publish(&channels, &event, payload)
        .await
        .context("Broadcast failed")?;

    println!("Published {} to {} channel(s)", event, channels.len());

    Ok(())
}

async fn status(client: CentrifugoClient) -> Result<()> {
    let reply = client.info().await.context("Failed to reach Centrifugo")?;

    if let Some(error) = reply.get("error").filter(|e| !e.is_null()) {
        bail!("Centrifugo returned an error: {}", error);
    }

    println!("Centrifugo Status");
    println!("=================");
    println!("Server: {}", client.config().url);
    println!("{}", serde_json::to_string_pretty(&reply)?);

    Ok(())
}
