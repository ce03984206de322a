//! CLI command definitions

use clap::builder::BoolishValueParser;
use clap::{Parser, Subcommand};
use serde_json::{Map, Value};

#[derive(Parser)]
#[command(name = "centrifuge-bridge")]
#[command(about = "Publish application events to Centrifugo channels", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Centrifugo server URL
    #[arg(long, env = "CENTRIFUGO_URL", global = true)]
    pub url: Option<String>,

    /// Centrifugo server API key
    #[arg(long, env = "CENTRIFUGO_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Namespace prepended to every channel name
    #[arg(long, env = "CENTRIFUGO_CHANNEL_PREFIX", global = true)]
    pub channel_prefix: Option<String>,

    /// Timeout for API calls, in seconds
    #[arg(long, env = "CENTRIFUGO_TIMEOUT_SECS", default_value_t = 10, global = true)]
    pub timeout_secs: u64,

    /// Skip TLS certificate verification (development only)
    #[arg(
        long,
        env = "CENTRIFUGO_INSECURE",
        global = true,
        value_parser = BoolishValueParser::new()
    )]
    pub insecure: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Broadcast an event to one or more channels
    ///
    /// Examples:
    ///   centrifuge-bridge publish -c news -e NewArticle -p '{"id": 1}'
    ///   centrifuge-bridge publish -c orders.1 -c orders.2 -e OrderShipped
    Publish {
        /// Target channel (can be repeated)
        #[arg(short, long = "channel", required = true)]
        channels: Vec<String>,

        /// Event name, sent as the payload's `event` field
        #[arg(short, long)]
        event: String,

        /// Event payload as a JSON object
        #[arg(short, long, value_parser = parse_payload)]
        payload: Option<Map<String, Value>>,
    },

    /// Show Centrifugo node information
    Status,
}

fn parse_payload(s: &str) -> Result<Map<String, Value>, String> {
    match serde_json::from_str::<Value>(s) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err("payload must be a JSON object".to_string()),
        Err(e) => Err(format!("invalid JSON payload: {}", e)),
    }
}
