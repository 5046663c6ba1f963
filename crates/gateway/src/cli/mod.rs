pub mod config;
pub mod doctor;
pub mod run;

use clap::{Parser, Subcommand};

/// briefing-gateway — a multi-tenant conversational backend.
#[derive(Debug, Parser)]
#[command(name = "briefing-gateway", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the gateway server (default when no subcommand is given).
    Serve,
    /// Run diagnostic checks against the current configuration.
    Doctor,
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Send a single message to the agent and print the response.
    Run {
        /// The message to send.
        message: String,
        /// Conversation id to continue (a new one is created if omitted).
        #[arg(long)]
        conversation_id: Option<String>,
        /// Output every agent event as JSON instead of plain text.
        #[arg(long)]
        json: bool,
    },
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

/// Load the configuration from the path specified by `BRIEFING_CONFIG` (or
/// `config.toml` by default), then overlay recognized `BRIEFING_*`
/// environment variables on top. Returns the parsed [`Config`] and the
/// path that was used — shared by `serve`, `doctor`, and `config`
/// subcommands.
pub fn load_config() -> anyhow::Result<(briefing_domain::config::Config, String)> {
    let config_path = std::env::var("BRIEFING_CONFIG").unwrap_or_else(|_| "config.toml".into());

    let mut config = if std::path::Path::new(&config_path).exists() {
        let raw = std::fs::read_to_string(&config_path)
            .map_err(|e| anyhow::anyhow!("reading {config_path}: {e}"))?;
        toml::from_str(&raw).map_err(|e| anyhow::anyhow!("parsing {config_path}: {e}"))?
    } else {
        briefing_domain::config::Config::default()
    };

    apply_env_overlay(&mut config);

    Ok((config, config_path))
}

/// Overlay recognized `BRIEFING_*` environment variables onto an
/// already-parsed [`Config`]. Unrecognized `BRIEFING_*` variables (and
/// anything outside that prefix) are ignored rather than rejected, since
/// the env is a thin layer over the file/defaults, not a schema of its
/// own.
fn apply_env_overlay(config: &mut briefing_domain::config::Config) {
    overlay_string("BRIEFING_SERVER_HOST", &mut config.server.host);
    overlay_parsed("BRIEFING_SERVER_PORT", &mut config.server.port);

    overlay_string("BRIEFING_LLM_AGENT_MODEL", &mut config.llm.agent_model);
    overlay_parsed("BRIEFING_LLM_DEFAULT_TIMEOUT_MS", &mut config.llm.default_timeout_ms);
    overlay_parsed("BRIEFING_LLM_MAX_RETRIES", &mut config.llm.max_retries);
    overlay_parsed("BRIEFING_LLM_RETRY_DELAY_MS", &mut config.llm.retry_delay_ms);
    overlay_parsed("BRIEFING_LLM_TEMPERATURE", &mut config.llm.temperature);

    overlay_string("BRIEFING_SESSIONS_STATE_DIR", &mut config.sessions.state_dir);
    overlay_parsed(
        "BRIEFING_SESSIONS_MAX_HISTORY_MESSAGES",
        &mut config.sessions.max_history_messages,
    );

    overlay_string("BRIEFING_RSS_ARTIFACT_PATH", &mut config.rss.cache.artifact_path);
    overlay_parsed("BRIEFING_RSS_MAX_ARTICLES", &mut config.rss.cache.max_articles);

    overlay_string("BRIEFING_OBSERVABILITY_LOG_FILTER", &mut config.observability.log_filter);
    overlay_string("BRIEFING_OBSERVABILITY_SERVICE_NAME", &mut config.observability.service_name);
}

fn overlay_string(key: &str, field: &mut String) {
    if let Ok(value) = std::env::var(key) {
        *field = value;
    }
}

fn overlay_parsed<T: std::str::FromStr>(key: &str, field: &mut T) {
    let Ok(raw) = std::env::var(key) else { return };
    match raw.parse() {
        Ok(value) => *field = value,
        Err(_) => eprintln!("warning: ignoring {key}={raw:?} — could not parse"),
    }
}
