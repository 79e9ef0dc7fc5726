use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::transport::{DEFAULT_CHAT_PATH, DEFAULT_UPLOAD_PATH};

/// Config file picked up from the working directory when no path is given.
const CWD_CONFIG_NAME: &str = "webchat";

#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Base URL of the chat server
    #[arg(long, env = "WEBCHAT_BASE_URL")]
    pub base_url: Option<String>,

    /// Request timeout in seconds (unset waits indefinitely)
    #[arg(long, env = "WEBCHAT_TIMEOUT_SECS")]
    pub timeout: Option<u64>,

    /// Emit logs as JSON (`--log-json` alone means true)
    #[arg(
        long,
        env = "WEBCHAT_LOG_JSON",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub log_json: Option<bool>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the chat server lives.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub base_url: String,
    pub chat_path: String,
    pub upload_path: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ClientConfig {
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub json: bool,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Self::from_cli(&cli)
    }

    /// Merge defaults, config file, `WEBCHAT_` environment and CLI.
    ///
    /// Priority: CLI flag > CLI env var > `WEBCHAT_*__*` env > file > defaults.
    pub fn from_cli(cli: &Cli) -> Result<Self, config::ConfigError> {
        let mut builder = Config::builder()
            .set_default("server.base_url", "http://127.0.0.1:8080")?
            .set_default("server.chat_path", DEFAULT_CHAT_PATH)?
            .set_default("server.upload_path", DEFAULT_UPLOAD_PATH)?
            .set_default("logging.json", false)?;

        // Explicit file must exist; ./webchat.{yaml,toml,json} is optional.
        builder = match &cli.config {
            Some(path) => builder.add_source(File::from(Path::new(path)).required(true)),
            None => builder.add_source(File::with_name(CWD_CONFIG_NAME).required(false)),
        };

        // E.g. WEBCHAT_SERVER__BASE_URL=http://chat.local
        builder = builder.add_source(
            Environment::with_prefix("WEBCHAT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(url) = &cli.base_url {
            builder = builder.set_override("server.base_url", url.as_str())?;
        }
        if let Some(secs) = cli.timeout {
            builder = builder.set_override("client.request_timeout_secs", secs)?;
        }
        if let Some(json) = cli.log_json {
            builder = builder.set_override("logging.json", json)?;
        }

        let cfg = builder.build()?;
        cfg.try_deserialize()
    }
}
