use clap::Parser;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// wschat server command line. Every flag is optional; unset flags fall
/// through to the environment, the TOML file, then the built-in defaults.
#[derive(Parser, Serialize, Clone, Debug)]
#[command(name = "wschat-server", version, about = "WebSocket chat relay")]
pub struct Cli {
    /// Port to listen on
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Bind address
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind_address: Option<String>,

    /// Path to TOML config file
    #[arg(long, default_value = "./wschat.toml")]
    #[serde(skip)]
    pub config: PathBuf,

    /// Enable structured JSON logging
    #[arg(long)]
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub json_logs: bool,

    /// Output a commented TOML config template and exit
    #[arg(long)]
    #[serde(skip)]
    pub generate_config: bool,

    /// Directory served under /static
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_dir: Option<PathBuf>,
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            port: None,
            bind_address: None,
            config: PathBuf::from("./wschat.toml"),
            json_logs: false,
            generate_config: false,
            static_dir: None,
        }
    }
}

/// Effective server configuration after all layers are merged.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub bind_address: String,
    pub json_logs: bool,
    pub static_dir: PathBuf,

    /// Text shown on the chat page (loaded from [page] section in TOML)
    #[serde(default)]
    pub page: PageSettings,
}

/// What the chat page says about itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSettings {
    #[serde(default = "default_page_title")]
    pub title: String,

    #[serde(default = "default_page_description")]
    pub description: String,

    /// Shown in the footer when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(default = "default_page_license")]
    pub license: String,

    /// Link to the project's source, shown in the footer when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_url: Option<String>,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            title: default_page_title(),
            description: default_page_description(),
            author: None,
            license: default_page_license(),
            project_url: None,
        }
    }
}

fn default_page_title() -> String {
    "wschat".to_string()
}

fn default_page_license() -> String {
    "GPL-3.0-or-later".to_string()
}

fn default_page_description() -> String {
    "A small and simple chat room over WebSockets.".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8888,
            bind_address: "0.0.0.0".to_string(),
            json_logs: false,
            static_dir: PathBuf::from("./static"),
            page: PageSettings::default(),
        }
    }
}

impl Config {
    /// Load config with layered precedence:
    /// built-in defaults < TOML file < env vars (WSCHAT_*) < CLI args
    pub fn load(cli: &Cli) -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&cli.config))
            .merge(Env::prefixed("WSCHAT_").ignore(&["config"]))
            .merge(Serialized::defaults(cli))
            .extract()
    }

    /// `bind_address:port`, ready for `TcpListener::bind`.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

/// Generate a commented TOML config template
pub fn generate_config_template() -> String {
    r#"# wschat server configuration
# Place this file at ./wschat.toml or specify with --config <path>
# Top-level settings can be overridden via environment variables (WSCHAT_PORT, etc.)
# or CLI flags (--port, etc.)

# Server port (default: 8888)
# port = 8888

# Bind address (default: 0.0.0.0, all interfaces)
# bind_address = "0.0.0.0"

# Enable structured JSON logging
# json_logs = false

# Directory holding chat.js and chat.css, served under /static
# static_dir = "./static"

# ---- Chat page ----
# [page]
# title = "wschat"
# description = "A small and simple chat room over WebSockets."
# author = "Jane Doe"
# license = "GPL-3.0-or-later"
# project_url = "https://example.org/wschat"
"#
    .to_string()
}
