//! Command-line interface

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// IdP Gateway - user, role and login API over an OpenID-Connect provider
#[derive(Parser, Debug)]
#[command(name = "idp-gateway")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short, long, env = "IDP_GATEWAY_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "IDP_GATEWAY_PORT")]
    pub port: Option<u16>,

    /// Host to bind to
    #[arg(long, env = "IDP_GATEWAY_HOST")]
    pub host: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(
        long,
        default_value = "info",
        env = "IDP_GATEWAY_LOG_LEVEL",
        global = true
    )]
    pub log_level: String,

    /// Log format (text, json)
    #[arg(long, env = "IDP_GATEWAY_LOG_FORMAT", global = true)]
    pub log_format: Option<String>,

    /// Subcommand (optional - defaults to server mode)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the gateway server (default)
    Serve,

    /// Verify an access token against the provider's key set
    VerifyToken {
        /// Raw JWT (without the `Bearer ` prefix)
        #[arg(required = true)]
        token: String,
    },

    /// Load and validate configuration, then print the derived endpoints
    CheckConfig,
}
