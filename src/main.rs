//! IdP Gateway - simplified user, role and login API over an OpenID-Connect
//! provider.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use idp_gateway::{
    Error,
    auth::{KeyStore, TokenVerifier},
    cli::{Cli, Command},
    config::Config,
    provider::ProviderClient,
    server::Server,
    setup_tracing,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = setup_tracing(&cli.log_level, cli.log_format.as_deref()) {
        eprintln!("Failed to setup tracing: {e}");
        return ExitCode::FAILURE;
    }

    let config = match load_config(&cli) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Some(Command::VerifyToken { token }) => run_verify_token(&config, &token).await,
        Some(Command::CheckConfig) => run_check_config(&config),
        Some(Command::Serve) | None => run_server(config).await,
    }
}

/// Load config and apply CLI overrides
fn load_config(cli: &Cli) -> idp_gateway::Result<Config> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(ref host) = cli.host {
        config.server.host.clone_from(host);
    }
    Ok(config)
}

async fn run_server(config: Config) -> ExitCode {
    let server = match Server::new(config) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to create gateway: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = server.run().await {
        error!("Gateway error: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn run_verify_token(config: &Config, token: &str) -> ExitCode {
    match verify_token(config, token).await {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("❌ {e}");
            ExitCode::FAILURE
        }
    }
}

/// Verify `token` against the live key set and render its claims.
async fn verify_token(config: &Config, token: &str) -> idp_gateway::Result<String> {
    config.validate()?;
    let http = ProviderClient::http_client(&config.provider)?;
    let keys = Arc::new(KeyStore::new(http, config.provider.jwks_url()));
    let verifier = TokenVerifier::from_config(&config.provider, keys)?;

    let claims = verifier.verify(token).await.map_err(|e| {
        error!("Token rejected: {e}");
        Error::invalid_token()
    })?;

    serde_json::to_string_pretty(&claims).map_err(|e| Error::Internal(e.to_string()))
}

fn run_check_config(config: &Config) -> ExitCode {
    if let Err(e) = config.validate() {
        eprintln!("❌ {e}");
        return ExitCode::FAILURE;
    }

    let p = &config.provider;
    info!("Configuration is valid");
    println!("✅ Configuration is valid");
    println!("   Listen:     {}:{}", config.server.host, config.server.port);
    println!("   Token URL:  {}", p.token_url());
    println!("   Key set:    {}", p.jwks_url());
    println!("   Issuer:     {}", p.issuer());
    println!("   Admin API:  {}", p.admin_url());
    println!("   Client:     {}", p.client_id);
    println!("   Algorithm:  {}", p.algorithm);
    println!(
        "   Verify:     {}",
        if config.auth.verify_tokens { "on" } else { "off" }
    );
    ExitCode::SUCCESS
}
