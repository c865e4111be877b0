pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "piper")]
#[command(about = "Piper - authorization and team membership service")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(long, global = true, help = "Database URL (overrides DATABASE_URL)")]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP API server (default)")]
    Serve {
        #[arg(long, help = "Port to listen on (overrides API_PORT)")]
        port: Option<u16>,
    },

    #[command(about = "Show instance setup status")]
    Status,

    #[command(about = "Bootstrap the instance: organization and first super-admin")]
    Init {
        #[arg(long, help = "Organization name")]
        org_name: String,
        #[arg(long, help = "Super-admin email")]
        email: String,
        #[arg(long, help = "Super-admin password")]
        password: String,
    },
}

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Process configuration with command-line overrides applied.
fn resolve_config(cli: &Cli) -> AppConfig {
    let mut config = crate::config::config().clone();
    if let Some(url) = &cli.database_url {
        config.database.url = url.clone();
    }
    config
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let config = resolve_config(&cli);

    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => commands::serve::handle(config, port).await,
        Commands::Status => commands::status::handle(config, output_format).await,
        Commands::Init {
            org_name,
            email,
            password,
        } => commands::init::handle(config, org_name, email, password, output_format).await,
    }
}
