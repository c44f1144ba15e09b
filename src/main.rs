//! File Server - Entry Point
//!
//! HTTP file storage service with basic authentication.

use clap::Parser;
use log::info;

use fileserver::Server;
use fileserver::config::{ConfigLoader, DEFAULT_CONFIG_FILE};
use fileserver::utils::setup_logging;

#[derive(Parser, Debug)]
#[command(name = "fileserver")]
#[command(about = "HTTP file storage service with basic authentication")]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(long, visible_alias = "configFile", default_value = DEFAULT_CONFIG_FILE)]
    config_file: String,

    /// Socket address to listen on, overriding the config file
    #[arg(long, visible_alias = "listen_address")]
    listen_address: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let loader = ConfigLoader::new(&cli.config_file, cli.listen_address);
    let config = loader.load()?;
    setup_logging(&config.startup.log)?;

    info!("Launching file server with config {}", cli.config_file);

    let server = Server::new(config, loader).await?;
    server.start().await?;
    Ok(())
}
