use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use spdlog::{info, warn};

use grizzly_site::logger::configure_logger;
use grizzly_site::server::{server_run, AppState};

use crate::config::open_config;

mod config;

const CFG_FILE_NAME: &str = "grizzly.toml";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Config path
    #[arg(short, long)]
    config_path: Option<String>,

    /// Load and validate the configuration and catalogs, then exit
    #[arg(long)]
    check: bool,
}

#[ntex::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config_path = args.config_path.map(PathBuf::from);

    let config = open_config(config_path)
        .context("Error loading configuration. Please run grizzly --help")?;

    if let Err(err) = configure_logger(config.log.as_ref()) {
        warn!("Error creating logger sinks. Using console instead. Desc={}", err);
    }

    if args.check {
        let state = AppState::from_config(config)?;
        println!("Site: {} ({})", state.config.site.name, state.config.site.url());
        let locales: Vec<_> = state.resolver.config().supported().iter().map(|l| l.to_string()).collect();
        println!("Locales: {} (default {})", locales.join(", "), state.resolver.config().default_locale());
        println!("Blog posts: {}", state.blog.len());
        println!("Work entries: {}", state.work.len());
        println!("Configuration OK");
        return Ok(());
    }

    info!("Starting Grizzly =-=-=-=-=-=-=-=-=-=-=-=-=-=-=-");
    info!("Listening on {}:{}", config.server.address, config.server.port);

    server_run(config).await
}
