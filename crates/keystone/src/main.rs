mod cli;
mod logging;
mod modules;

use std::time::Duration;

use clap::Parser;
use keystone_core::kernel::constants;
use keystone_core::{KernelError, Server, ServerConfig};
use log::{error, info};

use crate::cli::CliArgs;

async fn start(args: CliArgs) -> Result<(), KernelError> {
    let config = match &args.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    logging::init(&config.logging)?;
    info!("{} v{} starting", constants::APP_NAME, constants::APP_VERSION);

    let mut server = Server::with_config(config);
    let scheduler = server.supervisor().scheduler();
    server.register_module(modules::storage()?).await?;
    server.register_module(modules::metrics(scheduler)?).await?;

    let run_for = args.run_for;
    let shutdown = async move {
        match run_for {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    error!("Failed to listen for Ctrl-C: {}", e);
                }
            }
        }
    };

    server.run(&args.action, shutdown).await
}

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    if let Err(e) = start(args).await {
        error!("Startup failed: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
