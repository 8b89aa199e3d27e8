use anyhow::Context;
use clap::Parser;

use sketchd::config::{CliArgs, Config};
use sketchd::toolchain::Orchestrator;
use sketchd::web_server::build_server;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let cli = CliArgs::parse();
    let Config {
        server: server_config,
        toolchain: toolchain_config,
    } = cli.to_config().context("Failed to load configuration")?;

    let orchestrator = Orchestrator::from_config(&toolchain_config)
        .context("Failed to resolve toolchain install directory")?;
    log::info!(
        "Toolchain resolves to {}",
        orchestrator.locator().locate().display()
    );

    let server = build_server(server_config, orchestrator).context("Failed to build server")?;
    let server_handle = server.handle();
    let server_task = actix_web::rt::spawn(server);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            log::info!("Ctrl-c received, shutting down...");
        }
        res_server = server_task => {
            log::error!("Server terminated unexpectedly: {:?}", res_server);
        }
    }

    // In-flight builds finish; their children are killed if dropped
    server_handle.stop(true).await;

    log::info!("Shutdown complete");
    Ok(())
}
