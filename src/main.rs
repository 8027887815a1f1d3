use std::env;
use std::error::Error;
use std::process;

use clap::Parser;
use zbus::Connection;

use crate::cli::{Args, CliCommand};
use crate::config::Config;
use crate::constants::{BUS_NAME, BUS_PREFIX};
use crate::dbus::TriggerEffectsInterface;
use crate::effects::bridge::Bridge;
use crate::effects::manager::BridgeManager;
use crate::effects::message::Command;

mod cli;
mod config;
mod constants;
mod dbus;
mod drivers;
mod effects;
mod watcher;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let log_level = match env::var("LOG_LEVEL") {
        Ok(value) => value,
        Err(_) => "info".to_string(),
    };
    env::set_var("RUST_LOG", log_level);
    env_logger::init();

    let args = Args::parse();
    let config = Config::load(args.config)?;
    let mut bridge = Bridge::new(config);

    match args.command.unwrap_or(CliCommand::Daemon) {
        CliCommand::Daemon => run_daemon(bridge).await?,
        CliCommand::Devices => {
            bridge.rescan();
            for (index, device) in bridge.devices().iter().enumerate() {
                println!(
                    "#{index}: {} ({}) [{:04x}:{:04x}]",
                    device.product_name(),
                    device.manufacturer(),
                    device.vendor_id(),
                    device.product_id()
                );
            }
        }
        CliCommand::Apply(apply) => {
            bridge.rescan();
            let effect = apply.effect.to_effect();
            let result = bridge.apply(&apply.side, &effect, apply.index);
            if !result {
                process::exit(1);
            }
        }
        CliCommand::Reset => {
            bridge.rescan();
            bridge.reset_all();
        }
    }

    Ok(())
}

async fn run_daemon(bridge: Bridge) -> Result<(), Box<dyn Error + Send + Sync>> {
    log::info!("Starting TriggerBridge v{}", VERSION);

    let mut manager = BridgeManager::new(bridge);

    // Setup CTRL+C handler
    let stop_tx = manager.tx();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Unable to listen for shutdown signal: {e:?}");
            return;
        }
        log::info!("Shutting down");
        if let Err(e) = stop_tx.send(Command::Stop).await {
            log::error!("Unable to send stop command: {e:?}");
        }
    });

    // Configure the DBus connection
    let connection = Connection::session().await?;

    // Expose the trigger effect API
    let interface = TriggerEffectsInterface::new(manager.tx());
    connection.object_server().at(BUS_PREFIX, interface).await?;

    let (manager_result, request_name_result) = tokio::join!(
        // Start the bridge manager and listen on DBus
        manager.run(),
        // Request the named bus
        connection.request_name(BUS_NAME)
    );

    if let Err(e) = manager_result {
        log::error!("Error running the bridge manager task: {e}");
        return Err(e);
    }
    if let Err(e) = request_name_result {
        log::error!("Error in dbus request name operation: {e}");
        return Err(Box::new(e));
    }

    log::info!("TriggerBridge stopped");

    Ok(())
}
