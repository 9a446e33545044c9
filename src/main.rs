mod camera;
mod cli;
mod config;
mod control;
mod motion;
mod naming;
mod rollover;
#[cfg(test)]
mod testing;
mod timer;

use std::process;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Command};
use config::Config;

fn main() {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    init_logging(&config.log_level);

    if let Err(e) = cli::run(cli.command.unwrap_or(Command::Run), &config) {
        tracing::error!("{e}");
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// `RUST_LOG` wins; otherwise the configured level applies to this crate.
fn init_logging(level: &str) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("catcam={level},warn").into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
