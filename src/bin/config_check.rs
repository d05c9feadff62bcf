//! Configuration Check
//!
//! Loads a configuration file the same way the node does, validates it and
//! prints the effective protocol constants.

use clap::Parser;
use std::path::PathBuf;

use flight_surety::config::load_config;

#[derive(Parser)]
#[command(name = "config-check")]
#[command(about = "Validate a flight-surety configuration file")]
struct Cli {
    /// TOML configuration file; defaults and environment only when omitted
    path: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match load_config(cli.path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    };

    println!("✓ Configuration valid");
    println!("authority = \"{}\"", config.authority);
    println!("founding_airline = \"{}\"", config.founding_airline);
    println!();
    println!("[protocol]");
    print!("{}", config.protocol.to_toml()?);

    Ok(())
}
