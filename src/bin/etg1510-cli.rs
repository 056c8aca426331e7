//! Command-line driver: discovers a Mailbox Gateway's Object Dictionary and prints one
//! iteration pass over it.

use std::net::IpAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use env_logger::Env;
use etg1510::{Client, Settings};

/// Read an EtherCAT main-device's ETG.1510 diagnostic profile over a Mailbox Gateway.
#[derive(Parser)]
#[command(name = "etg1510")]
struct Cli {
    /// Mailbox Gateway host address.
    host: IpAddr,

    /// JSON settings file to load defaults from and persist the host/watch list to.
    #[arg(long)]
    settings: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    // `Cli::parse()` would call `std::process::exit` with clap's own usage-error code
    // (2) on a missing/invalid argument, bypassing the exit-255 contract below; parse
    // fallibly instead so every failure path returns through the same match arm.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            eprint!("{err}");
            return ExitCode::from(255);
        }
    };

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::from(255)
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let settings_path = cli.settings.unwrap_or_else(Settings::default_path);
    let before = Settings::load_or_create(&settings_path)?;

    let mut settings = before.clone();
    settings.host = Some(cli.host.to_string());
    settings.save_reporting_diff(&before, &settings_path)?;

    let mut client = Client::new(cli.host);

    log::info!("discovering object dictionary on {}", cli.host);
    client.discover().await?;

    let indices: Vec<u16> = client.registry().indices().collect();
    log::info!("discovered {} indices", indices.len());

    let mut cursor = client.watch(indices)?;

    while let Some(result) = client.advance(&mut cursor).await {
        let (index, container) = result?;

        println!("{index:#06x}:");
        for entry in &container.entries {
            if !entry.enable {
                continue;
            }
            println!("  {} (sub {}) = {}", entry.name, entry.sub_index, entry.value);
        }
    }

    log::info!("{} requests sent", client.requests_sent());

    Ok(())
}
