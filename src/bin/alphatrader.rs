//! Minimal CLI entrypoint: replay a historical CSV file onto the in-process
//! data bus, logging every event a subscriber receives.

use alphatrader::config::Config;
use alphatrader::events::{DataBus, Subscriber};
use alphatrader::feeds::{CsvFeed, DataFeed};
use alphatrader::utils::{init_logging, resolve_data_file};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "alphatrader", author, version, about = "AlphaTrader market data CLI", long_about = None)]
struct Args {
    /// Path to the configuration file (TOML)
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Print the default configuration to stdout and exit
    #[arg(long)]
    print_default_config: bool,

    /// Command to execute
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Replay a historical CSV file onto the bus
    Feed {
        /// Path to the market data CSV (bare names resolve against ./data)
        #[arg(long)]
        data: String,
        /// Instrument ticket the file represents, e.g. AAPL
        #[arg(long)]
        ticket: String,
        /// Bus channel to publish on (overrides config)
        #[arg(long)]
        channel: Option<String>,
        /// Seconds to wait between events (overrides config)
        #[arg(long)]
        delay: Option<f64>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        println!("{}", Config::default().to_toml_string()?);
        return Ok(());
    }

    let config = if Path::new(&args.config).exists() {
        Config::load(&args.config).with_context(|| format!("loading {}", args.config))?
    } else {
        Config::default()
    };
    init_logging(&config.app.log_level);

    match args.command {
        Some(Command::Feed { data, ticket, channel, delay }) => {
            let path = resolve_data_file(&data);
            let channel = channel.unwrap_or(config.feed.channel);
            let delay = Duration::from_secs_f64(delay.unwrap_or(config.feed.delay_secs));

            let mut bus = DataBus::new();
            bus.subscribe(
                &channel,
                Subscriber::new(|event| {
                    let payload = serde_json::to_string(event).map_err(alphatrader::Error::Json)?;
                    info!("{}", payload);
                    Ok(())
                }),
            );

            let feed = CsvFeed::new(path, ticket)
                .with_channel(channel.as_str())
                .with_delay(delay);
            feed.run(&mut bus)?;

            let failed = bus.get_failed_deliveries();
            if !failed.is_empty() {
                warn!("{} deliveries still pending after run", failed.len());
            }
        }
        None => {
            info!("No command given; try `alphatrader feed --data AAPL.csv --ticket AAPL`");
        }
    }

    Ok(())
}
