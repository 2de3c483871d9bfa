//! ShuttleXpress Jog/Shuttle to Keyboard Mapper
//!
//! Main entry point: load config, open the device, create the virtual
//! keyboard and pump events until the device goes away.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info, warn};

use shuttle_keys::config::ShuttleConfig;
use shuttle_keys::device::{find_device, ShuttleDevice};
use shuttle_keys::dispatcher::Dispatcher;
use shuttle_keys::keyboard::{DryRunKeyboard, KeySink, VirtualKeyboard, UINPUT_HELP};
use shuttle_keys::runner::{self, INTERRUPTED_EXIT_CODE};

#[derive(Parser)]
#[command(name = "shuttle-keys")]
#[command(about = "Map ShuttleXpress buttons and jog wheel to keyboard shortcuts")]
struct Cli {
    /// Config file path (default: ./config.json, then ~/.config/shuttle-keys/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log key signals instead of sending them to a virtual keyboard
    #[arg(long)]
    dry_run: bool,

    /// Event node to open instead of searching by vendor/product
    #[arg(long)]
    device: Option<PathBuf>,

    /// USB vendor ID (hex)
    #[arg(long, value_parser = parse_hex_u16, default_value = "0b33")]
    vendor: u16,

    /// USB product ID (hex)
    #[arg(long, value_parser = parse_hex_u16, default_value = "0020")]
    product: u16,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn parse_hex_u16(s: &str) -> Result<u16, String> {
    let digits = s.trim_start_matches("0x").trim_start_matches("0X");
    u16::from_str_radix(digits, 16).map_err(|e| format!("invalid hex id '{s}': {e}"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // Load config
    let config_path = cli.config.unwrap_or_else(ShuttleConfig::default_path);
    info!("Loading config from {:?}", config_path);
    let config = ShuttleConfig::load(&config_path).context("Error loading config")?;
    for warning in config.validate() {
        warn!("Config: {}", warning);
    }

    // Find and open the ShuttleXpress
    let device_path = match cli.device {
        Some(path) => path,
        None => {
            info!("Searching for {:04x}:{:04x}", cli.vendor, cli.product);
            find_device(cli.vendor, cli.product).context("Could not find ShuttleXpress device")?
        }
    };
    let mut device = ShuttleDevice::open(&device_path).context("Error opening device")?;
    info!(
        "Using device: {} ({})",
        device.path().display(),
        device.name().unwrap_or("unknown")
    );

    // Create the key sink
    let sink: Box<dyn KeySink> = if cli.dry_run {
        info!("Dry run: key signals are logged, not sent");
        Box::new(DryRunKeyboard::new())
    } else {
        let mut keyboard = match VirtualKeyboard::new(&config.device_name) {
            Ok(kb) => kb,
            Err(e) => {
                error!("Error creating virtual keyboard. Please ensure:");
                for line in UINPUT_HELP {
                    error!("{}", line);
                }
                return Err(e).context("Error creating virtual keyboard");
            }
        };
        info!("Created virtual keyboard: {}", config.device_name);
        if let Some(path) = keyboard.device_path() {
            info!("Virtual keyboard path: {}", path.display());
        }
        Box::new(keyboard)
    };

    // The read loop blocks in the kernel, so Ctrl-C ends the process
    // directly. Exiting closes /dev/uinput, which removes the virtual
    // keyboard.
    ctrlc::set_handler(|| {
        info!("Interrupted, shutting down");
        std::process::exit(INTERRUPTED_EXIT_CODE);
    })
    .ok();

    let mut dispatcher = Dispatcher::new(config, sink);
    info!("ShuttleXpress mapper started. Press Ctrl+C to exit.");

    let stats = runner::run(&mut device, &mut dispatcher)
        .context("Error reading event")?;
    info!(
        "Processed {} events ({} actions, {} failed, {} ring)",
        stats.events, stats.executed, stats.failed, stats.ring_recognized
    );

    // Close the virtual keyboard before exiting
    drop(dispatcher.into_sink());
    Ok(())
}
