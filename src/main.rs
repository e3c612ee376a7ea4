//! Chroma Peripheral Driver CLI
//!
//! A command-line interface for controlling Razer Chroma lighting and
//! input peripherals.

use anyhow::{bail, Result};
use clap::Parser;
use hidapi::HidApi;
use tracing_subscriber::EnvFilter;

use chroma_device::ChromaDevice;
use chroma_protocol::Rgb;

mod cli;
mod discovery;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let api = HidApi::new()?;
    let found = discovery::enumerate(&api);

    match cli.command {
        None | Some(Commands::List) => {
            if found.is_empty() {
                println!("No supported devices found.");
                return Ok(());
            }
            for (index, discovered) in found.iter().enumerate() {
                println!(
                    "{index}: {} ({:04x}:{:04x})",
                    discovered.model.name, discovered.model.vid, discovered.model.pid
                );
            }
        }

        Some(Commands::Info) => {
            let device = select(&api, &found, cli.device)?;
            println!("Model:    {}", device.model().name);
            println!("Firmware: {}", device.firmware_version().await?);
            println!("Serial:   {}", device.serial_number().await?);
        }

        Some(Commands::Brightness { level }) => {
            let device = select(&api, &found, cli.device)?;
            match level {
                Some(level) => device.set_brightness(level).await?,
                None => println!("{:.1}", device.get_brightness().await?),
            }
        }

        Some(Commands::Color { r, g, b, led }) => {
            let device = select(&api, &found, cli.device)?;
            device.led(led.into()).set_color(Rgb::new(r, g, b)).await?;
        }

        Some(Commands::Reset) => {
            let device = select(&api, &found, cli.device)?;
            device.set_device_mode(0x00, 0x00).await?;
        }
    }

    Ok(())
}

fn select(
    api: &HidApi,
    found: &[discovery::Discovered],
    index: Option<usize>,
) -> Result<ChromaDevice> {
    if found.is_empty() {
        bail!("no supported devices found");
    }
    let index = index.unwrap_or(0);
    let Some(discovered) = found.get(index) else {
        bail!(
            "device index {index} out of range ({} device(s) connected)",
            found.len()
        );
    };
    discovery::open(api, discovered)
}
