//! Audio output device listing command.

use clap::{Args, Subcommand};
use tonal_io::{default_output_device, list_output_devices};

#[derive(Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    command: Option<DevicesCommand>,
}

#[derive(Subcommand)]
enum DevicesCommand {
    /// List all output devices
    List,

    /// Show the default output device
    Info,
}

pub fn run(args: DevicesArgs) -> anyhow::Result<()> {
    match args.command.unwrap_or(DevicesCommand::List) {
        DevicesCommand::List => {
            let devices = list_output_devices()?;
            if devices.is_empty() {
                println!("No audio output devices found.");
                return Ok(());
            }

            println!("Output Devices:");
            for (idx, device) in devices.iter().enumerate() {
                let marker = if device.is_default { " (default)" } else { "" };
                println!(
                    "  [{}] {} ({} Hz, {} ch){}",
                    idx, device.name, device.default_sample_rate, device.channels, marker
                );
            }
            println!();
            println!("Tip: set output_device in config.toml to a partial name to select one.");
        }
        DevicesCommand::Info => match default_output_device()? {
            Some(device) => {
                println!("Default output: {}", device.name);
                println!("  Sample rate: {} Hz", device.default_sample_rate);
                println!("  Channels: {}", device.channels);
            }
            None => println!("No default output device."),
        },
    }
    Ok(())
}
