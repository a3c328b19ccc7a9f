use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use razer_core::{
    ClientConfig, DevId, PROFILE_INVALID, RazerClient, Rgb, firmware,
    transport::UnixChannel,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Razer device configuration tool", long_about = None)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List detected mice
    List,
    /// Show capabilities and firmware version of a mouse
    Info {
        /// Device identity string, as printed by `list`
        idstr: String,
    },
    /// Ask the daemon to rescan for mice
    Rescan,
    /// Show the LEDs of a mouse
    Leds {
        idstr: String,
        /// Profile to inspect; omit for the global LEDs
        #[arg(long)]
        profile: Option<u32>,
    },
    /// Turn a LED on or off, optionally setting its color
    SetLed {
        idstr: String,
        /// LED name, as printed by `leds`
        name: String,
        /// on or off
        state: String,
        /// New color as RRGGBB hex
        #[arg(long)]
        color: Option<Rgb>,
        #[arg(long)]
        profile: Option<u32>,
    },
    /// Show the profiles of a mouse and their names
    Profiles { idstr: String },
    /// Select the active profile
    SetProfile { idstr: String, profile: u32 },
    /// Show the scan frequency and the supported values
    Freq {
        idstr: String,
        #[arg(long)]
        profile: Option<u32>,
    },
    /// Set the scan frequency, in Hz
    SetFreq {
        idstr: String,
        freq: u32,
        #[arg(long)]
        profile: Option<u32>,
    },
    /// Flash a firmware update file onto a mouse
    Flash {
        idstr: String,
        /// Path to the vendor firmware update file
        file: String,
    },
}

fn main() {
    let args = Args::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(if args.verbose {
                    tracing::Level::DEBUG.into()
                } else {
                    tracing::Level::INFO.into()
                })
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    if let Err(e) = run(args) {
        error!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => ClientConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config from {path}"))?,
        None => ClientConfig::default(),
    };

    let mut client = RazerClient::<UnixChannel>::connect(&config)?;

    match args.command {
        Command::List => {
            for idstr in client.get_mice()? {
                let dev = DevId::parse(&idstr);
                println!("{idstr}");
                println!("    {} {} on {} bus, position {}", dev.devtype, dev.devname, dev.bustype, dev.buspos);
            }
        }
        Command::Info { idstr } => {
            let flags = client.get_mouse_info(&idstr)?;
            let version = client.get_fw_version(&idstr)?;
            println!("Firmware version: {version}");
            println!("Capability flags: {flags:#010X}");
            let axes = client.get_supported_axes(&idstr)?;
            for axis in &axes {
                println!(
                    "Axis {}: {}{}",
                    axis.id,
                    axis.name,
                    if axis.has_independent_dpi_mapping() {
                        " (independent DPI mapping)"
                    } else {
                        ""
                    }
                );
            }
        }
        Command::Rescan => {
            client.rescan_mice()?;
            info!("Rescan requested");
        }
        Command::Leds { idstr, profile } => {
            let profile_id = profile.unwrap_or(PROFILE_INVALID);
            for led in client.get_leds(&idstr, profile_id)? {
                let state = if led.state { "on" } else { "off" };
                match led.color {
                    Some(color) => println!("{}: {state}, color {color}", led.name),
                    None => println!("{}: {state}", led.name),
                }
            }
        }
        Command::SetLed {
            idstr,
            name,
            state,
            color,
            profile,
        } => {
            let state = match state.as_str() {
                "on" | "1" => true,
                "off" | "0" => false,
                other => bail!("Invalid LED state '{other}', expected on or off"),
            };
            let profile_id = profile.unwrap_or(PROFILE_INVALID);
            let leds = client.get_leds(&idstr, profile_id)?;
            let mut led = leds
                .into_iter()
                .find(|led| led.name == name)
                .with_context(|| format!("No LED named '{name}'"))?;
            led.state = state;
            if let Some(color) = color {
                if !led.can_change_color {
                    warn!(led = %led.name, "LED does not support color changes");
                }
                led.color = Some(color);
            }
            let status = client.set_led(&idstr, &led)?;
            if !status.is_ok() {
                bail!("Failed to set LED: {status}");
            }
        }
        Command::Profiles { idstr } => {
            let active = client.get_active_profile(&idstr)?;
            for profile_id in client.get_profiles(&idstr)? {
                let name = client.get_profile_name(&idstr, profile_id)?;
                let marker = if profile_id == active { " (active)" } else { "" };
                println!("{profile_id}: {name}{marker}");
            }
        }
        Command::SetProfile { idstr, profile } => {
            let status = client.set_active_profile(&idstr, profile)?;
            if !status.is_ok() {
                bail!("Failed to set active profile: {status}");
            }
        }
        Command::Freq { idstr, profile } => {
            let profile_id = match profile {
                Some(id) => id,
                None => client.get_active_profile(&idstr)?,
            };
            let current = client.get_freq(&idstr, profile_id)?;
            let supported = client.get_supported_freqs(&idstr)?;
            println!("Current: {current} Hz");
            println!(
                "Supported: {}",
                supported
                    .iter()
                    .map(|f| f.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
        Command::SetFreq {
            idstr,
            freq,
            profile,
        } => {
            let profile_id = match profile {
                Some(id) => id,
                None => client.get_active_profile(&idstr)?,
            };
            let status = client.set_freq(&idstr, profile_id, freq)?;
            if !status.is_ok() {
                bail!("Failed to set frequency: {status}");
            }
        }
        Command::Flash { idstr, file } => {
            if !client.has_privilege() {
                bail!("Flashing requires access to the privileged razerd socket");
            }
            let raw = std::fs::read(&file)
                .with_context(|| format!("Failed to read firmware file {file}"))?;
            let image = firmware::extract(&raw)?;
            info!(len = image.len(), "Uploading firmware image");
            let status = client.flash_firmware(&idstr, &image)?;
            if !status.is_ok() {
                bail!("Firmware flash failed: {status}");
            }
            println!("Firmware flashed successfully");
        }
    }
    Ok(())
}
