use std::path::PathBuf;

use anyhow::{ensure, Context, Result};
use clap::{Parser, Subcommand};
use rtsp_dbus::{
    Access, BusKind, ClientConfig, ControlClient, DbusConnector, HlsRequest, PropertyKey,
    PropertyValue, Resolution, RtspRequest, UpstreamRequest,
};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod output;

#[derive(Parser)]
#[command(name = "dream-rtsp-ctl")]
#[command(
    author,
    version,
    about = "Control the dreambox RTSP streaming server over D-Bus",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: ~/.config/dream-rtsp-ctl/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Use the session bus instead of the system bus
    #[arg(long, global = true)]
    session: bool,

    /// Connect to this bus address instead
    #[arg(long, global = true, value_name = "ADDRESS")]
    address: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print every property of the server
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Read one property
    Get {
        /// Property name (e.g. videoBitrate, video-bitrate)
        property: PropertyKey,
    },

    /// Write one property
    Set {
        /// Property name (e.g. inputMode, auto-bitrate)
        property: PropertyKey,
        /// New value (integer, true/false or text depending on the property)
        value: String,
    },

    /// Read or set the encoder resolution
    Resolution {
        /// WIDTHxHEIGHT, 1080, 720 or pal
        size: Option<Resolution>,
    },

    /// Enable or disable the RTSP server
    Rtsp {
        /// on, off, or a state number
        #[arg(value_parser = parse_state)]
        state: i32,
        /// Mount path
        #[arg(long)]
        path: Option<String>,
        #[arg(long)]
        port: Option<i32>,
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },

    /// Enable or disable the HLS server
    Hls {
        /// on, off, or a state number
        #[arg(value_parser = parse_state)]
        state: i32,
        #[arg(long)]
        port: Option<i32>,
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },

    /// Enable or disable the TCP upstream
    Upstream {
        /// on, off, or a state number
        #[arg(value_parser = parse_state)]
        state: i32,
        /// Mediator host
        #[arg(long)]
        host: Option<String>,
        /// Audio port
        #[arg(long)]
        aport: Option<i32>,
        /// Video port
        #[arg(long)]
        vport: Option<i32>,
    },

    /// Print server signals until interrupted
    Monitor,

    /// List the known properties
    Properties,
}

/// `on`/`off`, a state name, or the raw integer.
fn parse_state(s: &str) -> Result<i32, String> {
    match s.to_ascii_lowercase().as_str() {
        "off" | "false" | "disabled" => Ok(0),
        "on" | "true" | "idle" => Ok(1),
        "running" => Ok(2),
        other => other
            .parse()
            .map_err(|_| format!("'{s}' is not on, off or a state number")),
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("dream_rtsp_ctl=debug,rtsp_dbus=debug")
        } else {
            EnvFilter::new("dream_rtsp_ctl=warn,rtsp_dbus=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// The config's connector with `--session` and `--address` applied on top.
fn connector(cli: &Cli, config: &ClientConfig) -> DbusConnector {
    let mut connector = config.connector();
    if cli.session {
        connector = connector.with_bus(BusKind::Session);
    }
    match &cli.address {
        Some(address) => connector.with_address(address.clone()),
        None => connector,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Command::Properties = cli.command {
        list_properties();
        return Ok(());
    }

    let config = ClientConfig::load(cli.config.as_deref())?;
    let connector = connector(&cli, &config);
    debug!(bus = connector.bus().label(), address = ?connector.address(), "Connecting");
    let client =
        ControlClient::new(connector).context("failed to connect to the streaming server")?;

    match cli.command {
        Command::Status { json } => {
            let results: Vec<_> = PropertyKey::ALL
                .into_iter()
                .map(|key| (key, client.get_property(key)))
                .collect();
            if json {
                println!("{:#}", output::status_json(&results));
            } else {
                for line in output::status_lines(&results) {
                    println!("{line}");
                }
            }
        }

        Command::Get { property } => {
            let value = client
                .get_property(property)
                .with_context(|| format!("failed to read {property}"))?;
            println!("{}", output::format_value(property, &value));
        }

        Command::Set { property, value } => {
            let value = PropertyValue::parse(property.value_type(), &value)?;
            info!(%property, %value, "Setting property");
            client
                .set_property(property, value)
                .with_context(|| format!("failed to set {property}"))?;
        }

        Command::Resolution { size: None } => {
            let resolution = client.resolution().context("failed to read resolution")?;
            println!("{resolution}");
        }

        Command::Resolution { size: Some(size) } => {
            client
                .set_resolution(size.width, size.height)
                .with_context(|| format!("failed to set resolution {size}"))?;
        }

        Command::Rtsp {
            state,
            path,
            port,
            user,
            password,
        } => {
            let defaults = config.rtsp;
            let request = RtspRequest::new(state)
                .path(path.unwrap_or(defaults.path))
                .port(port.unwrap_or(defaults.port))
                .credentials(
                    user.unwrap_or(defaults.user),
                    password.unwrap_or(defaults.password),
                );
            let result = client.enable_rtsp(request).context("enableRTSP failed")?;
            ensure!(result, "the server refused enableRTSP");
        }

        Command::Hls {
            state,
            port,
            user,
            password,
        } => {
            let defaults = config.hls;
            let request = HlsRequest::new(state)
                .port(port.unwrap_or(defaults.port))
                .credentials(
                    user.unwrap_or(defaults.user),
                    password.unwrap_or(defaults.password),
                );
            let result = client.enable_hls(request).context("enableHLS failed")?;
            ensure!(result, "the server refused enableHLS");
        }

        Command::Upstream {
            state,
            host,
            aport,
            vport,
        } => {
            let defaults = config.upstream;
            let request = UpstreamRequest::new(state)
                .host(host.unwrap_or(defaults.host))
                .ports(
                    aport.unwrap_or(defaults.aport),
                    vport.unwrap_or(defaults.vport),
                );
            let result = client
                .enable_upstream(request)
                .context("enableUpstream failed")?;
            ensure!(result, "the server refused enableUpstream");
        }

        Command::Monitor => {
            let signals = client.signals().context("failed to subscribe to signals")?;
            info!("Watching for signals");
            for signal in signals {
                println!("{}", output::format_signal(&signal));
            }
        }

        Command::Properties => list_properties(),
    }

    Ok(())
}

fn list_properties() {
    for key in PropertyKey::ALL {
        let access = match key.access() {
            Access::Read => "r ",
            Access::ReadWrite => "rw",
        };
        println!("{:18} {:6} {access}", key.name(), key.value_type().to_string());
    }
}
