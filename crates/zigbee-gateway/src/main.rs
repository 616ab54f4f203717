// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Zigbee Gateway CLI
//!
//! # Usage
//!
//! ```bash
//! # Open the configured coordinator link and keep it alive
//! zigbee-gateway --config gateway.toml run
//!
//! # Encode a request
//! zigbee-gateway encode status status '"toggle"'
//!
//! # Decode a Tuya report (command 0x02)
//! zigbee-gateway decode tuyaElectricityMeter _TZE200_lsanae15 0x02 00010102000400003039
//! ```

use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use std::path::PathBuf;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;
use zigbee_gateway::adapter::{Adapter, AdapterEvent, AdapterService, Coordinator, CoordinatorInfo, Link, UnicastRequest};
use zigbee_gateway::transport::{self, hex_dump};
use zigbee_gateway::{ActionObject, GatewayConfig, PropertyObject, SysfsGpio, TransportError};

/// Zigbee Gateway
#[derive(Parser, Debug)]
#[command(name = "zigbee-gateway")]
#[command(about = "Zigbee gateway core - coordinator link, action encoding and property decoding")]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error), overrides the config
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open the coordinator link and run the adapter until Ctrl+C
    Run,

    /// Generate example configuration file
    GenConfig {
        /// Output file path
        #[arg(short, long, default_value = "gateway.toml")]
        output: PathBuf,
    },

    /// Validate a configuration file
    Validate {
        /// Configuration file path
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Encode an action request and print the frame as hex
    Encode {
        /// Action type key (e.g. "level", "tuyaLightDimmer")
        action_type: String,

        /// Action name
        name: String,

        /// Value as JSON (e.g. 128, true, "\"toggle\"")
        value: String,
    },

    /// Decode a frame through a property decoder and print the value
    Decode {
        /// Property type key (e.g. "tuyaElectricityMeter")
        property_type: String,

        /// Manufacturer name reported by the device
        manufacturer: String,

        /// Cluster command id (ignored with --attribute)
        #[arg(value_parser = parse_u8)]
        command: u8,

        /// Payload as hex
        payload: String,

        /// Decode as an attribute report for this attribute id
        #[arg(long, value_parser = parse_u16)]
        attribute: Option<u16>,

        /// Property options as a JSON object
        #[arg(long)]
        options: Option<String>,
    },
}

/// Coordinator that forwards raw payloads and logs whatever comes back.
///
/// Used by `run` when no vendor protocol is linked in.
#[derive(Debug, Default)]
struct PassthroughCoordinator {
    frames: u64,
}

impl Coordinator for PassthroughCoordinator {
    fn soft_reset(&mut self, _link: &mut Link) -> Result<(), TransportError> {
        tracing::debug!("Pass-through coordinator has no soft reset command");
        Ok(())
    }

    fn permit_join(&mut self, _link: &mut Link, enabled: bool) -> bool {
        tracing::info!("Permit join request ({})", enabled);
        true
    }

    fn unicast_request(&mut self, link: &mut Link, request: &UnicastRequest<'_>) -> bool {
        match link.send_data(request.payload) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Request 0x{:04x} not sent: {}", request.cluster_id, e);
                false
            }
        }
    }

    fn parse_data(&mut self, _link: &mut Link, data: &[u8]) -> Option<CoordinatorInfo> {
        self.frames += 1;
        tracing::info!("Frame {} received: {}", self.frames, hex_dump(data));
        None
    }

    fn handle_queue(&mut self, _link: &mut Link) {}
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Some(GatewayConfig::from_file(path)?),
        None => None,
    };

    // Initialize logging
    let level = args
        .log_level
        .clone()
        .or_else(|| config.as_ref().map(|c| c.log.level.clone()))
        .unwrap_or_else(|| "info".to_string());
    let filter = EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match args.command {
        Commands::Run => cmd_run(config.unwrap_or_default()).await,
        Commands::GenConfig { output } => cmd_gen_config(output),
        Commands::Validate { config } => cmd_validate(config),
        Commands::Encode {
            action_type,
            name,
            value,
        } => cmd_encode(&action_type, &name, &value),
        Commands::Decode {
            property_type,
            manufacturer,
            command,
            payload,
            attribute,
            options,
        } => cmd_decode(
            &property_type,
            &manufacturer,
            command,
            &payload,
            attribute,
            options.as_deref(),
        ),
    }
}

async fn cmd_run(config: GatewayConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("Zigbee Gateway v{}", env!("CARGO_PKG_VERSION"));
    println!("Port: {}", config.zigbee.port);
    println!("Press Ctrl+C to stop...");
    println!();

    let adapter = Adapter::new(
        &config,
        transport::from_config(&config.zigbee),
        PassthroughCoordinator::default(),
        Box::new(SysfsGpio::new()),
    );

    let mut events = adapter.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                AdapterEvent::Reset => tracing::debug!("Adapter reset"),
                AdapterEvent::Ready(address) => tracing::info!("Coordinator {} ready", address),
                AdapterEvent::PermitJoinUpdated(enabled) => tracing::info!("Permit join: {}", enabled),
            }
        }
    });

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(true);
        }
    });

    let adapter = AdapterService::new(adapter).run(shutdown_rx).await;
    println!("\nShutting down...");
    println!("Frames received: {}", adapter.coordinator().frames);
    Ok(())
}

fn cmd_gen_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = GatewayConfig::default();
    config.zigbee.port = "tcp://192.168.1.20:6638".into();
    config.zigbee.channel = 15;
    config.zigbee.reset = "soft".into();

    let toml_str = toml::to_string_pretty(&config)?;

    let content = format!(
        r#"# Zigbee Gateway Configuration
# Generated by zigbee-gateway gen-config
#
# zigbee.port:  serial device ("/dev/ttyUSB0") or "tcp://host:port"
# zigbee.reset: "gpio", "flow" or "soft"
# gpio.*:       sysfs pin numbers, "-1" disables a pin

{}
"#,
        toml_str
    );

    std::fs::write(&output, content)?;
    println!("Generated configuration file: {}", output.display());
    Ok(())
}

fn cmd_validate(config_path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    match GatewayConfig::from_file(&config_path) {
        Ok(config) => {
            println!("Configuration valid!");
            println!();
            println!("Port:     {}", config.zigbee.port);
            println!("PAN ID:   0x{:04X}", config.zigbee.panid);
            println!("Channel:  {}", config.zigbee.effective_channel());
            println!("Reset:    {}", config.zigbee.reset_strategy().as_str());
            Ok(())
        }
        Err(e) => {
            eprintln!("Configuration invalid: {}", e);
            std::process::exit(1);
        }
    }
}

fn cmd_encode(action_type: &str, name: &str, value: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut action = ActionObject::from_type(action_type)
        .ok_or_else(|| format!("Unknown action type: {}", action_type))?;

    // Bare words are taken as strings.
    let value: Value = serde_json::from_str(value).unwrap_or_else(|_| Value::from(value));

    let frame = action.request(name, &value)?;
    println!("cluster:      0x{:04x}", action.cluster_id());
    if action.manufacturer_code() != 0 {
        println!("manufacturer: 0x{:04x}", action.manufacturer_code());
    }
    println!("frame:        {}", hex::encode(frame));
    Ok(())
}

fn cmd_decode(
    property_type: &str,
    manufacturer: &str,
    command: u8,
    payload: &str,
    attribute: Option<u16>,
    options: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut property = PropertyObject::from_type(property_type, manufacturer)
        .ok_or_else(|| format!("Unknown property type: {}", property_type))?;

    if let Some(options) = options {
        let options: Map<String, Value> = serde_json::from_str(options)?;
        property.set_options(options);
    }

    let data = hex::decode(payload.trim().replace(':', ""))?;
    match attribute {
        Some(attribute_id) => property.parse_attribute(attribute_id, &data),
        None => property.parse_command(command, &data),
    }

    match property.value() {
        Some(value) => println!("{}", serde_json::to_string_pretty(value)?),
        None => println!("(no value)"),
    }
    Ok(())
}

fn parse_u8(s: &str) -> Result<u8, String> {
    parse_u16(s).and_then(|v| u8::try_from(v).map_err(|e| e.to_string()))
}

fn parse_u16(s: &str) -> Result<u16, String> {
    let s = s.trim();
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(digits) => u16::from_str_radix(digits, 16),
        None => s.parse(),
    }
    .map_err(|e| e.to_string())
}
