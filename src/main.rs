//! APCKey GW - Rust implementation
//!
//! Gateway turning an Akai APC Key 25 MK2 into a transport surface.

use anyhow::Result;
use clap::Parser;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use apckey_gw::apc::{self, ApcKeyDriver, OutputSink};
use apckey_gw::config::AppConfig;
use apckey_gw::midi::{MessageKind, MidiEvent};
use apckey_gw::{ConsoleHost, Router};

/// APCKey Gateway - drive a host transport from an Akai APC Key 25 MK2
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// List available MIDI ports
    #[arg(long)]
    list_ports: bool,
}

type SurfaceRouter = Router<ConsoleHost, OutputSink>;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_logging(&args.log_level)?;

    info!("Starting APCKey GW v{}...", env!("CARGO_PKG_VERSION"));

    if args.list_ports {
        apc::discovery::print_ports();
        return Ok(());
    }

    info!("Configuration file: {}", args.config);
    let config = AppConfig::load(&args.config).await?;
    info!("Configuration loaded successfully");

    run_app(config, shutdown_signal()).await?;

    info!("APCKey GW shutdown complete");
    Ok(())
}

async fn run_app(
    config: AppConfig,
    shutdown: impl std::future::Future<Output = ()>,
) -> Result<()> {
    let mut controller = ApcKeyDriver::new(&config);
    controller.connect()?;

    let mut controller_rx = controller
        .take_event_receiver()
        .ok_or_else(|| anyhow::anyhow!("Controller event receiver already taken"))?;
    let sink = controller
        .output_sink()
        .ok_or_else(|| anyhow::anyhow!("Controller output not connected"))?;

    let passthrough = match &config.midi.passthrough_port {
        Some(port) => Some(apc::connect_output("APCKey-GW-Passthrough", port)?),
        None => None,
    };

    let mut router: SurfaceRouter = Router::new(ConsoleHost::new(config.host.name.clone()), sink);
    router.on_init();
    router.on_update_live_mode(0);
    info!("Router initialized in {:?} mode", router.mode());

    // Half-beat ticks so the indicator can go dark between beats
    let mut beat_clock = tokio::time::interval(config.host.beat_interval() / 2);
    beat_clock.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    tokio::pin!(shutdown);

    info!("Starting main application loop...");
    loop {
        tokio::select! {
            Some(apc_event) = controller_rx.recv() => {
                debug!(
                    "Controller event after {:?}: {}",
                    apc_event.timestamp.elapsed(),
                    apc_event.event
                );
                handle_controller_event(&mut router, passthrough.as_ref(), apc_event.event);
            }

            _ = beat_clock.tick() => {
                let value = router.host_mut().beat_tick();
                router.on_update_beat_indicator(value);
            }

            _ = &mut shutdown => {
                info!("Shutting down...");
                break;
            }
        }
    }

    router.on_deinit();
    controller.disconnect();
    Ok(())
}

/// Deliver one controller event through the surface callbacks
///
/// Errors are reported and the event dropped; the loop keeps running.
fn handle_controller_event(
    router: &mut SurfaceRouter,
    passthrough: Option<&OutputSink>,
    mut event: MidiEvent,
) {
    if let Err(e) = router.on_midi_in(&mut event) {
        error!("Rejected controller input {}: {}", event, e);
        return;
    }
    if let Err(e) = router.on_midi_msg(&mut event) {
        error!("Failed to route {}: {}", event, e);
        return;
    }
    if event.handled {
        return;
    }

    match event.kind() {
        MessageKind::NoteOn => router.on_note_on(&event),
        MessageKind::NoteOff => router.on_note_off(&event),
        MessageKind::ControlChange => router.on_control_change(&event),
        MessageKind::ChannelPressure => router.on_channel_pressure(&event),
        MessageKind::Other => {}
    }

    if let Some(out) = passthrough {
        if let Err(e) = out.send_bytes(&event.encode()) {
            warn!("Passthrough send failed: {}", e);
        }
    }
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .init();

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
    info!("Shutdown signal received");
}
