//! Akai APC Key 25 driver
//!
//! Handles MIDI communication with the controller. Incoming bytes are decoded
//! on the midir thread and forwarded to the main loop over a channel; all
//! routing happens on the receiving side.

use anyhow::{Context, Result};
use midir::{MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::leds::MidiSink;
use crate::midi::{format_hex, unpack, MidiEvent};

/// MIDI event from the controller
#[derive(Debug, Clone)]
pub struct ApcEvent {
    pub timestamp: Instant,
    pub event: MidiEvent,
}

/// Shared handle on an output connection
#[derive(Clone)]
pub struct OutputSink {
    name: String,
    conn: Arc<Mutex<MidiOutputConnection>>,
}

impl OutputSink {
    /// Send raw MIDI bytes
    pub fn send_bytes(&self, data: &[u8]) -> Result<()> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|_| anyhow::anyhow!("Output connection '{}' poisoned", self.name))?;
        conn.send(data).context("Failed to send MIDI data")?;
        Ok(())
    }
}

impl MidiSink for OutputSink {
    fn send_raw(&mut self, message: u32) {
        let data = unpack(message);
        match self.send_bytes(&data) {
            Ok(()) => debug!("Sent LED: {}", format_hex(&data)),
            Err(e) => warn!("Failed to send LED message to '{}': {}", self.name, e),
        }
    }
}

/// Controller driver for hardware communication
pub struct ApcKeyDriver {
    /// MIDI input connection
    input_conn: Option<MidiInputConnection<()>>,

    /// MIDI output connection
    output: Option<OutputSink>,

    /// Event sender for incoming MIDI
    event_tx: mpsc::Sender<ApcEvent>,

    /// Event receiver
    event_rx: Option<mpsc::Receiver<ApcEvent>>,

    /// Whether decoded events carry the host system flag
    system_events: bool,

    /// Input port name pattern
    input_port_name: String,

    /// Output port name pattern
    output_port_name: String,
}

impl ApcKeyDriver {
    /// Create a new driver from configuration
    pub fn new(config: &AppConfig) -> Self {
        let (event_tx, event_rx) = mpsc::channel(1000);

        Self {
            input_conn: None,
            output: None,
            event_tx,
            event_rx: Some(event_rx),
            system_events: config.midi.system_events,
            input_port_name: config.midi.input_port.clone(),
            output_port_name: config.midi.output_port.clone(),
        }
    }

    /// Find an input port by case-insensitive substring match
    fn find_input_port(
        midi_in: &MidiInput,
        pattern: &str,
    ) -> Option<(midir::MidiInputPort, String)> {
        let pattern = pattern.to_lowercase();
        midi_in.ports().into_iter().find_map(|port| {
            let name = midi_in.port_name(&port).ok()?;
            if name.to_lowercase().contains(&pattern) {
                debug!("Found input port '{}' matching '{}'", name, pattern);
                Some((port, name))
            } else {
                None
            }
        })
    }

    /// Connect to the controller ports
    pub fn connect(&mut self) -> Result<()> {
        self.disconnect();

        info!(
            "Connecting to APC Key 25 - Input: '{}', Output: '{}'",
            self.input_port_name, self.output_port_name
        );

        let midi_in = MidiInput::new("APCKey-GW-Input").context("Failed to create MIDI input")?;
        debug!("Found {} MIDI input ports", midi_in.port_count());

        let (in_port, port_name) = Self::find_input_port(&midi_in, &self.input_port_name)
            .ok_or_else(|| anyhow::anyhow!("Input port '{}' not found", self.input_port_name))?;

        info!("Connecting to input port: {}", port_name);

        let event_tx = self.event_tx.clone();
        let system = self.system_events;

        let input_conn = midi_in
            .connect(
                &in_port,
                "APCKey-GW",
                move |_timestamp, data, _| match MidiEvent::from_bytes(data) {
                    Ok(event) => {
                        let event = ApcEvent {
                            timestamp: Instant::now(),
                            event: event.with_system(system),
                        };
                        // Never block the MIDI thread
                        let _ = event_tx.try_send(event);
                    }
                    Err(e) => debug!("Dropping input {}: {}", format_hex(data), e),
                },
                (),
            )
            .map_err(|e| anyhow::anyhow!("Failed to connect to input port: {}", e))?;

        self.input_conn = Some(input_conn);
        self.output = Some(connect_output("APCKey-GW-Output", &self.output_port_name)?);

        info!("APC Key 25 connected");
        Ok(())
    }

    /// Disconnect from MIDI ports
    pub fn disconnect(&mut self) {
        let had_input = self.input_conn.take().is_some();
        let had_output = self.output.take().is_some();
        if had_input || had_output {
            info!("APC Key 25 disconnected");
        }
    }

    pub fn is_connected(&self) -> bool {
        self.input_conn.is_some() && self.output.is_some()
    }

    /// Outbound sink for the LED driver
    pub fn output_sink(&self) -> Option<OutputSink> {
        self.output.clone()
    }

    /// Take the event receiver (for the main loop to consume)
    pub fn take_event_receiver(&mut self) -> Option<mpsc::Receiver<ApcEvent>> {
        self.event_rx.take()
    }
}

/// Open an output port by case-insensitive substring match
pub fn connect_output(client_name: &str, pattern: &str) -> Result<OutputSink> {
    let midi_out = MidiOutput::new(client_name).context("Failed to create MIDI output")?;
    debug!("Found {} MIDI output ports", midi_out.port_count());

    let needle = pattern.to_lowercase();
    let (out_port, port_name) = midi_out
        .ports()
        .into_iter()
        .find_map(|port| {
            let name = midi_out.port_name(&port).ok()?;
            name.to_lowercase().contains(&needle).then_some((port, name))
        })
        .ok_or_else(|| anyhow::anyhow!("Output port '{}' not found", pattern))?;

    info!("Connecting to output port: {}", port_name);

    let conn = midi_out
        .connect(&out_port, client_name)
        .map_err(|e| anyhow::anyhow!("Failed to connect to output port: {}", e))?;

    Ok(OutputSink {
        name: port_name,
        conn: Arc::new(Mutex::new(conn)),
    })
}

/// Port discovery utilities
pub mod discovery {
    use super::*;

    /// Information about a MIDI port
    #[derive(Debug, Clone)]
    pub struct PortInfo {
        pub index: usize,
        pub name: String,
        pub is_virtual: bool,
    }

    fn is_virtual(name: &str) -> bool {
        name.contains("Virtual") || name.contains("loopMIDI") || name.contains("IAC")
    }

    /// Discover input ports
    pub fn discover_input_ports() -> Result<Vec<PortInfo>> {
        let midi_in = MidiInput::new("APCKey-GW-Discovery")?;

        Ok(midi_in
            .ports()
            .iter()
            .enumerate()
            .filter_map(|(index, port)| {
                let name = midi_in.port_name(port).ok()?;
                Some(PortInfo {
                    index,
                    is_virtual: is_virtual(&name),
                    name,
                })
            })
            .collect())
    }

    /// Discover output ports
    pub fn discover_output_ports() -> Result<Vec<PortInfo>> {
        let midi_out = MidiOutput::new("APCKey-GW-Discovery")?;

        Ok(midi_out
            .ports()
            .iter()
            .enumerate()
            .filter_map(|(index, port)| {
                let name = midi_out.port_name(port).ok()?;
                Some(PortInfo {
                    index,
                    is_virtual: is_virtual(&name),
                    name,
                })
            })
            .collect())
    }

    /// Print discovered ports
    pub fn print_ports() {
        println!("\n=== MIDI Input Ports ===");
        if let Ok(ports) = discover_input_ports() {
            for port in &ports {
                let tag = if port.is_virtual { " [VIRTUAL]" } else { "" };
                println!("  {}: {}{}", port.index, port.name, tag);
            }
        }

        println!("\n=== MIDI Output Ports ===");
        if let Ok(ports) = discover_output_ports() {
            for port in &ports {
                let tag = if port.is_virtual { " [VIRTUAL]" } else { "" };
                println!("  {}: {}{}", port.index, port.name, tag);
            }
        }
        println!();
    }
}
