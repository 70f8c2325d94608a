//! Configuration management for APCKey GW
//!
//! Handles loading, parsing and validation of the YAML configuration file.
//! Button and pad layouts are fixed by the hardware and are not configurable.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::fs;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub midi: MidiConfig,
    #[serde(default)]
    pub host: HostConfig,
}

/// MIDI port configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MidiConfig {
    /// Substring of the controller's input port name
    pub input_port: String,
    /// Substring of the controller's output port name
    pub output_port: String,
    /// Where events the router leaves unhandled are forwarded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passthrough_port: Option<String>,
    /// Whether hardware events carry the host "system" flag
    #[serde(default = "default_true")]
    pub system_events: bool,
}

/// Console host configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HostConfig {
    #[serde(default = "default_host_name")]
    pub name: String,
    /// Tempo of the beat clock driving the beat indicator
    #[serde(default = "default_tempo_bpm")]
    pub tempo_bpm: f64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            name: default_host_name(),
            tempo_bpm: default_tempo_bpm(),
        }
    }
}

impl HostConfig {
    /// Duration of one beat at the configured tempo
    pub fn beat_interval(&self) -> Duration {
        Duration::from_secs_f64(60.0 / self.tempo_bpm)
    }
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub async fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config = Self::from_yaml(&contents)
            .with_context(|| format!("Failed to parse YAML config: {}", path))?;

        Ok(config)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: AppConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for correctness and consistency
    pub fn validate(&self) -> Result<()> {
        if self.midi.input_port.trim().is_empty() {
            anyhow::bail!("MIDI input_port cannot be empty");
        }
        if self.midi.output_port.trim().is_empty() {
            anyhow::bail!("MIDI output_port cannot be empty");
        }
        if let Some(port) = &self.midi.passthrough_port {
            if port.trim().is_empty() {
                anyhow::bail!("MIDI passthrough_port cannot be empty when set");
            }
        }

        if self.host.name.is_empty() {
            anyhow::bail!("Host name cannot be empty");
        }
        if !(20.0..=300.0).contains(&self.host.tempo_bpm) {
            anyhow::bail!(
                "host.tempo_bpm must be between 20 and 300 (got {})",
                self.host.tempo_bpm
            );
        }

        Ok(())
    }
}

fn default_true() -> bool { true }
fn default_host_name() -> String { "console".to_string() }
fn default_tempo_bpm() -> f64 { 120.0 }
