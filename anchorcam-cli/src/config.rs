//! Configuration handling for the anchorcam CLI

use anchorcam_core::{DisplayRotation, RenderConfig};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory renderers load assets from; checked during setup when set
    #[serde(default)]
    pub asset_dir: Option<PathBuf>,

    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub render: RenderConfig,

    #[serde(default)]
    pub simulation: SimulationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_height")]
    pub height: u32,

    #[serde(default)]
    pub rotation: DisplayRotation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of render ticks to run
    #[serde(default = "default_ticks")]
    pub ticks: u64,

    /// Delay between ticks
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Delay between taps from the input thread
    #[serde(default = "default_tap_interval_ms")]
    pub tap_interval_ms: u64,

    /// Frame at which camera tracking pauses (0 disables)
    #[serde(default = "default_pause_at")]
    pub pause_at: u64,

    /// How many frames the pause lasts
    #[serde(default = "default_pause_frames")]
    pub pause_frames: u64,

    /// Fail every Nth frame with CameraUnavailable (0 disables)
    #[serde(default = "default_camera_failure_every")]
    pub camera_failure_every: u64,

    /// Pause each anchor's tracking one frame in N (0 disables)
    #[serde(default = "default_anchor_loss_every")]
    pub anchor_loss_every: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            rotation: DisplayRotation::default(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            ticks: default_ticks(),
            tick_interval_ms: default_tick_interval_ms(),
            tap_interval_ms: default_tap_interval_ms(),
            pause_at: default_pause_at(),
            pause_frames: default_pause_frames(),
            camera_failure_every: default_camera_failure_every(),
            anchor_loss_every: default_anchor_loss_every(),
        }
    }
}

fn default_width() -> u32 { 1080 }
fn default_height() -> u32 { 1920 }
fn default_ticks() -> u64 { 600 }
fn default_tick_interval_ms() -> u64 { 16 }
fn default_tap_interval_ms() -> u64 { 200 }
fn default_pause_at() -> u64 { 240 }
fn default_pause_frames() -> u64 { 45 }
fn default_camera_failure_every() -> u64 { 97 }
fn default_anchor_loss_every() -> u64 { 50 }

/// Load configuration from file or use defaults
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    if let Some(path) = path {
        read_config(&path)
    } else if let Some(home) = dirs::home_dir() {
        let default_path = home.join(".anchorcam").join("config.toml");
        if default_path.exists() {
            read_config(&default_path)
        } else {
            Ok(Config::default())
        }
    } else {
        Ok(Config::default())
    }
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: Config =
        toml::from_str(&content).with_context(|| format!("parsing config {}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[display]
width = 720
rotation = "rotation90"

[render]
clear_color = [1.0, 0.0, 0.0, 1.0]

[simulation]
ticks = 30
"#
        )
        .unwrap();

        let config = load_config(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.display.width, 720);
        assert_eq!(config.display.height, 1920);
        assert_eq!(config.display.rotation, DisplayRotation::Rotation90);
        assert_eq!(config.render.clear_color, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(config.simulation.ticks, 30);
        assert_eq!(config.simulation.tap_interval_ms, 200);
        assert!(config.asset_dir.is_none());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(dir.path().join("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("nope.toml"));
    }

    #[test]
    fn default_round_trips_through_toml() {
        let text = toml::to_string(&Config::default()).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, Config::default());
    }
}
