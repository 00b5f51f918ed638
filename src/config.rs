use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::wheel::{SpinSpeed, DEFAULT_WHEEL_NAME};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub wheel: WheelSection,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelSection {
    pub name: String,
    pub speed: SpinSpeed,
    /// Questions placed on the wheel at startup
    pub items: Vec<String>,
    /// Text file with one question per line, appended after `items`
    pub items_file: Option<PathBuf>,
}

impl Default for WheelSection {
    fn default() -> Self {
        Self {
            name: DEFAULT_WHEEL_NAME.to_string(),
            speed: SpinSpeed::Medium,
            items: Vec::new(),
            items_file: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub enabled: bool,
    /// PulseAudio sink (None = default)
    pub device: Option<String>,
    /// Minimum spacing between tick sounds
    pub tick_throttle_ms: u64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            device: None,
            tick_throttle_ms: 25,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub fps: u32,
    pub show_sidebar: bool,
    /// Where `e` writes exported wheels (None = current directory)
    pub export_dir: Option<PathBuf>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            fps: 60,
            show_sidebar: true,
            export_dir: None,
        }
    }
}

impl DisplayConfig {
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Get the default XDG config path (~/.config/wheelspin/config.toml)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("wheelspin").join("config.toml"))
    }

    /// Load config from the default XDG path if it exists.
    /// Returns None if the file doesn't exist; parse errors are logged and
    /// fall back to defaults.
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            match Self::load(&path) {
                Ok(config) => Some(config),
                Err(e) => {
                    tracing::warn!("{:#}. Using defaults.", e);
                    None
                }
            }
        } else {
            None
        }
    }

    /// Initialize default config file at XDG path, returns the path
    pub fn init_default_config() -> Result<PathBuf> {
        let path = Self::default_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&path, Self::generate_config_template())?;

        Ok(path)
    }

    /// Generate a commented TOML config template
    pub fn generate_config_template() -> String {
        r#"# Wheelspin Configuration
# This file is auto-generated. Edit as needed.

[wheel]
# Wheel name (used for export file names)
name = "Wheel Of Pain"
# Spin speed: "slow", "medium" or "fast"
speed = "medium"
# Questions placed on the wheel at startup
items = []
# Text file with one question per line (appended after items)
# items_file = "/path/to/questions.txt"

[audio]
# Play a tick sound each time the pointer passes a wedge
enabled = true
# PulseAudio sink (null = default)
# device = "alsa_output.pci-0000_00_1f.3.analog-stereo"
# Minimum milliseconds between tick sounds
tick_throttle_ms = 25

[display]
# Target frames per second for the spin animation
fps = 60
# Show the item list and progress next to the wheel
show_sidebar = true
# Directory for exported wheels (null = current directory)
# export_dir = "/home/me/wheels"
"#
        .to_string()
    }

    /// Merge CLI arguments into config (CLI takes priority)
    pub fn merge_args(&mut self, args: &crate::Args) {
        if let Some(speed) = args.speed {
            self.wheel.speed = speed;
        }
        if let Some(ref path) = args.items {
            self.wheel.items_file = Some(path.clone());
        }
        if args.mute {
            self.audio.enabled = false;
        }
        if let Some(ref device) = args.audio_device {
            self.audio.device = Some(device.clone());
        }
        if let Some(fps) = args.fps {
            self.display.fps = fps.clamp(1, 240);
        }
        if args.no_sidebar {
            self.display.show_sidebar = false;
        }
        if let Some(ref dir) = args.export_dir {
            self.display.export_dir = Some(dir.clone());
        }
    }

    /// Startup questions: inline `items` followed by the lines of `items_file`
    pub fn startup_questions(&self) -> Result<String> {
        let mut text = self.wheel.items.join("\n");
        if let Some(ref path) = self.wheel.items_file {
            let file = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read items file {}", path.display()))?;
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(&file);
        }
        Ok(text)
    }
}

/// Persist a new speed into an existing config file, keeping its comments
pub fn save_speed(path: &Path, speed: SpinSpeed) -> Result<()> {
    let content = std::fs::read_to_string(path).unwrap_or_default();
    let mut doc = content
        .parse::<toml_edit::DocumentMut>()
        .with_context(|| format!("Failed to parse config {}", path.display()))?;

    if doc.get("wheel").is_none() {
        doc["wheel"] = toml_edit::table();
    }
    doc["wheel"]["speed"] = toml_edit::value(speed.name());

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, doc.to_string())?;
    Ok(())
}
