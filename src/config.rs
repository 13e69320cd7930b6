use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::controller::ScrambleSettings;
use crate::plan::{PlanOptions, SpeedRange};
use crate::render::{glyph_chance_or_default, DEFAULT_GLYPH_CHANCE};

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Window title shown in the border
    pub title: String,
    /// Alignment of the title: "left", "center", "right"
    pub title_alignment: String,

    /// Phrases cycled through by the terminal host
    pub phrases: Vec<String>,

    pub animation: AnimationConfig,
    pub border: BorderConfig,
    pub colors: ColorConfig,
    pub keys: KeyConfig,
    pub layout: LayoutConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// `[min_frames, max_frames]` each character spends scrambling
    pub speed: SpeedRange,
    /// Start offsets are drawn from `[0, stagger_frames)`
    pub stagger_frames: u32,
    /// Chance per frame that an in-flight glyph changes
    pub glyph_chance: f64,
    /// Delay between frames in milliseconds
    pub frame_interval_ms: u64,
    /// Pause after a phrase settles before moving on
    pub hold_ms: u64,
    pub autoplay: bool,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BorderConfig {
    pub enabled: bool,
    pub style: String, // "plain", "rounded", "double", "thick"
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub foreground: String,
    pub background: String,
    pub border: String,
    pub in_flight_fg: String,
    pub in_flight_modifier: Vec<String>, // "bold", "dim", "italic", ...
    pub help_fg: String,
    pub help_key_fg: String,
    pub help_key_modifier: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyConfig {
    pub next: Vec<String>,
    pub previous: Vec<String>,
    pub toggle_autoplay: Vec<String>,
    pub quit: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub min_width: u16,
    /// Maximum width of the box (0 = unlimited)
    pub max_width: u16,
    /// Padding inside the box
    pub padding: u16,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            title: " rescramble ".to_string(),
            title_alignment: "center".to_string(),
            phrases: [
                "Neo,",
                "sooner or later",
                "you're going to realize",
                "just as I did",
                "that there's a difference",
                "between knowing the path",
                "and walking the path",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            animation: AnimationConfig::default(),
            border: BorderConfig::default(),
            colors: ColorConfig::default(),
            keys: KeyConfig::default(),
            layout: LayoutConfig::default(),
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            speed: SpeedRange::default(),
            stagger_frames: PlanOptions::DEFAULT_STAGGER_FRAMES,
            glyph_chance: DEFAULT_GLYPH_CHANCE,
            frame_interval_ms: 16,
            hold_ms: 1800,
            autoplay: true,
            seed: None,
        }
    }
}

impl Default for BorderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            style: "rounded".to_string(),
        }
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            foreground: "white".to_string(),
            background: "black".to_string(),
            border: "cyan".to_string(),
            in_flight_fg: "darkgray".to_string(),
            in_flight_modifier: vec![],
            help_fg: "gray".to_string(),
            help_key_fg: "cyan".to_string(),
            help_key_modifier: vec!["bold".to_string()],
        }
    }
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            next: vec!["Right".to_string(), "l".to_string(), "Enter".to_string()],
            previous: vec!["Left".to_string(), "h".to_string()],
            toggle_autoplay: vec!["Space".to_string()],
            quit: vec!["Esc".to_string(), "q".to_string()],
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            min_width: 30,
            max_width: 80,
            padding: 2,
        }
    }
}

impl AnimationConfig {
    /// Engine settings, with out-of-range values pulled back and reported.
    pub fn scramble_settings(&self) -> ScrambleSettings {
        let glyph_chance = if (0.0..=1.0).contains(&self.glyph_chance) {
            self.glyph_chance
        } else {
            tracing::warn!(
                glyph_chance = self.glyph_chance,
                "glyph_chance outside [0, 1], clamping"
            );
            glyph_chance_or_default(self.glyph_chance)
        };
        if self.stagger_frames == 0 {
            tracing::warn!("stagger_frames = 0, treating as 1");
        }
        ScrambleSettings {
            stagger_frames: self.stagger_frames.max(1),
            glyph_chance,
            seed: self.seed,
        }
    }
}

/// Build a speed range from raw bounds, warning when they had to be clamped.
pub fn speed_from_bounds(min_frames: u32, max_frames: u32) -> SpeedRange {
    if SpeedRange::was_clamped(min_frames, max_frames) {
        let clamped = SpeedRange::new(min_frames, max_frames);
        tracing::warn!(
            min_frames,
            max_frames,
            clamped_min = clamped.min_frames(),
            clamped_max = clamped.max_frames(),
            "speed range out of order, clamping"
        );
    }
    SpeedRange::new(min_frames, max_frames)
}

// ============================================================================
// CONFIG LOADING
// ============================================================================

pub fn get_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "rescramble").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Load from the default location, falling back to defaults on any problem.
pub fn load_config() -> Config {
    if let Some(config_path) = get_config_path() {
        if config_path.exists() {
            match load_config_from_path(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    eprintln!("Warning: {:#}", e);
                    eprintln!("Using default configuration.");
                    tracing::warn!("falling back to default configuration: {e:#}");
                }
            }
        }
    }
    Config::default()
}

pub fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}

pub fn write_default_config(path: &Path) -> Result<()> {
    let config_dir = path.parent().context("Invalid config path")?;

    fs::create_dir_all(config_dir).with_context(|| {
        format!(
            "Failed to create config directory: {}",
            config_dir.display()
        )
    })?;

    fs::write(path, generate_default_config())
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;

    Ok(())
}

pub fn generate_default_config() -> String {
    String::from(
        r##"## rescramble configuration file
## Place this file at ~/.config/rescramble/config.toml
## All fields are optional - defaults will be used for missing values

title = " rescramble "
title_alignment = "center"  ## Options: "left", "center", "right"

## Phrases cycled through, in order
phrases = [
    "Neo,",
    "sooner or later",
    "you're going to realize",
    "just as I did",
    "that there's a difference",
    "between knowing the path",
    "and walking the path",
]

[animation]
## Frames each character spends scrambling: [min, max]
## min is raised to 1 and max is raised to min if out of order
speed = [8, 20]
## Characters start scrambling at a random frame in [0, stagger_frames)
stagger_frames = 10
## Chance per frame (0.0 - 1.0) that a scrambling glyph changes
glyph_chance = 0.28
frame_interval_ms = 16
## Pause after a phrase settles before the next one starts
hold_ms = 1800
autoplay = true
## Uncomment for a reproducible animation
## seed = 42

[border]
enabled = true
style = "rounded"  ## Options: "plain", "rounded", "double", "thick"

[colors]
## Available colors:
## Standard: black, red, green, yellow, blue, magenta, cyan, gray, white
## Light variants: lightred, lightgreen, lightyellow, lightblue, lightmagenta, lightcyan
## Dark variants: darkgray
## Hex: "#RRGGBB" (e.g., "#ff0000" for red)
foreground = "white"
background = "black"
border = "cyan"
in_flight_fg = "darkgray"
in_flight_modifier = []  ## Options: bold, dim, italic, underlined, slowblink, rapidblink, reversed, hidden, crossedout
help_fg = "gray"
help_key_fg = "cyan"
help_key_modifier = ["bold"]

[keys]
## Key names: Use crossterm KeyCode names
## Examples: "q", "Esc", "Enter", "Space", "Up", "Down", "Left", "Right", "Tab"
## Modifiers can be added with format: "Ctrl-q", "Alt-q", "Shift-Up"
next = ["Right", "l", "Enter"]
previous = ["Left", "h"]
toggle_autoplay = ["Space"]
quit = ["Esc", "q"]

[layout]
min_width = 30
## Maximum width of the box (0 = unlimited)
max_width = 80
## Padding inside the box
padding = 2
"##,
    )
}
