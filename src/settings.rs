use crate::aggregator::CountPolicy;
use crate::display::DisplayMode;
use crate::overlay::{parse_hex_color, OverlayGeometry, OverlayStyle, Rgb};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default settings file, resolved relative to the working directory.
pub const SETTINGS_FILE: &str = "settings.json";

/// Shortest accepted tick period.
pub const MIN_TICK_INTERVAL_MS: u64 = 50;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// Period between display refreshes in milliseconds.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Whether the counter accumulates forever or resets on every tick.
    #[serde(default)]
    pub count_policy: CountPolicy,
    /// What the overlay shows: the raw count or actions per minute.
    #[serde(default)]
    pub display_mode: DisplayMode,
    /// Value the counter starts from.
    #[serde(default)]
    pub base_count: u64,
    /// Skip keyboard and mouse input synthesised by other programs.
    #[serde(default)]
    pub ignore_injected: bool,
    #[serde(default = "default_window_width")]
    pub window_width: i32,
    #[serde(default = "default_window_height")]
    pub window_height: i32,
    /// Distance from the top of the screen. Defaults to twice the window
    /// height when missing.
    #[serde(default)]
    pub window_offset_y: Option<i32>,
    /// Alpha applied to the layered overlay, `0` fully transparent.
    #[serde(default = "default_opacity")]
    pub opacity: u8,
    #[serde(default = "default_text_color")]
    pub text_color: String,
    #[serde(default = "default_background_color")]
    pub background_color: String,
    /// Text shown in front of the number, e.g. `"APM "`.
    #[serde(default)]
    pub label: String,
    /// When enabled the logger starts at debug level and honours `RUST_LOG`.
    #[serde(default)]
    pub debug_logging: bool,
    /// Optional file receiving a copy of the log output.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

fn default_tick_interval_ms() -> u64 {
    1000
}

fn default_window_width() -> i32 {
    130
}

fn default_window_height() -> i32 {
    35
}

fn default_opacity() -> u8 {
    220
}

fn default_text_color() -> String {
    "#ffffff".into()
}

fn default_background_color() -> String {
    "#000000".into()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            count_policy: CountPolicy::default(),
            display_mode: DisplayMode::default(),
            base_count: 0,
            ignore_injected: false,
            window_width: default_window_width(),
            window_height: default_window_height(),
            window_offset_y: None,
            opacity: default_opacity(),
            text_color: default_text_color(),
            background_color: default_background_color(),
            label: String::new(),
            debug_logging: false,
            log_file: None,
        }
    }
}

impl Settings {
    /// Load settings from `path`. A missing or empty file yields the defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(MIN_TICK_INTERVAL_MS))
    }

    pub fn geometry(&self) -> OverlayGeometry {
        let width = self.window_width.max(1);
        let height = self.window_height.max(1);
        OverlayGeometry {
            width,
            height,
            top: self.window_offset_y.unwrap_or(height.saturating_mul(2)),
        }
    }

    pub fn overlay_style(&self) -> OverlayStyle {
        OverlayStyle {
            opacity: self.opacity,
            text_color: color_or(&self.text_color, Rgb::WHITE),
            background_color: color_or(&self.background_color, Rgb::BLACK),
            label: self.label.clone(),
        }
    }
}

fn color_or(value: &str, fallback: Rgb) -> Rgb {
    match parse_hex_color(value) {
        Some(color) => color,
        None => {
            tracing::warn!(
                "provided colour '{}' is invalid; using {}",
                value,
                fallback
            );
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_interval_is_clamped() {
        let mut settings = Settings::default();
        settings.tick_interval_ms = 0;
        assert_eq!(settings.tick_interval(), Duration::from_millis(50));
        settings.tick_interval_ms = 250;
        assert_eq!(settings.tick_interval(), Duration::from_millis(250));
    }

    #[test]
    fn geometry_defaults_to_twice_the_height() {
        let geometry = Settings::default().geometry();
        assert_eq!(geometry.width, 130);
        assert_eq!(geometry.height, 35);
        assert_eq!(geometry.top, 70);
    }

    #[test]
    fn huge_height_does_not_overflow_default_offset() {
        let mut settings = Settings::default();
        settings.window_height = i32::MAX;
        assert_eq!(settings.geometry().top, i32::MAX);
    }

    #[test]
    fn invalid_colour_falls_back() {
        let mut settings = Settings::default();
        settings.text_color = "nope".into();
        settings.background_color = "#102030".into();
        let style = settings.overlay_style();
        assert_eq!(style.text_color, Rgb::WHITE);
        assert_eq!(style.background_color, Rgb::new(0x10, 0x20, 0x30));
    }
}
