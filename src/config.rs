use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SpirographError;
use crate::Args;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub spirograph: SpirographConfig,
    pub colors: ColorConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub fps_limit: u32,
    pub vsync: bool,
    pub antialiasing: u32,
    pub fullscreen: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig {
            width: 800,
            height: 800,
            fps_limit: 60,
            vsync: true,
            antialiasing: 8,
            fullscreen: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpirographConfig {
    pub outer_radius: u32,
    pub inner_radius: u32,
}

impl Default for SpirographConfig {
    fn default() -> Self {
        SpirographConfig {
            outer_radius: 400,
            inner_radius: 200,
        }
    }
}

/// Colors as hex strings, parsed by `palette`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub background: String,
    pub curve: String,
    pub inner: String,
    pub outer: String,
}

impl Default for ColorConfig {
    fn default() -> Self {
        ColorConfig {
            background: "#000000".to_owned(),
            curve: "#6EC768".to_owned(),
            inner: "#F28C28".to_owned(),
            outer: "#FF0000".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    /// Parse from hex string like "#FF0000" or "FF0000"
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self { r, g, b })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub background: RgbColor,
    pub curve: RgbColor,
    pub inner: RgbColor,
    pub outer: RgbColor,
}

impl ColorConfig {
    pub fn palette(&self) -> Result<Palette, SpirographError> {
        let parse = |hex: &str| {
            RgbColor::from_hex(hex).ok_or_else(|| SpirographError::Color(hex.to_owned()))
        };

        Ok(Palette {
            background: parse(&self.background)?,
            curve: parse(&self.curve)?,
            inner: parse(&self.inner)?,
            outer: parse(&self.outer)?,
        })
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Config, SpirographError> {
        let text = fs::read_to_string(path).map_err(|source| SpirographError::ReadConfig {
            path: path.to_owned(),
            source,
        })?;

        toml::from_str(&text).map_err(|source| SpirographError::ParseConfig {
            path: path.to_owned(),
            source,
        })
    }

    /// Command line values win over whatever the file said.
    pub fn with_args(mut self, args: &Args) -> Config {
        if let Some(outer) = args.outer_radius {
            self.spirograph.outer_radius = outer;
        }
        if let Some(inner) = args.inner_radius {
            self.spirograph.inner_radius = inner;
        }
        if let Some(fps) = args.fps {
            self.window.fps_limit = fps;
        }
        if args.fullscreen {
            self.window.fullscreen = true;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn empty_file_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.spirograph.outer_radius, 400);
        assert_eq!(config.spirograph.inner_radius, 200);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: Config = toml::from_str(
            r##"
            [spirograph]
            inner_radius = 150

            [window]
            vsync = false

            [colors]
            curve = "#112233"
            "##,
        )
        .unwrap();

        assert_eq!(config.spirograph.inner_radius, 150);
        assert_eq!(config.spirograph.outer_radius, 400);
        assert!(!config.window.vsync);
        assert_eq!(config.window.width, 800);
        assert_eq!(config.colors.curve, "#112233");
        assert_eq!(config.colors.outer, "#FF0000");
    }

    #[test]
    fn default_palette_parses() {
        let palette = ColorConfig::default().palette().unwrap();
        assert_eq!(palette.curve, RgbColor { r: 0x6E, g: 0xC7, b: 0x68 });
        assert_eq!(palette.inner, RgbColor { r: 0xF2, g: 0x8C, b: 0x28 });
        assert_eq!(palette.background, RgbColor { r: 0, g: 0, b: 0 });
    }

    #[test]
    fn bad_color_is_reported() {
        let colors = ColorConfig {
            inner: "#12345".to_owned(),
            ..ColorConfig::default()
        };
        match colors.palette() {
            Err(SpirographError::Color(value)) => assert_eq!(value, "#12345"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(RgbColor::from_hex("GGGGGG").is_none());
        assert_eq!(RgbColor::from_hex("ff0000"), Some(RgbColor { r: 255, g: 0, b: 0 }));
    }

    #[test]
    fn args_override_file_values() {
        let args = Args::parse_from(["spirograph", "--inner-radius", "150", "--fps", "30", "--fullscreen"]);
        let config = Config::default().with_args(&args);

        assert_eq!(config.spirograph.inner_radius, 150);
        assert_eq!(config.spirograph.outer_radius, 400);
        assert_eq!(config.window.fps_limit, 30);
        assert!(config.window.fullscreen);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let result = Config::load(Path::new("/nonexistent/spirograph.toml"));
        assert!(matches!(result, Err(SpirographError::ReadConfig { .. })));
    }
}
