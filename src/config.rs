//! # Configuration
//!
//! Card options plus the adapter settings (track geometry, MQTT broker),
//! read from a TOML file at start-up. The file is only ever read.
//!
//! ```toml
//! [card]
//! top_channel = "home/covers/living_top"
//! bottom_channel = "home/covers/living_bottom"
//! title = "Living room"
//! deferred_mode = true
//! show_stop = true
//!
//! [track]
//! height = 300.0
//!
//! [mqtt]
//! host = "192.168.1.10"
//! ```
//!
//! Option names follow the card; the dashboard card key names
//! (`top_cover`, `bottom_cover`, `name`, `width`, `show_background`) are
//! accepted as aliases. Toggles may be written as `true`/`false`, `"true"`,
//! `"false"`, `0` or `1`, as dashboard YAML tends to mix them.

use crate::channel::PerChannel;
use crate::error::CoverError;
use crate::geometry::TrackGeometry;
use crate::mqtt::config::MqttSettings;
use color_eyre::eyre::{eyre, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const CONFIG_DIR: &str = "dualcover";
const CONFIG_FILE: &str = "config.toml";

pub const DEFAULT_TITLE: &str = "Dual Cover";
pub const DEFAULT_TOP_LABEL: &str = "Top";
pub const DEFAULT_BOTTOM_LABEL: &str = "Bottom";
pub const DEFAULT_SLIDER_WIDTH: u32 = 56;

/// Options of one dual cover card.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct CardConfig {
    /// Entity driven by the upper handle
    #[serde(alias = "top_cover")]
    pub top_channel: String,
    /// Entity driven by the lower handle
    #[serde(alias = "bottom_cover")]
    pub bottom_channel: String,
    #[serde(alias = "name")]
    pub title: String,
    #[serde(deserialize_with = "lenient::flag")]
    pub show_title: bool,
    /// Card frame background; the slider has its own toggle
    #[serde(alias = "show_background", deserialize_with = "lenient::flag")]
    pub show_card_background: bool,
    #[serde(deserialize_with = "lenient::flag")]
    pub show_slider_background: bool,
    #[serde(alias = "width", deserialize_with = "lenient::width")]
    pub slider_width_px: u32,
    pub top_label: String,
    pub bottom_label: String,
    /// Percentage read-out below the slider
    #[serde(deserialize_with = "lenient::flag")]
    pub show_info: bool,
    /// Stage drag results until "Set" is pressed
    #[serde(deserialize_with = "lenient::flag")]
    pub deferred_mode: bool,
    #[serde(deserialize_with = "lenient::flag")]
    pub show_stop: bool,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            top_channel: String::new(),
            bottom_channel: String::new(),
            title: DEFAULT_TITLE.to_string(),
            show_title: true,
            show_card_background: true,
            show_slider_background: true,
            slider_width_px: DEFAULT_SLIDER_WIDTH,
            top_label: DEFAULT_TOP_LABEL.to_string(),
            bottom_label: DEFAULT_BOTTOM_LABEL.to_string(),
            show_info: true,
            deferred_mode: true,
            show_stop: false,
        }
    }
}

impl CardConfig {
    /// Both channels must name an entity.
    pub fn validate(&self) -> Result<(), CoverError> {
        let missing: Vec<&str> = [
            ("top_channel", &self.top_channel),
            ("bottom_channel", &self.bottom_channel),
        ]
        .into_iter()
        .filter(|(_, entity)| entity.trim().is_empty())
        .map(|(key, _)| key)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(CoverError::ConfigError(format!(
                "Please define {}",
                missing.join(" and ")
            )))
        }
    }

    pub fn entities(&self) -> PerChannel<String> {
        PerChannel::new(
            self.top_channel.trim().to_string(),
            self.bottom_channel.trim().to_string(),
        )
    }

    pub fn display_title(&self) -> &str {
        non_empty_or(&self.title, DEFAULT_TITLE)
    }

    pub fn display_top_label(&self) -> &str {
        non_empty_or(&self.top_label, DEFAULT_TOP_LABEL)
    }

    pub fn display_bottom_label(&self) -> &str {
        non_empty_or(&self.bottom_label, DEFAULT_BOTTOM_LABEL)
    }
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

/// Everything the binary reads from its config file.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub card: CardConfig,
    pub track: TrackGeometry,
    pub mqtt: MqttSettings,
}

impl AppConfig {
    /// `$CONFIG_DIR/dualcover/config.toml`, falling back to the working directory.
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| {
            warn!("Could not determine config directory, using current directory");
            PathBuf::from(".")
        });
        path.push(CONFIG_DIR);
        path.push(CONFIG_FILE);
        path
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| eyre!("Failed to parse config: {}", e))
    }

    /// Reads the config file; a missing file yields the defaults.
    pub async fn load(path: &Path) -> Result<Self> {
        if !tokio::fs::try_exists(path)
            .await
            .map_err(|e| eyre!("Failed to check if config file exists: {}", e))?
        {
            warn!(
                "Config file {} does not exist, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;
        let config = Self::from_toml(&content)?;
        info!("Loaded config from {}", path.display());
        debug!("{:?}", config.card);
        Ok(config)
    }
}

/// Deserializers accepting the loosely typed values dashboard configs contain.
mod lenient {
    use super::DEFAULT_SLIDER_WIDTH;
    use serde::de::{self, Deserializer, Unexpected, Visitor};
    use std::fmt;

    struct FlagVisitor;

    impl Visitor<'_> for FlagVisitor {
        type Value = bool;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "a boolean, \"true\"/\"false\" or 0/1")
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<bool, E> {
            Ok(v != 0)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<bool, E> {
            Ok(v != 0)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<bool, E> {
            match v.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Ok(true),
                "false" | "0" | "no" | "off" => Ok(false),
                _ => Err(E::invalid_value(Unexpected::Str(v), &self)),
            }
        }
    }

    pub fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        deserializer.deserialize_any(FlagVisitor)
    }

    struct WidthVisitor;

    impl Visitor<'_> for WidthVisitor {
        type Value = u32;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "a pixel width")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<u32, E> {
            Ok(u32::try_from(v).ok().filter(|w| *w > 0).unwrap_or(DEFAULT_SLIDER_WIDTH))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<u32, E> {
            self.visit_i64(i64::try_from(v).unwrap_or(-1))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<u32, E> {
            self.visit_i64(v.trunc() as i64)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<u32, E> {
            // leading digits only, "72px" reads as 72
            let digits: String = v.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
            self.visit_i64(digits.parse::<i64>().unwrap_or(0))
        }
    }

    pub fn width<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        deserializer.deserialize_any(WidthVisitor)
    }
}
