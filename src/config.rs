// SPDX-License-Identifier: GPL-3.0-only

use crate::constants::{capture, edge};
use crate::controls::{Orientation, RenderMode};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write as _;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Persisted pipeline settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Render mode selected at startup
    pub render_mode: RenderMode,
    /// Quad orientation selected at startup
    pub orientation: Orientation,
    /// Edge filter low threshold (weak edge cutoff)
    pub edge_low: u8,
    /// Edge filter high threshold (strong edge cutoff)
    pub edge_high: u8,
    /// Capture frame width
    pub frame_width: u32,
    /// Capture frame height
    pub frame_height: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            render_mode: RenderMode::default(),
            orientation: Orientation::default(),
            edge_low: edge::LOW_THRESHOLD,
            edge_high: edge::HIGH_THRESHOLD,
            frame_width: capture::DEFAULT_WIDTH,
            frame_height: capture::DEFAULT_HEIGHT,
        }
    }
}

impl Config {
    /// Load the configuration file, falling back to defaults
    ///
    /// A missing or unreadable file is not an error; the defaults are used
    /// and the reason is logged.
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            warn!("No config directory available, using default configuration");
            return Self::default();
        };

        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    debug!(path = %path.display(), "Configuration loaded");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Malformed configuration, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                debug!(path = %path.display(), error = %e, "No configuration file, using defaults");
                Self::default()
            }
        }
    }

    /// Write the configuration file, creating parent directories as needed
    pub fn save(&self) -> std::io::Result<()> {
        let Some(path) = Self::path() else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no config directory available",
            ));
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        let mut file = fs::File::create(&path)?;
        file.write_all(json.as_bytes())?;
        debug!(path = %path.display(), "Configuration saved");
        Ok(())
    }

    fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("edgecam").join("config.json"))
    }
}
