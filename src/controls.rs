// SPDX-License-Identifier: GPL-3.0-only

//! Render mode and orientation selection
//!
//! One tagged enumeration per axis, shared by the control surface, the
//! capture context and the renderer. Ordinals are an internal storage detail
//! of [`RenderControls`] and never cross a module boundary.

use crate::frame::FrameVariant;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

/// Which variant the draw stage fetches, plus the legacy geometry-fix modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RenderMode {
    /// Unfiltered camera frame
    RawCamera,
    /// Edge-filtered frame (default)
    #[default]
    EdgeDetection,
    /// Grayscale frame
    Grayscale,
    /// Legacy default mode; displays the edge variant
    Default,
    /// Legacy inset-texcoord mode; displays the edge variant
    Inset,
    /// Legacy border-fix mode; displays the edge variant
    BorderFix,
}

impl RenderMode {
    /// Get all modes for iteration
    pub const ALL: [RenderMode; 6] = [
        RenderMode::RawCamera,
        RenderMode::EdgeDetection,
        RenderMode::Grayscale,
        RenderMode::Default,
        RenderMode::Inset,
        RenderMode::BorderFix,
    ];

    /// Get display name for the mode
    pub fn display_name(&self) -> &'static str {
        match self {
            RenderMode::RawCamera => "Raw Camera",
            RenderMode::EdgeDetection => "Edge Detection",
            RenderMode::Grayscale => "Grayscale",
            RenderMode::Default => "Default",
            RenderMode::Inset => "Inset",
            RenderMode::BorderFix => "Border Fix",
        }
    }

    /// The frame variant this mode displays
    ///
    /// Every mode other than RawCamera and Grayscale falls through to the
    /// edge variant.
    pub fn variant(&self) -> FrameVariant {
        match self {
            RenderMode::RawCamera => FrameVariant::Raw,
            RenderMode::Grayscale => FrameVariant::Grayscale,
            _ => FrameVariant::Edge,
        }
    }

    fn ordinal(self) -> u8 {
        match self {
            RenderMode::RawCamera => 0,
            RenderMode::EdgeDetection => 1,
            RenderMode::Grayscale => 2,
            RenderMode::Default => 3,
            RenderMode::Inset => 4,
            RenderMode::BorderFix => 5,
        }
    }

    fn from_ordinal(v: u8) -> Self {
        match v {
            0 => RenderMode::RawCamera,
            1 => RenderMode::EdgeDetection,
            2 => RenderMode::Grayscale,
            3 => RenderMode::Default,
            4 => RenderMode::Inset,
            _ => RenderMode::BorderFix,
        }
    }
}

impl FromStr for RenderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['_', ' '], "-").as_str() {
            "raw" | "raw-camera" => Ok(RenderMode::RawCamera),
            "edge" | "edge-detection" => Ok(RenderMode::EdgeDetection),
            "grayscale" | "gray" => Ok(RenderMode::Grayscale),
            "default" => Ok(RenderMode::Default),
            "inset" => Ok(RenderMode::Inset),
            "border-fix" => Ok(RenderMode::BorderFix),
            other => Err(format!("Unknown render mode: {}", other)),
        }
    }
}

/// Vertex-to-texcoord mapping correcting sensor-vs-display rotation mismatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Orientation {
    /// Identity mapping
    Normal,
    /// Vertical texcoord flip (default; the most common sensor fix)
    #[default]
    FlippedVertical,
    /// Texcoord corners cycled one step clockwise
    Rotated90,
    /// Both axes flipped
    Rotated180,
    /// Texcoord corners cycled one step counter-clockwise
    Rotated270,
}

impl Orientation {
    /// Get all orientations for iteration
    pub const ALL: [Orientation; 5] = [
        Orientation::Normal,
        Orientation::FlippedVertical,
        Orientation::Rotated90,
        Orientation::Rotated180,
        Orientation::Rotated270,
    ];

    /// Get display name for the orientation
    pub fn display_name(&self) -> &'static str {
        match self {
            Orientation::Normal => "Normal",
            Orientation::FlippedVertical => "Flipped Vertical",
            Orientation::Rotated90 => "Rotated 90",
            Orientation::Rotated180 => "Rotated 180",
            Orientation::Rotated270 => "Rotated 270",
        }
    }

    /// Next orientation in cycle order, for quick toggling
    pub fn cycled(&self) -> Orientation {
        let next = (self.ordinal() + 1) % Orientation::ALL.len() as u8;
        Orientation::from_ordinal(next)
    }

    fn ordinal(self) -> u8 {
        match self {
            Orientation::Normal => 0,
            Orientation::FlippedVertical => 1,
            Orientation::Rotated90 => 2,
            Orientation::Rotated180 => 3,
            Orientation::Rotated270 => 4,
        }
    }

    fn from_ordinal(v: u8) -> Self {
        match v {
            0 => Orientation::Normal,
            1 => Orientation::FlippedVertical,
            2 => Orientation::Rotated90,
            3 => Orientation::Rotated180,
            _ => Orientation::Rotated270,
        }
    }
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['_', ' '], "-").as_str() {
            "normal" => Ok(Orientation::Normal),
            "flipped" | "flipped-vertical" => Ok(Orientation::FlippedVertical),
            "90" | "rotated-90" => Ok(Orientation::Rotated90),
            "180" | "rotated-180" => Ok(Orientation::Rotated180),
            "270" | "rotated-270" => Ok(Orientation::Rotated270),
            other => Err(format!("Unknown orientation: {}", other)),
        }
    }
}

/// Shared mode and orientation state, readable once per render pass
///
/// Writes are fire-and-forget from any thread; last write wins and a single
/// frame of staleness is acceptable.
#[derive(Debug)]
pub struct RenderControls {
    mode: AtomicU8,
    orientation: AtomicU8,
}

impl Default for RenderControls {
    fn default() -> Self {
        Self {
            mode: AtomicU8::new(RenderMode::default().ordinal()),
            orientation: AtomicU8::new(Orientation::default().ordinal()),
        }
    }
}

impl RenderControls {
    /// Create controls with the default mode and orientation
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the render mode; takes effect on the next render pass
    pub fn set_mode(&self, mode: RenderMode) {
        self.mode.store(mode.ordinal(), Ordering::Relaxed);
    }

    /// Current render mode
    pub fn mode(&self) -> RenderMode {
        RenderMode::from_ordinal(self.mode.load(Ordering::Relaxed))
    }

    /// Set the orientation; takes effect on the next render pass
    pub fn set_orientation(&self, orientation: Orientation) {
        self.orientation.store(orientation.ordinal(), Ordering::Relaxed);
    }

    /// Current orientation
    pub fn orientation(&self) -> Orientation {
        Orientation::from_ordinal(self.orientation.load(Ordering::Relaxed))
    }
}
