// SPDX-License-Identifier: GPL-3.0-only

//! edgecam - real-time camera frame relay and preview core
//!
//! This library carries camera frames from a raw NV21 capture buffer to a
//! rendered preview quad:
//!
//! - [`convert`] unpacks NV21 into packed RGB and applies rotation
//! - [`filters`] derives the grayscale and edge-detected variants
//! - [`store`] holds the latest variants behind a mutex for the renderer
//! - [`controls`] selects the render mode and quad orientation
//! - [`render`] uploads the selected variant and draws the oriented quad
//!
//! [`relay::FrameRelay`] ties the pieces together for one camera feed; the
//! [`capture`] module provides a synthetic frame source for demos and tests.

pub mod capture;
pub mod config;
pub mod constants;
pub mod controls;
pub mod convert;
pub mod errors;
pub mod filters;
pub mod frame;
pub mod relay;
pub mod render;
pub mod store;

pub use capture::{CaptureLoop, TestPattern};
pub use config::Config;
pub use controls::{Orientation, RenderControls, RenderMode};
pub use errors::{RelayError, RelayResult};
pub use frame::{FrameVariant, PixelBuffer};
pub use relay::FrameRelay;
pub use render::Preview;
pub use store::FrameStore;
