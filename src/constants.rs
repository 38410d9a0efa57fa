// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

/// Upload texture constants
///
/// The preview texture is allocated once at initialization and never
/// reallocated; every fetched frame is resampled to this size before upload.
pub mod texture {
    /// Fixed upload texture width
    pub const UPLOAD_WIDTH: u32 = 1024;

    /// Fixed upload texture height
    pub const UPLOAD_HEIGHT: u32 = 512;

    /// Bytes per uploaded pixel (RGBA8)
    pub const BYTES_PER_PIXEL: u32 = 4;

    /// Background clear color for aborted or empty passes (RGBA, 0.0-1.0)
    pub const BACKGROUND: [f64; 4] = [0.0, 0.0, 0.0, 1.0];
}

/// Fallback frame constants
///
/// Returned by the store when a variant has never been published or was
/// released. Solid blue so a misbehaving capture path is obvious on screen.
pub mod fallback {
    /// Fallback frame width
    pub const WIDTH: u32 = 640;

    /// Fallback frame height
    pub const HEIGHT: u32 = 480;

    /// Fallback fill color (RGB)
    pub const FILL_RGB: [u8; 3] = [0, 0, 255];
}

/// Edge filter constants
pub mod edge {
    /// Default lower gradient-magnitude threshold
    pub const LOW_THRESHOLD: u8 = 100;

    /// Default upper gradient-magnitude threshold
    pub const HIGH_THRESHOLD: u8 = 200;
}

/// Capture defaults for the synthetic frame source
pub mod capture {
    /// Default capture frame width
    pub const DEFAULT_WIDTH: u32 = 640;

    /// Default capture frame height
    pub const DEFAULT_HEIGHT: u32 = 480;
}

/// Timing constants
pub mod timing {
    use std::time::Duration;

    /// Frame counter modulo for periodic logging
    pub const FRAME_LOG_INTERVAL: u64 = 30;

    /// Default delivery interval for the synthetic capture loop (~30fps)
    pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(33);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_texture_dimensions_nonzero() {
        assert!(texture::UPLOAD_WIDTH > 0);
        assert!(texture::UPLOAD_HEIGHT > 0);
    }

    #[test]
    fn test_edge_thresholds_ordered() {
        assert!(edge::LOW_THRESHOLD < edge::HIGH_THRESHOLD);
    }
}
