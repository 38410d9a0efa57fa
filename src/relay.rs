// SPDX-License-Identifier: GPL-3.0-only

//! Frame relay context
//!
//! [`FrameRelay`] is the explicit context shared by the capture and render
//! execution contexts: the frame store, the render controls and the filter
//! parameters live here rather than in free-floating globals. The capture
//! thread drives [`FrameRelay::deliver_frame`]; the renderer reads the store
//! and controls through accessors.

use crate::constants::{edge, timing};
use crate::controls::RenderControls;
use crate::convert;
use crate::errors::ConvertError;
use crate::filters;
use crate::store::FrameStore;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// Shared pipeline context for one camera feed
#[derive(Debug)]
pub struct FrameRelay {
    store: FrameStore,
    controls: RenderControls,
    edge_low: u8,
    edge_high: u8,
    frames_delivered: AtomicU64,
}

impl Default for FrameRelay {
    fn default() -> Self {
        Self::with_thresholds(edge::LOW_THRESHOLD, edge::HIGH_THRESHOLD)
    }
}

impl FrameRelay {
    /// Create a relay with the default edge thresholds
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a relay with explicit edge filter thresholds
    pub fn with_thresholds(edge_low: u8, edge_high: u8) -> Self {
        Self {
            store: FrameStore::new(),
            controls: RenderControls::new(),
            edge_low,
            edge_high,
            frames_delivered: AtomicU64::new(0),
        }
    }

    /// The shared frame store
    pub fn store(&self) -> &FrameStore {
        &self.store
    }

    /// The shared render controls
    pub fn controls(&self) -> &RenderControls {
        &self.controls
    }

    /// Number of frames accepted since creation
    pub fn frames_delivered(&self) -> u64 {
        self.frames_delivered.load(Ordering::Relaxed)
    }

    /// Accept one raw NV21 frame from the capture collaborator
    ///
    /// Runs conversion, rotation and both filters, then publishes all three
    /// variants in one atomic store update. A conversion failure skips the
    /// frame; a filter failure falls back to an unfiltered copy of the
    /// converted frame for that variant only.
    pub fn deliver_frame(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        rotation_degrees: u32,
    ) -> Result<(), ConvertError> {
        let rgb = match convert::convert_nv21_to_rgb(data, width, height) {
            Ok(rgb) => rgb,
            Err(e) => {
                warn!(error = %e, width, height, "Frame conversion failed, skipping frame");
                return Err(e);
            }
        };

        let rgb = if rotation_degrees != 0 {
            convert::rotate(&rgb, rotation_degrees)
        } else {
            rgb
        };

        let grayscale = match filters::grayscale(&rgb) {
            Ok(gray) => gray,
            Err(e) => {
                warn!(error = %e, "Grayscale filter failed, storing unfiltered copy");
                rgb.clone()
            }
        };

        let edge = match filters::edges(&rgb, self.edge_low, self.edge_high) {
            Ok(edge) => edge,
            Err(e) => {
                warn!(error = %e, "Edge filter failed, storing unfiltered copy");
                rgb.clone()
            }
        };

        self.store.publish(rgb, grayscale, edge);

        let count = self.frames_delivered.fetch_add(1, Ordering::Relaxed) + 1;
        if count % timing::FRAME_LOG_INTERVAL == 0 {
            debug!(frames = count, width, height, "Frame variants published");
        }
        Ok(())
    }

    /// Release all stored frames; the next fetch returns the fallback
    pub fn teardown(&self) {
        self.store.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{nv21_test_frame, TestPattern};
    use crate::frame::FrameVariant;

    #[test]
    fn test_deliver_frame_publishes_all_variants() {
        let relay = FrameRelay::new();
        let data = nv21_test_frame(TestPattern::SolidGray(128), 32, 16);
        relay.deliver_frame(&data, 32, 16, 0).unwrap();

        for variant in FrameVariant::ALL {
            let frame = relay.store().fetch(variant);
            assert_eq!((frame.width, frame.height), (32, 16));
        }
        assert_eq!(relay.frames_delivered(), 1);
    }

    #[test]
    fn test_deliver_frame_applies_rotation() {
        let relay = FrameRelay::new();
        let data = nv21_test_frame(TestPattern::SolidGray(128), 32, 16);
        relay.deliver_frame(&data, 32, 16, 90).unwrap();

        let frame = relay.store().fetch(FrameVariant::Raw);
        assert_eq!((frame.width, frame.height), (16, 32));
    }

    #[test]
    fn test_deliver_bad_frame_is_skipped() {
        let relay = FrameRelay::new();
        assert!(relay.deliver_frame(&[0; 4], 32, 16, 0).is_err());
        assert!(!relay.store().has_frames());
    }

    #[test]
    fn test_teardown_clears_store() {
        let relay = FrameRelay::new();
        let data = nv21_test_frame(TestPattern::SolidGray(128), 16, 16);
        relay.deliver_frame(&data, 16, 16, 0).unwrap();
        relay.teardown();
        assert!(!relay.store().has_frames());
    }
}
