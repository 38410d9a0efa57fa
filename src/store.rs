// SPDX-License-Identifier: GPL-3.0-only

//! Shared frame store
//!
//! Holds the latest instance of each frame variant behind a single mutex.
//! `publish` replaces all three entries as one lock-protected step, so a
//! reader observes either no entry for a variant or a fully-formed buffer,
//! never a mix of old and new variants from the same publish.
//!
//! The lock is held only for the duration of a buffer copy, never across a
//! GPU call or a filter computation.

use crate::constants::fallback;
use crate::frame::{FrameVariant, PixelBuffer};
use std::sync::{Mutex, OnceLock, PoisonError};
use tracing::debug;

/// Fallback frame instance (lazily initialized)
static FALLBACK_FRAME: OnceLock<PixelBuffer> = OnceLock::new();

/// The placeholder frame returned when a variant has never been published
/// or was released.
pub fn fallback_frame() -> &'static PixelBuffer {
    FALLBACK_FRAME.get_or_init(|| {
        debug!(
            width = fallback::WIDTH,
            height = fallback::HEIGHT,
            "Created fallback frame"
        );
        PixelBuffer::solid(fallback::WIDTH, fallback::HEIGHT, fallback::FILL_RGB)
    })
}

#[derive(Debug, Default)]
struct StoredVariants {
    raw: Option<PixelBuffer>,
    grayscale: Option<PixelBuffer>,
    edge: Option<PixelBuffer>,
}

/// Mutex-guarded store of the three current frame variants
#[derive(Debug, Default)]
pub struct FrameStore {
    inner: Mutex<StoredVariants>,
}

impl FrameStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all three stored variants in one lock acquisition
    ///
    /// This is the only write path; across one publish no reader can observe
    /// a mix of old and new variants.
    pub fn publish(&self, raw: PixelBuffer, grayscale: PixelBuffer, edge: PixelBuffer) {
        let mut guard = self.lock();
        guard.raw = Some(raw);
        guard.grayscale = Some(grayscale);
        guard.edge = Some(edge);
    }

    /// Copy out the requested variant, or the fallback frame if absent
    ///
    /// Never blocks beyond lock hold time and never panics.
    pub fn fetch(&self, variant: FrameVariant) -> PixelBuffer {
        let guard = self.lock();
        let stored = match variant {
            FrameVariant::Raw => guard.raw.as_ref(),
            FrameVariant::Grayscale => guard.grayscale.as_ref(),
            FrameVariant::Edge => guard.edge.as_ref(),
        };
        match stored {
            Some(frame) if !frame.is_empty() => frame.clone(),
            _ => fallback_frame().clone(),
        }
    }

    /// Discard all stored variants; idempotent
    pub fn release(&self) {
        let mut guard = self.lock();
        guard.raw = None;
        guard.grayscale = None;
        guard.edge = None;
        debug!("Frame store released");
    }

    /// Whether any variant has been published since the last release
    pub fn has_frames(&self) -> bool {
        let guard = self.lock();
        guard.raw.is_some() || guard.grayscale.is_some() || guard.edge.is_some()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoredVariants> {
        // A poisoned lock only means a publisher panicked mid-copy; the
        // stored buffers are still whole values, so recover the guard.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_fresh_store_returns_fallback() {
        let store = FrameStore::new();
        for variant in FrameVariant::ALL {
            let frame = store.fetch(variant);
            assert_eq!((frame.width, frame.height), (fallback::WIDTH, fallback::HEIGHT));
            assert_eq!(&frame.data[..3], &fallback::FILL_RGB);
        }
    }

    #[test]
    fn test_publish_fetch_round_trip() {
        let store = FrameStore::new();
        let raw = PixelBuffer::solid(4, 4, [1, 1, 1]);
        let gray = PixelBuffer::solid(4, 4, [2, 2, 2]);
        let edge = PixelBuffer::solid(4, 4, [3, 3, 3]);
        store.publish(raw.clone(), gray.clone(), edge.clone());

        assert_eq!(store.fetch(FrameVariant::Raw), raw);
        assert_eq!(store.fetch(FrameVariant::Grayscale), gray);
        assert_eq!(store.fetch(FrameVariant::Edge), edge);
    }

    #[test]
    fn test_second_publish_supersedes_first() {
        let store = FrameStore::new();
        store.publish(
            PixelBuffer::solid(4, 4, [1, 1, 1]),
            PixelBuffer::solid(4, 4, [1, 1, 1]),
            PixelBuffer::solid(4, 4, [1, 1, 1]),
        );
        let second = PixelBuffer::solid(8, 8, [9, 9, 9]);
        store.publish(second.clone(), second.clone(), second.clone());

        for variant in FrameVariant::ALL {
            assert_eq!(store.fetch(variant), second);
        }
    }

    #[test]
    fn test_release_then_fetch_returns_fallback() {
        let store = FrameStore::new();
        store.publish(
            PixelBuffer::solid(4, 4, [7, 7, 7]),
            PixelBuffer::solid(4, 4, [7, 7, 7]),
            PixelBuffer::solid(4, 4, [7, 7, 7]),
        );
        store.release();

        let frame = store.fetch(FrameVariant::Raw);
        assert_eq!((frame.width, frame.height), (fallback::WIDTH, fallback::HEIGHT));
        assert!(!store.has_frames());
    }

    #[test]
    fn test_release_is_idempotent() {
        let store = FrameStore::new();
        store.release();
        store.release();
        assert!(!store.has_frames());
    }

    #[test]
    fn test_fetch_does_not_consume() {
        let store = FrameStore::new();
        let raw = PixelBuffer::solid(2, 2, [5, 5, 5]);
        store.publish(raw.clone(), raw.clone(), raw.clone());
        let _ = store.fetch(FrameVariant::Raw);
        assert_eq!(store.fetch(FrameVariant::Raw), raw);
    }
}
