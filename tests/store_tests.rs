// SPDX-License-Identifier: GPL-3.0-only

//! Concurrency tests for the shared frame store

use edgecam::{FrameStore, FrameVariant, PixelBuffer};
use std::sync::Arc;
use std::thread;

#[test]
fn test_fetch_never_observes_torn_buffers() {
    let store = Arc::new(FrameStore::new());
    let writer_store = store.clone();

    // The writer alternates between two frame geometries; a torn read would
    // surface as a fetched buffer whose length disagrees with its header.
    let writer = thread::spawn(move || {
        for i in 0..200u32 {
            let (w, h) = if i % 2 == 0 { (32, 16) } else { (8, 8) };
            let value = (i % 256) as u8;
            writer_store.publish(
                PixelBuffer::solid(w, h, [value, value, value]),
                PixelBuffer::solid(w, h, [value, value, value]),
                PixelBuffer::solid(w, h, [value, value, value]),
            );
        }
    });

    let mut readers = Vec::new();
    for _ in 0..4 {
        let reader_store = store.clone();
        readers.push(thread::spawn(move || {
            for _ in 0..200 {
                for variant in FrameVariant::ALL {
                    let frame = reader_store.fetch(variant);
                    assert!(frame.is_consistent(), "torn buffer for {:?}", variant);
                }
            }
        }));
    }

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
}

#[test]
fn test_release_during_fetch_yields_fallback() {
    let store = Arc::new(FrameStore::new());
    store.publish(
        PixelBuffer::solid(16, 16, [1, 2, 3]),
        PixelBuffer::solid(16, 16, [4, 4, 4]),
        PixelBuffer::solid(16, 16, [0, 0, 0]),
    );

    let releaser_store = store.clone();
    let releaser = thread::spawn(move || {
        releaser_store.release();
    });

    // Whichever side wins, the fetch returns a complete frame: either the
    // published one or the fallback.
    let frame = store.fetch(FrameVariant::Raw);
    assert!(frame.is_consistent());
    assert!(!frame.is_empty());

    releaser.join().unwrap();
    let after = store.fetch(FrameVariant::Raw);
    assert_eq!((after.width, after.height), (640, 480));
    assert_eq!(&after.data[..3], &[0, 0, 255]);
}

#[test]
fn test_publish_replaces_all_variants_together() {
    let store = FrameStore::new();
    store.publish(
        PixelBuffer::solid(16, 16, [10, 10, 10]),
        PixelBuffer::solid(16, 16, [10, 10, 10]),
        PixelBuffer::solid(16, 16, [10, 10, 10]),
    );
    store.publish(
        PixelBuffer::solid(8, 8, [20, 20, 20]),
        PixelBuffer::solid(8, 8, [20, 20, 20]),
        PixelBuffer::solid(8, 8, [20, 20, 20]),
    );

    for variant in FrameVariant::ALL {
        let frame = store.fetch(variant);
        assert_eq!((frame.width, frame.height), (8, 8), "{:?}", variant);
        assert_eq!(frame.data[0], 20);
    }
}
