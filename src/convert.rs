// SPDX-License-Identifier: GPL-3.0-only

//! NV21 to RGB conversion and whole-buffer rotation
//!
//! The capture collaborator delivers packed NV21: a full-resolution luma
//! plane followed by a half-resolution interleaved V/U chroma plane. The
//! converter produces a 3-channel [`PixelBuffer`] using fixed-point math,
//! processing pixel pairs so each chroma sample is read once.

use crate::errors::ConvertError;
use crate::frame::PixelBuffer;
use tracing::{debug, error};

/// Convert a packed NV21 buffer of the declared geometry into a 3-channel
/// RGB buffer of the same dimensions.
pub fn convert_nv21_to_rgb(
    data: &[u8],
    width: u32,
    height: u32,
) -> Result<PixelBuffer, ConvertError> {
    if width == 0 || height == 0 {
        return Err(ConvertError::ZeroDimensions { width, height });
    }
    if width % 2 != 0 || height % 2 != 0 {
        return Err(ConvertError::OddDimensions { width, height });
    }

    let w = width as usize;
    let h = height as usize;
    let y_size = w * h;
    let expected = y_size + y_size / 2;
    if data.len() < expected {
        return Err(ConvertError::ShortBuffer {
            expected,
            actual: data.len(),
        });
    }

    let y_plane = &data[..y_size];
    let vu_plane = &data[y_size..expected];

    let mut rgb = vec![0u8; w * h * 3];
    for row in 0..h {
        let y_row = &y_plane[row * w..(row + 1) * w];
        let vu_row = &vu_plane[(row / 2) * w..(row / 2) * w + w];
        let out_row = &mut rgb[row * w * 3..(row + 1) * w * 3];

        for x in (0..w).step_by(2) {
            // NV21 interleaves V before U
            let v = vu_row[x] as i32 - 128;
            let u = vu_row[x + 1] as i32 - 128;

            let r_v = (179 * v) >> 7;
            let g_u = (44 * u) >> 7;
            let g_v = (91 * v) >> 7;
            let b_u = (227 * u) >> 7;

            for dx in 0..2 {
                let y = ((y_row[x + dx] as i32 - 16) * 149) >> 7;
                let out = &mut out_row[(x + dx) * 3..(x + dx) * 3 + 3];
                out[0] = (y + r_v).clamp(0, 255) as u8;
                out[1] = (y - g_u - g_v).clamp(0, 255) as u8;
                out[2] = (y + b_u).clamp(0, 255) as u8;
            }
        }
    }

    debug!(width, height, "NV21 converted to RGB");
    Ok(PixelBuffer {
        width,
        height,
        channels: 3,
        data: rgb,
    })
}

/// Apply a clockwise whole-buffer rotation
///
/// Width and height swap for 90 and 270 degrees. An unsupported angle falls
/// back to an unrotated copy with a diagnostic.
pub fn rotate(frame: &PixelBuffer, degrees: u32) -> PixelBuffer {
    match degrees {
        0 => frame.clone(),
        90 => rotate_90(frame),
        180 => rotate_180(frame),
        270 => rotate_270(frame),
        other => {
            error!(rotation = other, "Unsupported rotation angle, using original frame");
            frame.clone()
        }
    }
}

fn rotate_90(frame: &PixelBuffer) -> PixelBuffer {
    let (w, h, c) = (
        frame.width as usize,
        frame.height as usize,
        frame.channels as usize,
    );
    let mut out = vec![0u8; frame.data.len()];
    // Source (x, y) lands at (h - 1 - y, x) in an h-wide output
    for y in 0..h {
        for x in 0..w {
            let src = (y * w + x) * c;
            let dst = (x * h + (h - 1 - y)) * c;
            out[dst..dst + c].copy_from_slice(&frame.data[src..src + c]);
        }
    }
    PixelBuffer {
        width: frame.height,
        height: frame.width,
        channels: frame.channels,
        data: out,
    }
}

fn rotate_180(frame: &PixelBuffer) -> PixelBuffer {
    let c = frame.channels as usize;
    let mut out = Vec::with_capacity(frame.data.len());
    for px in frame.data.chunks_exact(c).rev() {
        out.extend_from_slice(px);
    }
    PixelBuffer {
        width: frame.width,
        height: frame.height,
        channels: frame.channels,
        data: out,
    }
}

fn rotate_270(frame: &PixelBuffer) -> PixelBuffer {
    let (w, h, c) = (
        frame.width as usize,
        frame.height as usize,
        frame.channels as usize,
    );
    let mut out = vec![0u8; frame.data.len()];
    // Source (x, y) lands at (y, w - 1 - x) in an h-wide output
    for y in 0..h {
        for x in 0..w {
            let src = (y * w + x) * c;
            let dst = ((w - 1 - x) * h + y) * c;
            out[dst..dst + c].copy_from_slice(&frame.data[src..src + c]);
        }
    }
    PixelBuffer {
        width: frame.height,
        height: frame.width,
        channels: frame.channels,
        data: out,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{nv21_test_frame, TestPattern};

    #[test]
    fn test_conversion_dimensions() {
        let data = nv21_test_frame(TestPattern::SolidGray(128), 16, 8);
        let rgb = convert_nv21_to_rgb(&data, 16, 8).unwrap();
        assert_eq!((rgb.width, rgb.height, rgb.channels), (16, 8, 3));
        assert!(rgb.is_consistent());
    }

    #[test]
    fn test_neutral_chroma_yields_gray() {
        let data = nv21_test_frame(TestPattern::SolidGray(128), 8, 8);
        let rgb = convert_nv21_to_rgb(&data, 8, 8).unwrap();
        // Y=128 with neutral chroma: ((128 - 16) * 149) >> 7 = 130
        for px in rgb.data.chunks_exact(3) {
            assert_eq!(px, &[130, 130, 130]);
        }
    }

    #[test]
    fn test_rejects_zero_dimensions() {
        assert_eq!(
            convert_nv21_to_rgb(&[], 0, 8),
            Err(ConvertError::ZeroDimensions { width: 0, height: 8 })
        );
    }

    #[test]
    fn test_rejects_odd_dimensions() {
        assert_eq!(
            convert_nv21_to_rgb(&[0; 100], 5, 4),
            Err(ConvertError::OddDimensions { width: 5, height: 4 })
        );
    }

    #[test]
    fn test_rejects_short_buffer() {
        let err = convert_nv21_to_rgb(&[0; 10], 8, 8).unwrap_err();
        assert_eq!(
            err,
            ConvertError::ShortBuffer {
                expected: 96,
                actual: 10
            }
        );
    }

    #[test]
    fn test_rotation_90_swaps_dimensions() {
        let frame = PixelBuffer::solid(6, 4, [1, 2, 3]);
        let rotated = rotate(&frame, 90);
        assert_eq!((rotated.width, rotated.height), (4, 6));
        assert!(rotated.is_consistent());
    }

    #[test]
    fn test_rotation_90_moves_corner() {
        // 2x2 luma frame with distinct corners
        let frame = PixelBuffer::from_raw(2, 2, 1, vec![1, 2, 3, 4]).unwrap();
        let rotated = rotate(&frame, 90);
        // Top-left moves to top-right under clockwise rotation
        assert_eq!(rotated.data, vec![3, 1, 4, 2]);
    }

    #[test]
    fn test_rotation_180_reverses_pixels() {
        let frame = PixelBuffer::from_raw(2, 2, 1, vec![1, 2, 3, 4]).unwrap();
        assert_eq!(rotate(&frame, 180).data, vec![4, 3, 2, 1]);
    }

    #[test]
    fn test_rotation_270_is_inverse_of_90() {
        let frame = PixelBuffer::from_raw(2, 2, 1, vec![1, 2, 3, 4]).unwrap();
        let back = rotate(&rotate(&frame, 90), 270);
        assert_eq!(back, frame);
    }

    #[test]
    fn test_unsupported_rotation_falls_back() {
        let frame = PixelBuffer::solid(4, 4, [9, 9, 9]);
        assert_eq!(rotate(&frame, 45), frame);
    }
}
