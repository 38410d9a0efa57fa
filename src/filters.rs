// SPDX-License-Identifier: GPL-3.0-only

//! Filter bank: pure per-frame transforms
//!
//! Both filters take a 3-channel buffer and return a new 3-channel buffer of
//! the same dimensions, so every stored variant shares the upload format.
//! Neither mutates its input. The relay maps an `Err` from either filter to
//! an unfiltered copy of the input.

use crate::errors::FilterError;
use crate::frame::PixelBuffer;

/// BT.601 luma from a 3-channel buffer, fixed point
fn luma_plane(frame: &PixelBuffer) -> Result<Vec<u8>, FilterError> {
    if frame.channels != 3 {
        return Err(FilterError::UnsupportedChannels(frame.channels));
    }
    if frame.is_empty() {
        return Err(FilterError::EmptyInput);
    }
    Ok(frame
        .data
        .chunks_exact(3)
        .map(|px| {
            let y = 77 * px[0] as u32 + 150 * px[1] as u32 + 29 * px[2] as u32;
            (y >> 8) as u8
        })
        .collect())
}

/// Re-expand a luma plane to 3 channels
fn expand_luma(width: u32, height: u32, luma: Vec<u8>) -> PixelBuffer {
    let mut data = Vec::with_capacity(luma.len() * 3);
    for y in luma {
        data.extend_from_slice(&[y, y, y]);
    }
    PixelBuffer {
        width,
        height,
        channels: 3,
        data,
    }
}

/// Grayscale filter: 3-channel to luma, re-expanded to 3 channels
pub fn grayscale(frame: &PixelBuffer) -> Result<PixelBuffer, FilterError> {
    let luma = luma_plane(frame)?;
    Ok(expand_luma(frame.width, frame.height, luma))
}

/// Edge filter: luma, Sobel gradient magnitude, double threshold,
/// re-expanded to 3 channels.
///
/// Pixels at or above `high` are edges. Pixels between `low` and `high` are
/// kept only when an 8-neighbor is a strong edge. A flat field produces an
/// all-zero output.
pub fn edges(frame: &PixelBuffer, low: u8, high: u8) -> Result<PixelBuffer, FilterError> {
    let luma = luma_plane(frame)?;
    let w = frame.width as usize;
    let h = frame.height as usize;

    // Gradient magnitude, borders left at zero
    let mut mag = vec![0u16; w * h];
    if w >= 3 && h >= 3 {
        for y in 1..h - 1 {
            for x in 1..w - 1 {
                let p = |dx: isize, dy: isize| {
                    luma[(y as isize + dy) as usize * w + (x as isize + dx) as usize] as i32
                };
                let gx = -p(-1, -1) - 2 * p(-1, 0) - p(-1, 1)
                    + p(1, -1)
                    + 2 * p(1, 0)
                    + p(1, 1);
                let gy = -p(-1, -1) - 2 * p(0, -1) - p(1, -1)
                    + p(-1, 1)
                    + 2 * p(0, 1)
                    + p(1, 1);
                mag[y * w + x] = (gx.abs() + gy.abs()).min(u16::MAX as i32) as u16;
            }
        }
    }

    let low = low as u16;
    let high = high as u16;
    let mut out = vec![0u8; w * h];
    for y in 0..h {
        for x in 0..w {
            let m = mag[y * w + x];
            if m >= high {
                out[y * w + x] = 255;
            } else if m >= low {
                // Weak edge: keep only next to a strong one
                let strong_neighbor = neighbors(x, y, w, h)
                    .into_iter()
                    .flatten()
                    .any(|(nx, ny)| mag[ny * w + nx] >= high);
                if strong_neighbor {
                    out[y * w + x] = 255;
                }
            }
        }
    }

    Ok(expand_luma(frame.width, frame.height, out))
}

fn neighbors(x: usize, y: usize, w: usize, h: usize) -> [Option<(usize, usize)>; 8] {
    let mut out = [None; 8];
    let mut i = 0;
    for dy in -1isize..=1 {
        for dx in -1isize..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let nx = x as isize + dx;
            let ny = y as isize + dy;
            if nx >= 0 && ny >= 0 && (nx as usize) < w && (ny as usize) < h {
                out[i] = Some((nx as usize, ny as usize));
            }
            i += 1;
        }
    }
    out
}
