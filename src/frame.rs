// SPDX-License-Identifier: GPL-3.0-only

//! Pixel buffer data model
//!
//! A [`PixelBuffer`] is a rectangular, row-major image with an explicit
//! channel count and no row padding: `data.len() == width * height * channels`
//! always holds for a constructed buffer, so the bytes are contiguous and
//! ready for GPU upload without a repack step.

use crate::errors::FrameError;
use image::imageops::FilterType;
use image::{GrayImage, ImageBuffer, RgbImage, RgbaImage};

/// One of the three simultaneously maintained derived representations
/// of the latest frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameVariant {
    /// Unfiltered converted camera frame
    Raw,
    /// Grayscale-filtered variant
    Grayscale,
    /// Edge-filtered variant
    Edge,
}

impl FrameVariant {
    /// Get all variants for iteration
    pub const ALL: [FrameVariant; 3] = [
        FrameVariant::Raw,
        FrameVariant::Grayscale,
        FrameVariant::Edge,
    ];

    /// Get display name for the variant
    pub fn display_name(&self) -> &'static str {
        match self {
            FrameVariant::Raw => "Raw",
            FrameVariant::Grayscale => "Grayscale",
            FrameVariant::Edge => "Edge",
        }
    }
}

/// A rectangular, row-major, fixed-channel-count image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Channel count (1 = luma, 3 = RGB, 4 = RGBA)
    pub channels: u8,
    /// Packed pixel data, `width * height * channels` bytes
    pub data: Vec<u8>,
}

impl PixelBuffer {
    /// Create a buffer from raw bytes, validating the declared shape
    pub fn from_raw(
        width: u32,
        height: u32,
        channels: u8,
        data: Vec<u8>,
    ) -> Result<Self, FrameError> {
        if !matches!(channels, 1 | 3 | 4) {
            return Err(FrameError::UnsupportedChannels(channels));
        }
        let expected = width as usize * height as usize * channels as usize;
        if data.len() != expected {
            return Err(FrameError::LengthMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Create a solid-color 3-channel buffer
    pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * 3);
        for _ in 0..(width as usize * height as usize) {
            data.extend_from_slice(&rgb);
        }
        Self {
            width,
            height,
            channels: 3,
            data,
        }
    }

    /// Expected data length for the declared shape
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * self.channels as usize
    }

    /// Whether the buffer holds no pixels
    pub fn is_empty(&self) -> bool {
        self.data.is_empty() || self.width == 0 || self.height == 0
    }

    /// Whether data length matches the declared shape
    pub fn is_consistent(&self) -> bool {
        self.data.len() == self.expected_len()
    }

    /// Normalize to the 4-channel upload format
    ///
    /// Luma is replicated into RGB, 3-channel gets an opaque alpha appended,
    /// 4-channel is returned as a copy. Any other channel count is an error.
    pub fn to_rgba(&self) -> Result<PixelBuffer, FrameError> {
        let pixels = self.width as usize * self.height as usize;
        let data = match self.channels {
            1 => {
                let mut out = Vec::with_capacity(pixels * 4);
                for &y in &self.data {
                    out.extend_from_slice(&[y, y, y, 255]);
                }
                out
            }
            3 => {
                let mut out = Vec::with_capacity(pixels * 4);
                for px in self.data.chunks_exact(3) {
                    out.extend_from_slice(&[px[0], px[1], px[2], 255]);
                }
                out
            }
            4 => self.data.clone(),
            other => return Err(FrameError::UnsupportedChannels(other)),
        };
        Ok(PixelBuffer {
            width: self.width,
            height: self.height,
            channels: 4,
            data,
        })
    }

    /// Area-preserving resample to the given dimensions
    ///
    /// Returns a copy when the dimensions already match.
    pub fn resized(&self, width: u32, height: u32) -> Result<PixelBuffer, FrameError> {
        if self.width == width && self.height == height {
            return Ok(self.clone());
        }
        let data = match self.channels {
            1 => {
                let img: GrayImage = buffer_from(self)?;
                image::imageops::resize(&img, width, height, FilterType::Triangle).into_raw()
            }
            3 => {
                let img: RgbImage = buffer_from(self)?;
                image::imageops::resize(&img, width, height, FilterType::Triangle).into_raw()
            }
            4 => {
                let img: RgbaImage = buffer_from(self)?;
                image::imageops::resize(&img, width, height, FilterType::Triangle).into_raw()
            }
            other => return Err(FrameError::UnsupportedChannels(other)),
        };
        Ok(PixelBuffer {
            width,
            height,
            channels: self.channels,
            data,
        })
    }
}

fn buffer_from<P>(frame: &PixelBuffer) -> Result<ImageBuffer<P, Vec<u8>>, FrameError>
where
    P: image::Pixel<Subpixel = u8>,
{
    ImageBuffer::from_raw(frame.width, frame.height, frame.data.clone()).ok_or(
        FrameError::LengthMismatch {
            expected: frame.expected_len(),
            actual: frame.data.len(),
        },
    )
}
