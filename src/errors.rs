// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the frame relay and preview renderer
//!
//! Every stage returns an explicit `Result`; failures are contained at the
//! frame or pass boundary and never cross a thread boundary as a panic.

use std::fmt;

/// Result type alias using RelayError
pub type RelayResult<T> = Result<T, RelayError>;

/// Top-level error type covering all relay stages
#[derive(Debug, Clone)]
pub enum RelayError {
    /// Color/format conversion errors
    Convert(ConvertError),
    /// Filter bank errors
    Filter(FilterError),
    /// Pixel buffer shape errors
    Frame(FrameError),
    /// Render pass and GPU resource errors
    Render(RenderError),
    /// Configuration errors
    Config(String),
    /// Generic error with message
    Other(String),
}

/// Errors from the NV21 color/format converter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    /// Width or height is zero
    ZeroDimensions { width: u32, height: u32 },
    /// NV21 chroma subsampling requires even dimensions
    OddDimensions { width: u32, height: u32 },
    /// Input buffer shorter than the declared geometry requires
    ShortBuffer { expected: usize, actual: usize },
}

/// Errors from the filter bank
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// Filter input must be a 3-channel buffer
    UnsupportedChannels(u8),
    /// Filter input has no pixels
    EmptyInput,
}

/// Pixel buffer shape violations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Channel count other than 1, 3 or 4
    UnsupportedChannels(u8),
    /// Data length does not match width * height * channels
    LengthMismatch { expected: usize, actual: usize },
}

/// Errors from the texture upload and draw stage
#[derive(Debug, Clone)]
pub enum RenderError {
    /// No suitable GPU adapter found
    NoAdapter,
    /// Device or queue creation failed
    DeviceCreation(String),
    /// Fetched frame is empty or has non-positive dimensions
    EmptyFrame,
    /// Frame channel count cannot be normalized for upload
    UnsupportedChannels(u8),
    /// Buffer size does not match the upload texture after resize
    SizeMismatch { expected: usize, actual: usize },
    /// Reading rendered pixels back from the GPU failed
    Readback(String),
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayError::Convert(e) => write!(f, "Conversion error: {}", e),
            RelayError::Filter(e) => write!(f, "Filter error: {}", e),
            RelayError::Frame(e) => write!(f, "Frame error: {}", e),
            RelayError::Render(e) => write!(f, "Render error: {}", e),
            RelayError::Config(msg) => write!(f, "Configuration error: {}", msg),
            RelayError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertError::ZeroDimensions { width, height } => {
                write!(f, "Zero frame dimensions: {}x{}", width, height)
            }
            ConvertError::OddDimensions { width, height } => {
                write!(f, "NV21 requires even dimensions, got {}x{}", width, height)
            }
            ConvertError::ShortBuffer { expected, actual } => {
                write!(
                    f,
                    "Input buffer too short: expected {}, got {}",
                    expected, actual
                )
            }
        }
    }
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterError::UnsupportedChannels(c) => {
                write!(f, "Filter expects a 3-channel buffer, got {} channels", c)
            }
            FilterError::EmptyInput => write!(f, "Filter input is empty"),
        }
    }
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::UnsupportedChannels(c) => {
                write!(f, "Unsupported channel count: {}", c)
            }
            FrameError::LengthMismatch { expected, actual } => {
                write!(
                    f,
                    "Buffer length mismatch: expected {}, got {}",
                    expected, actual
                )
            }
        }
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::NoAdapter => write!(f, "No suitable GPU adapter found"),
            RenderError::DeviceCreation(msg) => write!(f, "Device creation failed: {}", msg),
            RenderError::EmptyFrame => write!(f, "Fetched frame is empty"),
            RenderError::UnsupportedChannels(c) => {
                write!(f, "Unsupported frame channel count: {}", c)
            }
            RenderError::SizeMismatch { expected, actual } => {
                write!(f, "Upload size mismatch: expected {}, got {}", expected, actual)
            }
            RenderError::Readback(msg) => write!(f, "Readback failed: {}", msg),
        }
    }
}

impl std::error::Error for RelayError {}
impl std::error::Error for ConvertError {}
impl std::error::Error for FilterError {}
impl std::error::Error for FrameError {}
impl std::error::Error for RenderError {}

impl From<ConvertError> for RelayError {
    fn from(err: ConvertError) -> Self {
        RelayError::Convert(err)
    }
}

impl From<FilterError> for RelayError {
    fn from(err: FilterError) -> Self {
        RelayError::Filter(err)
    }
}

impl From<FrameError> for RelayError {
    fn from(err: FrameError) -> Self {
        RelayError::Frame(err)
    }
}

impl From<RenderError> for RelayError {
    fn from(err: RenderError) -> Self {
        RelayError::Render(err)
    }
}

impl From<FrameError> for RenderError {
    fn from(err: FrameError) -> Self {
        match err {
            FrameError::UnsupportedChannels(c) => RenderError::UnsupportedChannels(c),
            FrameError::LengthMismatch { expected, actual } => {
                RenderError::SizeMismatch { expected, actual }
            }
        }
    }
}

impl From<String> for RelayError {
    fn from(msg: String) -> Self {
        RelayError::Other(msg)
    }
}

impl From<&str> for RelayError {
    fn from(msg: &str) -> Self {
        RelayError::Other(msg.to_string())
    }
}
