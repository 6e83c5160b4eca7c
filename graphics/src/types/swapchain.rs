//! Swap chain surfaces and descriptors.

use std::fmt;

use raw_window_handle::{HasDisplayHandle, HasWindowHandle, RawDisplayHandle, RawWindowHandle};

use super::TextureFormat;
use crate::error::GraphicsError;

/// Presentation mode for the swap chain.
///
/// Controls how frames are synchronized with the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PresentMode {
    /// No synchronization. May cause tearing but has lowest latency.
    Immediate,
    /// Triple buffering. Low latency without tearing.
    Mailbox,
    /// VSync enabled. No tearing, but may have higher latency.
    #[default]
    Fifo,
    /// VSync with relaxed timing. May tear if a frame is late.
    FifoRelaxed,
}

/// Platform window a swap chain presents to.
///
/// Only the raw handles are stored. The window must outlive every swap chain
/// created from the surface.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SwapChainSurface {
    window: RawWindowHandle,
    display: RawDisplayHandle,
}

// SAFETY: the raw handles are plain identifiers. They are only dereferenced by
// backends on the thread that owns the window, which is the caller's contract.
unsafe impl Send for SwapChainSurface {}
unsafe impl Sync for SwapChainSurface {}

impl SwapChainSurface {
    /// Capture the handles of a window.
    pub fn from_window<W>(window: &W) -> Result<Self, GraphicsError>
    where
        W: HasWindowHandle + HasDisplayHandle,
    {
        let window_handle = window.window_handle().map_err(|e| {
            GraphicsError::invalid_argument("surface", format!("no window handle: {e}"))
        })?;
        let display_handle = window.display_handle().map_err(|e| {
            GraphicsError::invalid_argument("surface", format!("no display handle: {e}"))
        })?;
        Ok(Self::from_raw(window_handle.as_raw(), display_handle.as_raw()))
    }

    /// Wrap raw handles obtained elsewhere.
    pub fn from_raw(window: RawWindowHandle, display: RawDisplayHandle) -> Self {
        Self { window, display }
    }

    /// Raw window handle.
    pub fn window_handle(&self) -> RawWindowHandle {
        self.window
    }

    /// Raw display handle.
    pub fn display_handle(&self) -> RawDisplayHandle {
        self.display
    }
}

impl fmt::Debug for SwapChainSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwapChainSurface")
            .field("window", &self.window)
            .field("display", &self.display)
            .finish()
    }
}

/// Descriptor for creating a swap chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SwapChainDescriptor {
    /// Debug label for the swap chain.
    pub label: Option<String>,
    /// Back buffer width in pixels.
    pub width: u32,
    /// Back buffer height in pixels.
    pub height: u32,
    /// Back buffer format.
    pub format: TextureFormat,
    /// Presentation mode (vsync behavior).
    pub present_mode: PresentMode,
    /// Whether the swap chain owns the display exclusively.
    pub fullscreen: bool,
}

impl SwapChainDescriptor {
    /// Create a swap chain descriptor with the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Set the back buffer format.
    pub fn with_format(mut self, format: TextureFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the presentation mode.
    pub fn with_present_mode(mut self, present_mode: PresentMode) -> Self {
        self.present_mode = present_mode;
        self
    }

    /// Request exclusive fullscreen.
    pub fn with_fullscreen(mut self, fullscreen: bool) -> Self {
        self.fullscreen = fullscreen;
        self
    }

    /// Set the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

impl Default for SwapChainDescriptor {
    fn default() -> Self {
        Self {
            label: None,
            width: 1,
            height: 1,
            format: TextureFormat::Bgra8UnormSrgb,
            present_mode: PresentMode::Fifo,
            fullscreen: false,
        }
    }
}
