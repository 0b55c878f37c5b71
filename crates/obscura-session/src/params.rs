use obscura_device::FrameFormat;
use std::fmt;

/// Fixed preview geometry; caller-requested sizes are normalized back to this.
pub const PREVIEW_WIDTH: u32 = 640;
pub const PREVIEW_HEIGHT: u32 = 480;

/// Fixed still-picture geometry (stills come from the same device mode).
pub const PICTURE_WIDTH: u32 = 640;
pub const PICTURE_HEIGHT: u32 = 480;

/// Nominal preview frame rate.
pub const DEFAULT_FRAME_RATE: u32 = 15;

const SUPPORTED_PICTURE_SIZES: &str = "640x480,352x288";

/// Pixel encoding named the way camera parameters name them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    /// Packed YUV 4:2:2 — the only supported preview encoding.
    Yuv422sp,
    /// Planar YUV 4:2:0.
    Yuv420sp,
    /// 16-bit RGB.
    Rgb565,
    /// JPEG — the only supported still encoding.
    Jpeg,
}

impl PixelFormat {
    /// The device-level format this encoding maps onto, if any.
    pub fn device_format(self) -> Option<FrameFormat> {
        match self {
            PixelFormat::Yuv422sp => Some(FrameFormat::Yuyv),
            PixelFormat::Jpeg => Some(FrameFormat::Mjpeg),
            PixelFormat::Yuv420sp | PixelFormat::Rgb565 => None,
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PixelFormat::Yuv422sp => "yuv422sp",
            PixelFormat::Yuv420sp => "yuv420sp",
            PixelFormat::Rgb565 => "rgb565",
            PixelFormat::Jpeg => "jpeg",
        };
        write!(f, "{name}")
    }
}

/// Capture parameters for one session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaptureParameters {
    preview_width: u32,
    preview_height: u32,
    preview_fps: u32,
    preview_format: PixelFormat,
    picture_width: u32,
    picture_height: u32,
    picture_format: PixelFormat,
    jpeg_quality: u8,
}

impl Default for CaptureParameters {
    fn default() -> Self {
        Self {
            preview_width: PREVIEW_WIDTH,
            preview_height: PREVIEW_HEIGHT,
            preview_fps: DEFAULT_FRAME_RATE,
            preview_format: PixelFormat::Yuv422sp,
            picture_width: PICTURE_WIDTH,
            picture_height: PICTURE_HEIGHT,
            picture_format: PixelFormat::Jpeg,
            jpeg_quality: 100,
        }
    }
}

impl CaptureParameters {
    /// Set the requested preview size in pixels.
    pub fn with_preview_size(mut self, width: u32, height: u32) -> Self {
        self.preview_width = width;
        self.preview_height = height;
        self
    }

    /// Set the preview frames per second.
    pub fn with_preview_fps(mut self, fps: u32) -> Self {
        self.preview_fps = fps;
        self
    }

    /// Set the preview pixel encoding.
    pub fn with_preview_format(mut self, format: PixelFormat) -> Self {
        self.preview_format = format;
        self
    }

    /// Set the requested still-picture size in pixels.
    pub fn with_picture_size(mut self, width: u32, height: u32) -> Self {
        self.picture_width = width;
        self.picture_height = height;
        self
    }

    /// Set the still-picture encoding.
    pub fn with_picture_format(mut self, format: PixelFormat) -> Self {
        self.picture_format = format;
        self
    }

    /// Set the JPEG quality (0-100).
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality;
        self
    }

    // Getters
    pub fn preview_size(&self) -> (u32, u32) {
        (self.preview_width, self.preview_height)
    }

    pub fn preview_fps(&self) -> u32 {
        self.preview_fps
    }

    pub fn preview_format(&self) -> PixelFormat {
        self.preview_format
    }

    pub fn picture_size(&self) -> (u32, u32) {
        (self.picture_width, self.picture_height)
    }

    pub fn picture_format(&self) -> PixelFormat {
        self.picture_format
    }

    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }

    /// Advertised still-picture sizes, as a parameter-list string.
    pub fn supported_picture_sizes() -> &'static str {
        SUPPORTED_PICTURE_SIZES
    }

    /// Overwrite requested geometry with the fixed supported sizes.
    ///
    /// Applied after every accepted update, whatever was requested.
    pub(crate) fn force_supported_geometry(&mut self) {
        self.preview_width = PREVIEW_WIDTH;
        self.preview_height = PREVIEW_HEIGHT;
        self.picture_width = PICTURE_WIDTH;
        self.picture_height = PICTURE_HEIGHT;
    }
}
