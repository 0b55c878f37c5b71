/// Device-level frame format.
///
/// The session core pins exactly two device modes: packed YUV 4:2:2
/// for preview streaming and MJPEG for compressed stills.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameFormat {
    /// Packed YUYV (YUV 4:2:2), 2 bytes per pixel.
    Yuyv,
    /// Motion-JPEG; each frame is a complete JPEG image.
    Mjpeg,
}

impl FrameFormat {
    /// FourCC byte code for this format.
    pub fn fourcc(self) -> [u8; 4] {
        match self {
            FrameFormat::Yuyv => *b"YUYV",
            FrameFormat::Mjpeg => *b"MJPG",
        }
    }

    /// Bytes per pixel for uncompressed formats, `None` for compressed.
    pub fn bytes_per_pixel(self) -> Option<usize> {
        match self {
            FrameFormat::Yuyv => Some(2),
            FrameFormat::Mjpeg => None,
        }
    }
}
