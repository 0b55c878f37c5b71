use crate::{DeviceError, FrameFormat};

/// Interface over a single video-capture device.
///
/// The session core calls `open`, `init` and `start_streaming` in that
/// order before any grab, and `stop_streaming`, `uninit`, `close` to
/// tear down. Implementations take `&self` and guard their own state,
/// because teardown may be issued from a different thread than the one
/// blocked in a grab.
pub trait DeviceChannel: Send + Sync {
    /// Open and configure the device node at the given geometry/format.
    fn open(
        &self,
        path: &str,
        width: u32,
        height: u32,
        format: FrameFormat,
    ) -> Result<(), DeviceError>;

    /// Allocate streaming buffers. Requires a prior `open`.
    fn init(&self) -> Result<(), DeviceError>;

    /// Begin frame delivery. Requires a prior `init`.
    fn start_streaming(&self) -> Result<(), DeviceError>;

    /// Block until the next frame and write it into `dest`.
    ///
    /// `dest` is never resized; a short frame leaves the tail untouched.
    fn grab_preview_frame(&self, dest: &mut [u8]) -> Result<(), DeviceError>;

    /// Block until a fully encoded still image is available and return it.
    fn grab_compressed_frame(&self) -> Result<Vec<u8>, DeviceError>;

    /// Stop frame delivery.
    fn stop_streaming(&self) -> Result<(), DeviceError>;

    /// Release streaming buffers.
    fn uninit(&self) -> Result<(), DeviceError>;

    /// Close the device node. Tolerates double-close.
    fn close(&self) -> Result<(), DeviceError>;
}
