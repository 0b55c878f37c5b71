use crate::{DeviceChannel, DeviceError, FrameFormat};
use log::debug;
use std::sync::Mutex;
use v4l::buffer::Type;
use v4l::io::mmap::Stream as MmapStream;
use v4l::io::traits::{CaptureStream, Stream};
use v4l::video::Capture;
use v4l::{Device, Format, FourCC};

const BUFFER_COUNT: u32 = 4;

struct V4l2State {
    device: Option<Device>,
    // The mmap stream only holds an Arc'd fd handle internally, so the
    // 'static lifetime is sound even though it is built from &Device.
    stream: Option<MmapStream<'static>>,
}

/// V4L2 implementation of [`DeviceChannel`].
pub struct V4l2Channel {
    fps: u32,
    state: Mutex<V4l2State>,
}

impl std::fmt::Debug for V4l2Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f.debug_struct("V4l2Channel")
            .field("fps", &self.fps)
            .field("device", &state.device.is_some())
            .field("stream", &state.stream.is_some())
            .finish()
    }
}

impl V4l2Channel {
    /// Create a channel that will request the given nominal frame rate
    /// whenever a device is opened through it.
    pub fn new(fps: u32) -> Self {
        Self {
            fps,
            state: Mutex::new(V4l2State {
                device: None,
                stream: None,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, V4l2State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl DeviceChannel for V4l2Channel {
    fn open(
        &self,
        path: &str,
        width: u32,
        height: u32,
        format: FrameFormat,
    ) -> Result<(), DeviceError> {
        let device = Device::with_path(path)?;

        let fourcc = FourCC::new(&format.fourcc());
        let mut fmt = Format::new(width, height, fourcc);
        fmt = Capture::set_format(&device, &fmt)?;

        // The driver may silently substitute another format
        if fmt.fourcc != fourcc {
            return Err(DeviceError::Device(format!(
                "{:?} not supported by {}",
                format, path
            )));
        }

        let params = v4l::video::capture::Parameters::with_fps(self.fps);
        Capture::set_params(&device, &params)?;

        debug!("opened {} at {}x{} {:?}", path, fmt.width, fmt.height, format);

        let mut state = self.lock();
        state.stream = None;
        state.device = Some(device);
        Ok(())
    }

    fn init(&self) -> Result<(), DeviceError> {
        let mut state = self.lock();
        let device = state
            .device
            .as_ref()
            .ok_or_else(|| DeviceError::Device("init before open".to_string()))?;

        let stream = MmapStream::with_buffers(device, Type::VideoCapture, BUFFER_COUNT)
            .map_err(|e| DeviceError::Stream(e.to_string()))?;
        state.stream = Some(stream);
        Ok(())
    }

    fn start_streaming(&self) -> Result<(), DeviceError> {
        let mut state = self.lock();
        let stream = state
            .stream
            .as_mut()
            .ok_or_else(|| DeviceError::Stream("start before init".to_string()))?;
        stream
            .start()
            .map_err(|e| DeviceError::Stream(e.to_string()))
    }

    fn grab_preview_frame(&self, dest: &mut [u8]) -> Result<(), DeviceError> {
        let mut state = self.lock();
        let stream = state
            .stream
            .as_mut()
            .ok_or_else(|| DeviceError::Stream("grab before init".to_string()))?;

        let (frame, meta) = CaptureStream::next(stream)
            .map_err(|e| DeviceError::Stream(e.to_string()))?;

        let used = if meta.bytesused > 0 {
            meta.bytesused as usize
        } else {
            frame.len()
        };
        let n = used.min(frame.len()).min(dest.len());
        dest[..n].copy_from_slice(&frame[..n]);
        Ok(())
    }

    fn grab_compressed_frame(&self) -> Result<Vec<u8>, DeviceError> {
        let mut state = self.lock();
        let stream = state
            .stream
            .as_mut()
            .ok_or_else(|| DeviceError::Stream("grab before init".to_string()))?;

        let (frame, meta) = CaptureStream::next(stream)
            .map_err(|e| DeviceError::Stream(e.to_string()))?;

        let used = if meta.bytesused > 0 {
            (meta.bytesused as usize).min(frame.len())
        } else {
            frame.len()
        };
        Ok(frame[..used].to_vec())
    }

    fn stop_streaming(&self) -> Result<(), DeviceError> {
        let mut state = self.lock();
        match state.stream.as_mut() {
            Some(stream) => stream
                .stop()
                .map_err(|e| DeviceError::Stream(e.to_string())),
            None => Ok(()),
        }
    }

    fn uninit(&self) -> Result<(), DeviceError> {
        self.lock().stream = None;
        Ok(())
    }

    fn close(&self) -> Result<(), DeviceError> {
        let mut state = self.lock();
        state.stream = None;
        state.device = None;
        Ok(())
    }
}
