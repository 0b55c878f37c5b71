use crate::params::{self, CaptureParameters, PixelFormat};
use crate::preview::PreviewWorker;
use crate::{CallbackDispatcher, CameraListener, FrameBuffer, MsgKind, SessionError};
use log::{debug, warn};
use obscura_device::{DeviceChannel, DeviceError, FrameFormat};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, Weak};
use std::thread;

/// Device node every session drives.
pub const VIDEO_DEVICE: &str = "/dev/video0";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LifecycleState {
    Idle,
    /// Bookkeeping claimed, hardware setup still in flight.
    Starting,
    Previewing,
}

struct SessionInner {
    params: CaptureParameters,
    state: LifecycleState,
    worker: Option<PreviewWorker>,
    preview_buffer: Option<Arc<FrameBuffer>>,
}

/// The one live camera session.
///
/// Owns the device channel and the preview frame buffer, coordinates
/// the idle / preview / still-capture lifecycle, and feeds the
/// registered listener through the callback dispatcher. Obtain a
/// shared handle via [`CameraSession::create_or_attach_with`]; while
/// any handle is alive, repeated calls attach to the same session.
pub struct CameraSession {
    device: Arc<dyn DeviceChannel>,
    dispatcher: Arc<CallbackDispatcher>,
    inner: Mutex<SessionInner>,
}

fn current_session() -> &'static Mutex<Weak<CameraSession>> {
    static CURRENT: OnceLock<Mutex<Weak<CameraSession>>> = OnceLock::new();
    CURRENT.get_or_init(|| Mutex::new(Weak::new()))
}

impl CameraSession {
    /// Build a session around the given device channel, with default
    /// parameters. Test seam; production code goes through
    /// [`create_or_attach_with`](Self::create_or_attach_with).
    pub fn new(device: Arc<dyn DeviceChannel>) -> Self {
        Self {
            device,
            dispatcher: Arc::new(CallbackDispatcher::new()),
            inner: Mutex::new(SessionInner {
                params: CaptureParameters::default(),
                state: LifecycleState::Idle,
                worker: None,
                preview_buffer: None,
            }),
        }
    }

    /// Return the live session, or create one from `make_device` if the
    /// last handle was dropped.
    pub fn create_or_attach_with(
        make_device: impl FnOnce() -> Arc<dyn DeviceChannel>,
    ) -> Arc<CameraSession> {
        let mut current = current_session().lock().unwrap_or_else(|e| e.into_inner());
        if let Some(session) = current.upgrade() {
            return session;
        }
        let session = Arc::new(CameraSession::new(make_device()));
        *current = Arc::downgrade(&session);
        session
    }

    /// Return the live session, creating one over the default V4L2
    /// device if needed.
    #[cfg(feature = "v4l2")]
    pub fn create_or_attach() -> Arc<CameraSession> {
        Self::create_or_attach_with(|| {
            Arc::new(obscura_device::V4l2Channel::new(params::DEFAULT_FRAME_RATE))
        })
    }

    fn lock_inner(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    // ---- callbacks and message mask ----

    /// Register (or clear) the consumer listener.
    pub fn set_callbacks(&self, listener: Option<Arc<dyn CameraListener>>) {
        self.dispatcher.set_callbacks(listener);
    }

    pub fn enable_messages(&self, kinds: MsgKind) {
        self.dispatcher.enable(kinds);
    }

    pub fn disable_messages(&self, kinds: MsgKind) {
        self.dispatcher.disable(kinds);
    }

    pub fn message_enabled(&self, kind: MsgKind) -> bool {
        self.dispatcher.is_enabled(kind)
    }

    // ---- preview ----

    /// Start live preview.
    ///
    /// Fails with [`SessionError::AlreadyRunning`] if preview is active
    /// or starting. Device setup happens outside the session lock, so
    /// there is a short window where bookkeeping is claimed but
    /// streaming has not begun; a device failure in that window rolls
    /// the session back to idle.
    pub fn start_preview(&self) -> Result<(), SessionError> {
        {
            let mut inner = self.lock_inner();
            if inner.state != LifecycleState::Idle {
                debug!("start_preview: already running");
                return Err(SessionError::AlreadyRunning);
            }
            inner.state = LifecycleState::Starting;
        }

        if let Err(err) = self.open_streaming(FrameFormat::Yuyv) {
            warn!("start_preview failed: {err}");
            self.lock_inner().state = LifecycleState::Idle;
            return Err(SessionError::Device(err));
        }

        let buffer = Arc::new(FrameBuffer::for_preview(
            params::PREVIEW_WIDTH,
            params::PREVIEW_HEIGHT,
        ));
        let worker = PreviewWorker::spawn(
            self.device.clone(),
            buffer.clone(),
            self.dispatcher.clone(),
        );

        let mut inner = self.lock_inner();
        inner.preview_buffer = Some(buffer);
        inner.worker = Some(worker);
        inner.state = LifecycleState::Previewing;
        Ok(())
    }

    /// Stop live preview and wait for the preview loop to exit.
    ///
    /// Idempotent; calling on an idle session is a no-op. Once this
    /// returns, no further preview-frame dispatch occurs.
    pub fn stop_preview(&self) {
        let worker = {
            let mut inner = self.lock_inner();
            match inner.worker.take() {
                Some(worker) => {
                    // Flag first so the loop observes it promptly.
                    worker.request_stop();
                    worker
                }
                None => return,
            }
        };

        self.close_streaming();
        worker.join();

        let mut inner = self.lock_inner();
        inner.preview_buffer = None;
        inner.state = LifecycleState::Idle;
    }

    pub fn preview_enabled(&self) -> bool {
        self.lock_inner().state != LifecycleState::Idle
    }

    // ---- still capture ----

    /// Capture one compressed still image.
    ///
    /// Stops preview, dispatches the shutter notification, pulls one
    /// encoded frame from the device at the fixed geometry, dispatches
    /// it as COMPRESSED_IMAGE, and closes the device. Ends idle on
    /// every path.
    pub fn take_picture(&self) -> Result<(), SessionError> {
        self.stop_preview();
        self.capture_sequence()
    }

    fn capture_sequence(&self) -> Result<(), SessionError> {
        self.dispatcher.dispatch_notify(MsgKind::SHUTTER, 0, 0);

        let still = {
            let inner = self.lock_inner();
            inner.params.picture_format()
        };
        // Validation pinned the still format to jpeg, which always has
        // a device mapping.
        let format = still.device_format().ok_or(SessionError::InvalidFormat)?;

        self.open_streaming(format)?;

        let image = match self.device.grab_compressed_frame() {
            Ok(image) => image,
            Err(err) => {
                self.close_streaming();
                return Err(SessionError::Device(err));
            }
        };

        self.dispatcher.dispatch_data(MsgKind::COMPRESSED_IMAGE, &image);
        self.close_streaming();
        Ok(())
    }

    /// Cancel an in-flight capture. Nothing is cancellable, so this
    /// always succeeds.
    pub fn cancel_picture(&self) -> Result<(), SessionError> {
        Ok(())
    }

    // ---- autofocus ----

    /// Report focus success on a detached one-shot thread.
    ///
    /// No focus hardware is modeled; the contract is "always reports
    /// success quickly".
    pub fn auto_focus(&self) -> Result<(), SessionError> {
        let dispatcher = self.dispatcher.clone();
        thread::spawn(move || {
            dispatcher.dispatch_notify(MsgKind::FOCUS, 1, 0);
        });
        Ok(())
    }

    pub fn cancel_auto_focus(&self) -> Result<(), SessionError> {
        Ok(())
    }

    // ---- recording (permanent stubs) ----

    pub fn start_recording(&self) -> Result<(), SessionError> {
        Err(SessionError::Unsupported)
    }

    pub fn stop_recording(&self) -> Result<(), SessionError> {
        Err(SessionError::Unsupported)
    }

    pub fn recording_enabled(&self) -> bool {
        false
    }

    pub fn release_recording_frame(&self) -> Result<(), SessionError> {
        Err(SessionError::Unsupported)
    }

    // ---- commands ----

    /// No command codes are recognized.
    pub fn send_command(&self, command: i32, _arg1: i32, _arg2: i32) -> Result<(), SessionError> {
        debug!("send_command: unrecognized command {command}");
        Err(SessionError::BadArgument)
    }

    // ---- parameters ----

    /// Validate and store new capture parameters.
    ///
    /// Only the yuv422sp preview and jpeg still encodings are accepted;
    /// anything else fails with [`SessionError::InvalidFormat`] and
    /// leaves the stored parameters untouched. Requested geometry is
    /// overwritten with the fixed supported sizes on success.
    pub fn set_parameters(&self, params: CaptureParameters) -> Result<(), SessionError> {
        if params.preview_format() != PixelFormat::Yuv422sp {
            warn!("only yuv422sp preview is supported");
            return Err(SessionError::InvalidFormat);
        }
        if params.picture_format() != PixelFormat::Jpeg {
            warn!("only jpeg still pictures are supported");
            return Err(SessionError::InvalidFormat);
        }

        let (w, h) = params.preview_size();
        debug!(
            "requested preview {}x{} at {} fps",
            w,
            h,
            params.preview_fps()
        );

        let mut params = params;
        params.force_supported_geometry();
        self.lock_inner().params = params;
        Ok(())
    }

    pub fn get_parameters(&self) -> CaptureParameters {
        self.lock_inner().params.clone()
    }

    // ---- teardown ----

    /// Unconditionally close the device handle.
    pub fn release(&self) {
        if let Err(err) = self.device.close() {
            warn!("close on release failed: {err}");
        }
    }

    fn open_streaming(&self, format: FrameFormat) -> Result<(), DeviceError> {
        self.device.open(
            VIDEO_DEVICE,
            params::PREVIEW_WIDTH,
            params::PREVIEW_HEIGHT,
            format,
        )?;
        if let Err(err) = self.device.init() {
            let _ = self.device.close();
            return Err(err);
        }
        if let Err(err) = self.device.start_streaming() {
            let _ = self.device.uninit();
            let _ = self.device.close();
            return Err(err);
        }
        Ok(())
    }

    fn close_streaming(&self) {
        // Best-effort teardown; failures are logged, not surfaced.
        if let Err(err) = self.device.uninit() {
            warn!("device uninit failed: {err}");
        }
        if let Err(err) = self.device.stop_streaming() {
            warn!("stream stop failed: {err}");
        }
        if let Err(err) = self.device.close() {
            warn!("device close failed: {err}");
        }
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        // A dropped session must not leave the preview loop running.
        self.stop_preview();
    }
}
