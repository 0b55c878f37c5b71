use crate::{CallbackDispatcher, FrameBuffer, MsgKind};
use log::{debug, warn};
use obscura_device::DeviceChannel;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

/// Background preview loop: thread plus stop flag, joined synchronously.
pub struct PreviewWorker {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl PreviewWorker {
    /// Spawn the loop. It runs until the stop flag is set or a grab
    /// fails (the device being torn down under it counts as the
    /// latter).
    pub fn spawn(
        device: Arc<dyn DeviceChannel>,
        buffer: Arc<FrameBuffer>,
        dispatcher: Arc<CallbackDispatcher>,
    ) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = stop.clone();
        let handle = thread::spawn(move || run(device, buffer, dispatcher, flag));
        Self {
            stop,
            handle: Some(handle),
        }
    }

    /// Ask the loop to exit at the next iteration boundary.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    /// Block until the loop has fully exited.
    ///
    /// After this returns, no further preview-frame dispatch occurs.
    pub fn join(mut self) {
        self.request_stop();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for PreviewWorker {
    fn drop(&mut self) {
        self.request_stop();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run(
    device: Arc<dyn DeviceChannel>,
    buffer: Arc<FrameBuffer>,
    dispatcher: Arc<CallbackDispatcher>,
    stop: Arc<AtomicBool>,
) {
    debug!("preview loop running");

    // No sleep or backoff here; pacing is however long the device
    // blocks for the next frame.
    while !stop.load(Ordering::Acquire) {
        let mut frame = buffer.lock();
        match device.grab_preview_frame(&mut frame) {
            Ok(()) => dispatcher.dispatch_data(MsgKind::PREVIEW_FRAME, &frame),
            Err(err) => {
                // A failure after the stop flag is set is just the
                // teardown race closing the device under us.
                if !stop.load(Ordering::Acquire) {
                    warn!("preview grab failed: {err}");
                }
                break;
            }
        }
    }

    debug!("preview loop exited");
}
