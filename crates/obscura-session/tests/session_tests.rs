use obscura_device::{DeviceChannel, DeviceError, FrameFormat};
use obscura_session::{CameraListener, CameraSession, CaptureParameters, MsgKind, SessionError};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const MOCK_JPEG: &[u8] = b"\xff\xd8mock-jpeg\xff\xd9";

// Mock device for driving the session without hardware
struct MockChannel {
    calls: Mutex<Vec<&'static str>>,
    fail_open: bool,
}

impl MockChannel {
    fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_open: false,
        }
    }

    fn failing_open() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_open: true,
        }
    }

    fn push(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }
}

impl DeviceChannel for MockChannel {
    fn open(
        &self,
        _path: &str,
        _width: u32,
        _height: u32,
        _format: FrameFormat,
    ) -> Result<(), DeviceError> {
        self.push("open");
        if self.fail_open {
            return Err(DeviceError::Device("mock open failure".to_string()));
        }
        Ok(())
    }

    fn init(&self) -> Result<(), DeviceError> {
        self.push("init");
        Ok(())
    }

    fn start_streaming(&self) -> Result<(), DeviceError> {
        self.push("start_streaming");
        Ok(())
    }

    fn grab_preview_frame(&self, dest: &mut [u8]) -> Result<(), DeviceError> {
        // Emulate the blocking frame interval
        std::thread::sleep(Duration::from_millis(2));
        if !dest.is_empty() {
            dest[0] = 0x42;
        }
        Ok(())
    }

    fn grab_compressed_frame(&self) -> Result<Vec<u8>, DeviceError> {
        self.push("grab_compressed");
        Ok(MOCK_JPEG.to_vec())
    }

    fn stop_streaming(&self) -> Result<(), DeviceError> {
        self.push("stop_streaming");
        Ok(())
    }

    fn uninit(&self) -> Result<(), DeviceError> {
        self.push("uninit");
        Ok(())
    }

    fn close(&self) -> Result<(), DeviceError> {
        self.push("close");
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Event {
    Notify(MsgKind, i32, i32),
    Data(MsgKind, usize),
}

struct RecordingListener {
    events: Mutex<Vec<Event>>,
}

impl RecordingListener {
    fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    fn preview_frames(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::Data(kind, _) if *kind == MsgKind::PREVIEW_FRAME))
            .count()
    }
}

impl CameraListener for RecordingListener {
    fn on_notify(&self, kind: MsgKind, ext1: i32, ext2: i32) {
        self.events.lock().unwrap().push(Event::Notify(kind, ext1, ext2));
    }

    fn on_data(&self, kind: MsgKind, data: &[u8]) {
        self.events.lock().unwrap().push(Event::Data(kind, data.len()));
    }
}

fn wait_for(deadline: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    cond()
}

#[test]
fn test_no_preview_dispatch_after_stop_returns() {
    let session = CameraSession::new(Arc::new(MockChannel::new()));
    let listener = Arc::new(RecordingListener::new());
    session.set_callbacks(Some(listener.clone()));
    session.enable_messages(MsgKind::PREVIEW_FRAME);

    session.start_preview().unwrap();
    assert!(
        wait_for(Duration::from_secs(2), || listener.preview_frames() >= 3),
        "expected preview frames to flow"
    );

    session.stop_preview();
    let after_stop = listener.preview_frames();
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(
        listener.preview_frames(),
        after_stop,
        "preview frame dispatched after stop_preview returned"
    );
}

#[test]
fn test_second_start_preview_fails_already_running() {
    let session = CameraSession::new(Arc::new(MockChannel::new()));
    let listener = Arc::new(RecordingListener::new());
    session.set_callbacks(Some(listener.clone()));
    session.enable_messages(MsgKind::PREVIEW_FRAME);

    session.start_preview().unwrap();
    match session.start_preview() {
        Err(SessionError::AlreadyRunning) => {}
        other => panic!("Expected AlreadyRunning, got {:?}", other),
    }

    // The first preview keeps running undisturbed
    assert!(session.preview_enabled());
    let before = listener.preview_frames();
    assert!(
        wait_for(Duration::from_secs(2), || listener.preview_frames() > before),
        "first preview should keep delivering frames"
    );

    session.stop_preview();
}

#[test]
fn test_stop_preview_when_idle_is_noop() {
    let session = CameraSession::new(Arc::new(MockChannel::new()));
    session.stop_preview();
    session.stop_preview();
    assert!(!session.preview_enabled());
}

#[test]
fn test_start_preview_device_failure_rolls_back() {
    let session = CameraSession::new(Arc::new(MockChannel::failing_open()));

    match session.start_preview() {
        Err(SessionError::Device(_)) => {}
        other => panic!("Expected Device error, got {:?}", other),
    }

    // The transition rolled back; the state machine is not stuck
    assert!(!session.preview_enabled());
    assert!(matches!(
        session.start_preview(),
        Err(SessionError::Device(_))
    ));
}

#[test]
fn test_take_picture_dispatch_order() {
    let device = Arc::new(MockChannel::new());
    let session = CameraSession::new(device.clone());
    let listener = Arc::new(RecordingListener::new());
    session.set_callbacks(Some(listener.clone()));
    session.enable_messages(MsgKind::SHUTTER | MsgKind::COMPRESSED_IMAGE);

    session.start_preview().unwrap();
    session.take_picture().unwrap();

    let events = listener.events();
    assert_eq!(
        events,
        vec![
            Event::Notify(MsgKind::SHUTTER, 0, 0),
            Event::Data(MsgKind::COMPRESSED_IMAGE, MOCK_JPEG.len()),
        ],
        "expected exactly one shutter then one compressed image, no preview frames"
    );
    assert!(!session.preview_enabled());
}

#[test]
fn test_take_picture_from_idle_device_sequence() {
    let device = Arc::new(MockChannel::new());
    let session = CameraSession::new(device.clone());
    let listener = Arc::new(RecordingListener::new());
    session.set_callbacks(Some(listener.clone()));
    session.enable_messages(MsgKind::SHUTTER | MsgKind::COMPRESSED_IMAGE);

    session.take_picture().unwrap();

    assert_eq!(
        device.calls(),
        vec![
            "open",
            "init",
            "start_streaming",
            "grab_compressed",
            "uninit",
            "stop_streaming",
            "close",
        ]
    );
    assert_eq!(listener.events().len(), 2);
}

#[test]
fn test_take_picture_with_messages_disabled_is_silent() {
    let session = CameraSession::new(Arc::new(MockChannel::new()));
    let listener = Arc::new(RecordingListener::new());
    session.set_callbacks(Some(listener.clone()));

    session.take_picture().unwrap();
    assert!(listener.events().is_empty());
}

#[test]
fn test_auto_focus_reports_success() {
    let session = CameraSession::new(Arc::new(MockChannel::new()));
    let listener = Arc::new(RecordingListener::new());
    session.set_callbacks(Some(listener.clone()));
    session.enable_messages(MsgKind::FOCUS);

    session.auto_focus().unwrap();
    assert!(
        wait_for(Duration::from_secs(2), || {
            listener.events().contains(&Event::Notify(MsgKind::FOCUS, 1, 0))
        }),
        "expected a focus-success notification"
    );

    session.cancel_auto_focus().unwrap();
}

#[test]
fn test_recording_surface_is_unsupported() {
    let session = CameraSession::new(Arc::new(MockChannel::new()));

    assert!(matches!(
        session.start_recording(),
        Err(SessionError::Unsupported)
    ));
    assert!(matches!(
        session.stop_recording(),
        Err(SessionError::Unsupported)
    ));
    assert!(matches!(
        session.release_recording_frame(),
        Err(SessionError::Unsupported)
    ));
    assert!(!session.recording_enabled());
}

#[test]
fn test_send_command_rejects_all_codes() {
    let session = CameraSession::new(Arc::new(MockChannel::new()));
    assert!(matches!(
        session.send_command(7, 0, 0),
        Err(SessionError::BadArgument)
    ));
}

#[test]
fn test_set_parameters_forces_fixed_geometry() {
    let session = CameraSession::new(Arc::new(MockChannel::new()));

    let requested = CaptureParameters::default()
        .with_preview_size(1920, 1080)
        .with_picture_size(4000, 3000)
        .with_preview_fps(30);
    session.set_parameters(requested).unwrap();

    let stored = session.get_parameters();
    assert_eq!(stored.preview_size(), (640, 480));
    assert_eq!(stored.picture_size(), (640, 480));
    // Everything except geometry is kept as requested
    assert_eq!(stored.preview_fps(), 30);
}

#[test]
fn test_set_parameters_invalid_format_leaves_state_unchanged() {
    use obscura_session::PixelFormat;

    let session = CameraSession::new(Arc::new(MockChannel::new()));
    let defaults = session.get_parameters();

    let bad_preview = CaptureParameters::default().with_preview_format(PixelFormat::Rgb565);
    match session.set_parameters(bad_preview) {
        Err(SessionError::InvalidFormat) => {}
        other => panic!("Expected InvalidFormat, got {:?}", other),
    }

    let bad_still = CaptureParameters::default().with_picture_format(PixelFormat::Yuv420sp);
    match session.set_parameters(bad_still) {
        Err(SessionError::InvalidFormat) => {}
        other => panic!("Expected InvalidFormat, got {:?}", other),
    }

    assert_eq!(session.get_parameters(), defaults);
}

#[test]
fn test_release_closes_device() {
    let device = Arc::new(MockChannel::new());
    let session = CameraSession::new(device.clone());

    session.release();
    assert_eq!(device.calls(), vec!["close"]);
}
