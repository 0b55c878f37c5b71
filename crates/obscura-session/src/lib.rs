//! Camera-device session controller.
//!
//! One live [`CameraSession`] at a time owns a capture device, drives the
//! idle / preview / still-capture lifecycle, and delivers frames to a
//! registered [`CameraListener`] through a masked callback dispatcher
//! while a background worker pulls frames from the device.

pub mod buffer;
pub mod callback;
pub mod error;
pub mod message;
pub mod params;
pub mod preview;
pub mod session;

pub use buffer::FrameBuffer;
pub use callback::{CallbackDispatcher, CameraListener};
pub use error::SessionError;
pub use message::MsgKind;
pub use params::{CaptureParameters, PixelFormat};
pub use session::CameraSession;
