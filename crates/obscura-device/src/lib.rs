//! Capture-device abstraction for the obscura session controller.
//!
//! This crate defines the `DeviceChannel` trait the session core drives,
//! with a V4L2 backend behind the `v4l2` feature.

pub mod error;
pub mod format;
pub mod traits;

#[cfg(feature = "v4l2")]
pub mod v4l2;

pub use error::DeviceError;
pub use format::FrameFormat;
pub use traits::DeviceChannel;

#[cfg(feature = "v4l2")]
pub use v4l2::V4l2Channel;
