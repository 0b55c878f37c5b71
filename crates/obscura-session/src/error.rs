use obscura_device::DeviceError;
use std::fmt;

#[derive(Debug)]
pub enum SessionError {
    /// Preview was started while already running.
    AlreadyRunning,
    /// Parameters requested an unsupported preview or still format.
    InvalidFormat,
    /// The operation is a permanent stub (recording surface).
    Unsupported,
    /// Unrecognized command code.
    BadArgument,
    /// The underlying capture device failed.
    Device(DeviceError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::AlreadyRunning => write!(f, "preview already running"),
            SessionError::InvalidFormat => write!(f, "unsupported pixel format"),
            SessionError::Unsupported => write!(f, "operation not supported"),
            SessionError::BadArgument => write!(f, "unrecognized command"),
            SessionError::Device(err) => write!(f, "device failure: {err}"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Device(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DeviceError> for SessionError {
    fn from(err: DeviceError) -> Self {
        SessionError::Device(err)
    }
}
