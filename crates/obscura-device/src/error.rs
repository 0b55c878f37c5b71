use std::fmt;

#[derive(Debug)]
pub enum DeviceError {
    Device(String),
    Stream(String),
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::Device(msg) => write!(f, "device error: {msg}"),
            DeviceError::Stream(msg) => write!(f, "stream error: {msg}"),
        }
    }
}

impl std::error::Error for DeviceError {}

impl From<std::io::Error> for DeviceError {
    fn from(err: std::io::Error) -> Self {
        DeviceError::Device(err.to_string())
    }
}
