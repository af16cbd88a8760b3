use std::fmt;

/// Errors that can occur when talking to a SpaceMouse.
#[derive(Debug, thiserror::Error)]
pub enum SpaceMouseError {
    #[error("HID error: {0}")]
    Hid(#[from] hidapi::HidError),

    #[error("Device not found (VID={vendor_id:04X} PID={product_id:04X})")]
    DeviceNotFound { vendor_id: u16, product_id: u16 },

    #[error("Failed to open device: {0}")]
    DeviceOpenFailed(String),

    #[error("Malformed report: expected {expected} bytes, got {actual}")]
    MalformedReport { expected: usize, actual: usize },

    #[error("Unknown device profile '{0}'")]
    UnknownProfile(String),

    #[error("Transport fault: {0}")]
    TransportFault(String),

    #[error("Failed to spawn reader thread: {0}")]
    ThreadSpawn(String),

    #[error("Controller is closed")]
    Closed,

    #[error("Controller already closed")]
    AlreadyClosed,
}

/// Thread-safe last-error storage for the C FFI layer.
pub(crate) struct LastError {
    message: std::sync::Mutex<String>,
}

impl LastError {
    pub const fn new() -> Self {
        Self {
            message: std::sync::Mutex::new(String::new()),
        }
    }

    pub fn set(&self, err: &SpaceMouseError) {
        if let Ok(mut msg) = self.message.lock() {
            *msg = fmt::format(format_args!("{}\0", err));
        }
    }

    pub fn clear(&self) {
        if let Ok(mut msg) = self.message.lock() {
            msg.clear();
        }
    }

    pub fn as_ptr(&self) -> *const std::ffi::c_char {
        match self.message.lock() {
            Ok(msg) if !msg.is_empty() => msg.as_ptr() as *const std::ffi::c_char,
            _ => std::ptr::null(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_error_roundtrip() {
        let last = LastError::new();
        assert!(last.as_ptr().is_null());

        last.set(&SpaceMouseError::Closed);
        let ptr = last.as_ptr();
        assert!(!ptr.is_null());
        let msg = unsafe { std::ffi::CStr::from_ptr(ptr) };
        assert_eq!(msg.to_str().unwrap(), "Controller is closed");

        last.clear();
        assert!(last.as_ptr().is_null());
    }

    #[test]
    fn test_device_not_found_message() {
        let err = SpaceMouseError::DeviceNotFound {
            vendor_id: 0x256F,
            product_id: 0xC635,
        };
        assert_eq!(err.to_string(), "Device not found (VID=256F PID=C635)");
    }
}
