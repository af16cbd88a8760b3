//! C FFI layer for spacemouse.
//!
//! Provides opaque handle-based API for C/C++ consumers.
//! The generated C header is written to `include/spacemouse.h` by cbindgen.

use crate::controller::Controller;
use crate::error::LastError;
use crate::types::ControlFrame;
use std::ffi::{c_char, c_int, CStr};

/// Last error message for C consumers.
static LAST_ERROR: LastError = LastError::new();

/// Opaque controller handle for C consumers.
pub struct SmController(Controller);

/// Control frame in C-compatible layout.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct SmControlFrame {
    /// Scaled translation delta [x, y, z].
    pub dpos: [f64; 3],
    /// Absolute rotation matrix, flat row-major (9 elements).
    pub rotation: [f64; 9],
    /// Scaled rotation delta [roll, pitch, yaw].
    pub raw_drotation: [f64; 3],
    pub grasp: bool,
    pub reset_requested: bool,
}

impl From<ControlFrame> for SmControlFrame {
    fn from(frame: ControlFrame) -> Self {
        let mut rotation = [0.0; 9];
        for (i, row) in frame.rotation.iter().enumerate() {
            rotation[i * 3..i * 3 + 3].copy_from_slice(row);
        }
        SmControlFrame {
            dpos: frame.dpos,
            rotation,
            raw_drotation: frame.raw_drotation,
            grasp: frame.grasp,
            reset_requested: frame.reset_requested,
        }
    }
}

fn report<T>(result: crate::Result<T>) -> Option<T> {
    match result {
        Ok(v) => {
            LAST_ERROR.clear();
            Some(v)
        }
        Err(e) => {
            LAST_ERROR.set(&e);
            None
        }
    }
}

/// Open a device by built-in profile name (e.g. "spacemouse_compact").
/// `SPACEMOUSE_*` environment overrides are applied.
/// Returns NULL on error (check sm_last_error()).
///
/// # Safety
/// `name` must be a valid null-terminated string, or null.
#[no_mangle]
pub unsafe extern "C" fn sm_open(name: *const c_char) -> *mut SmController {
    if name.is_null() {
        return std::ptr::null_mut();
    }
    let name = CStr::from_ptr(name).to_string_lossy();

    match report(Controller::open_by_name(&name)) {
        Some(ctrl) => Box::into_raw(Box::new(SmController(ctrl))),
        None => std::ptr::null_mut(),
    }
}

/// Copy the current control state into `out`.
/// Returns 0 on success, -1 on error (closed, faulted, or null arguments).
///
/// # Safety
/// `ctrl` and `out` must be valid pointers, or null.
#[no_mangle]
pub unsafe extern "C" fn sm_snapshot(ctrl: *const SmController, out: *mut SmControlFrame) -> c_int {
    if ctrl.is_null() || out.is_null() {
        return -1;
    }
    let ctrl = &*ctrl;

    match report(ctrl.0.snapshot()) {
        Some(frame) => {
            out.write(frame.into());
            0
        }
        None => -1,
    }
}

/// Reset orientation and grasp and re-enable input after a reset button press.
/// Returns 0 on success, -1 on error.
///
/// # Safety
/// `ctrl` must be a valid controller pointer, or null.
#[no_mangle]
pub unsafe extern "C" fn sm_rearm(ctrl: *const SmController) -> c_int {
    if ctrl.is_null() {
        return -1;
    }
    let ctrl = &*ctrl;
    match report(ctrl.0.rearm()) {
        Some(()) => 0,
        None => -1,
    }
}

/// Stop the reader thread and release the device. The handle stays valid
/// until sm_free(). Returns 0 on success, -1 if already closed.
///
/// # Safety
/// `ctrl` must be a valid controller pointer, or null.
#[no_mangle]
pub unsafe extern "C" fn sm_close(ctrl: *const SmController) -> c_int {
    if ctrl.is_null() {
        return -1;
    }
    let ctrl = &*ctrl;
    match report(ctrl.0.close()) {
        Some(()) => 0,
        None => -1,
    }
}

/// Check if the reader thread is still running.
///
/// # Safety
/// `ctrl` must be a valid controller pointer, or null.
#[no_mangle]
pub unsafe extern "C" fn sm_is_running(ctrl: *const SmController) -> bool {
    if ctrl.is_null() {
        return false;
    }
    let ctrl = &*ctrl;
    ctrl.0.is_running()
}

/// Close (if needed) and free a controller.
///
/// # Safety
/// `ctrl` must be a pointer returned by `sm_open`, or null.
#[no_mangle]
pub unsafe extern "C" fn sm_free(ctrl: *mut SmController) {
    if !ctrl.is_null() {
        drop(Box::from_raw(ctrl));
    }
}

/// Get the last error message. Returns NULL if the last call succeeded.
/// The returned pointer is valid until the next spacemouse API call.
#[no_mangle]
pub extern "C" fn sm_last_error() -> *const c_char {
    LAST_ERROR.as_ptr()
}
