//! # spacemouse - Rust driver for 3Dconnexion SpaceMouse 6DOF controllers
//!
//! Reads HID reports on a background thread and turns them into control
//! deltas for teleoperation loops. Provides:
//! - Built-in profiles for split-report and combined-report devices
//! - Absolute orientation integrated from rotation deltas
//! - Grasp toggle and reset/re-arm handling from the device buttons
//! - C FFI for integration with C/C++ simulators
//!
//! ## Quick Start
//! ```no_run
//! use spacemouse::{Controller, DeviceProfile};
//!
//! let profile = DeviceProfile::spacemouse_compact().with_pos_sensitivity(1.5);
//! let controller = Controller::open(profile).unwrap();
//!
//! for _ in 0..100 {
//!     let frame = controller.snapshot().unwrap();
//!     if frame.reset_requested {
//!         controller.rearm().unwrap();
//!     }
//!     println!("dpos: {:?} grasp: {}", frame.dpos, frame.grasp);
//!     std::thread::sleep(std::time::Duration::from_millis(50));
//! }
//! ```

pub mod error;
pub mod types;
pub mod profile;
pub mod protocol;
pub mod rotation;
pub mod hid;
pub mod controller;
pub mod ffi;

pub use error::SpaceMouseError;
pub use types::*;
pub use profile::{DeviceProfile, ReportLayout};
pub use hid::{HidTransport, Transport};
pub use controller::{controls_help, Controller, Lifecycle};

/// Result type alias for spacemouse operations.
pub type Result<T> = std::result::Result<T, SpaceMouseError>;
