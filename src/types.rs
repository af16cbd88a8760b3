/// 3x3 row-major matrix.
pub type Matrix3 = [[f64; 3]; 3];

/// Six decoded axes from the most recent report(s).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AxisSample {
    /// Translation [x, y, z] in raw device counts.
    pub translation: [f64; 3],
    /// Rotation [roll, pitch, yaw] in raw device counts.
    pub rotation: [f64; 3],
}

impl AxisSample {
    pub const ZERO: AxisSample = AxisSample {
        translation: [0.0; 3],
        rotation: [0.0; 3],
    };

    /// Full control vector [x, y, z, roll, pitch, yaw].
    pub fn control(&self) -> [f64; 6] {
        let [x, y, z] = self.translation;
        let [roll, pitch, yaw] = self.rotation;
        [x, y, z, roll, pitch, yaw]
    }
}

/// Gripper command derived from the grasp toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gripper {
    Open,
    Close,
}

/// Consumer-facing view of the controller, taken at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlFrame {
    /// Scaled translation delta [x, y, z].
    pub dpos: [f64; 3],
    /// Accumulated absolute orientation (row-major).
    pub rotation: Matrix3,
    /// Scaled rotation delta [roll, pitch, yaw].
    pub raw_drotation: [f64; 3],
    pub grasp: bool,
    /// Set by the reset button; cleared by `Controller::rearm`.
    pub reset_requested: bool,
}

impl ControlFrame {
    pub fn gripper_command(&self) -> Gripper {
        if self.grasp {
            Gripper::Close
        } else {
            Gripper::Open
        }
    }
}

/// Manufacturer and product strings reported by the device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceDescription {
    pub manufacturer: String,
    pub product: String,
}

/// Counters kept by the acquisition loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportStats {
    /// Reports returned by the transport (timeouts excluded).
    pub read: u64,
    /// Reports decoded and applied to the controller state.
    pub applied: u64,
    /// Reports dropped because the controller was disarmed.
    pub ignored: u64,
    /// Reports with a tag the profile does not know.
    pub unrecognized: u64,
    /// Reports too short for their tag.
    pub malformed: u64,
}

impl ReportStats {
    /// Reports that have been fully handled, whatever the outcome.
    pub fn handled(&self) -> u64 {
        self.applied + self.ignored + self.unrecognized + self.malformed
    }
}
