use crate::{Result, SpaceMouseError};
use std::time::Duration;

// -- USB identifiers --
pub const VID_3DCONNEXION: u16 = 0x256F;
pub const PID_SPACEMOUSE_WIRELESS: u16 = 0xC62E;
pub const PID_SPACEMOUSE_PRO_WIRELESS: u16 = 0xC631;
pub const PID_SPACEMOUSE_COMPACT: u16 = 0xC635;

/// Default blocking read timeout; bounds how long `close()` waits on the reader.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// hidapi treats a zero timeout as a non-blocking read; never go below this.
pub const MIN_READ_TIMEOUT: Duration = Duration::from_millis(1);

/// How a device lays out motion data across its input reports.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportLayout {
    /// Translation (tag 1) and rotation (tag 2) arrive as separate 7-byte reports.
    Split = 0,
    /// One 13-byte report (tag 1) carries all six axes.
    Combined = 1,
}

impl ReportLayout {
    /// Number of bytes a motion report occupies in this layout.
    pub fn report_length(self) -> usize {
        match self {
            ReportLayout::Split => 7,
            ReportLayout::Combined => 13,
        }
    }
}

/// Static description of a supported device and how to scale its output.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceProfile {
    pub name: String,
    pub vendor_id: u16,
    pub product_id: u16,
    pub report_length: usize,
    pub layout: ReportLayout,
    /// Scales translation magnitude.
    pub pos_sensitivity: f64,
    /// Scales rotation magnitude.
    pub rot_sensitivity: f64,
    /// Log every raw report and committed control vector.
    pub verbose: bool,
    pub read_timeout: Duration,
}

impl DeviceProfile {
    pub fn new(name: &str, vendor_id: u16, product_id: u16, layout: ReportLayout) -> Self {
        Self {
            name: name.to_string(),
            vendor_id,
            product_id,
            report_length: layout.report_length(),
            layout,
            pos_sensitivity: 1.0,
            rot_sensitivity: 1.0,
            verbose: false,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    pub fn spacemouse_wireless() -> Self {
        Self::new(
            "spacemouse_wireless",
            VID_3DCONNEXION,
            PID_SPACEMOUSE_WIRELESS,
            ReportLayout::Combined,
        )
    }

    pub fn spacemouse_pro_wireless() -> Self {
        Self::new(
            "spacemouse_pro_wireless",
            VID_3DCONNEXION,
            PID_SPACEMOUSE_PRO_WIRELESS,
            ReportLayout::Combined,
        )
    }

    pub fn spacemouse_compact() -> Self {
        Self::new(
            "spacemouse_compact",
            VID_3DCONNEXION,
            PID_SPACEMOUSE_COMPACT,
            ReportLayout::Split,
        )
    }

    /// All built-in profiles.
    pub fn known() -> Vec<DeviceProfile> {
        vec![
            Self::spacemouse_wireless(),
            Self::spacemouse_pro_wireless(),
            Self::spacemouse_compact(),
        ]
    }

    /// Look up a built-in profile by its logical name (case-insensitive).
    pub fn by_name(name: &str) -> Result<DeviceProfile> {
        let wanted = name.trim().to_ascii_lowercase();
        Self::known()
            .into_iter()
            .find(|p| p.name == wanted)
            .ok_or_else(|| SpaceMouseError::UnknownProfile(name.to_string()))
    }

    pub fn with_pos_sensitivity(mut self, sensitivity: f64) -> Self {
        self.pos_sensitivity = sensitivity;
        self
    }

    pub fn with_rot_sensitivity(mut self, sensitivity: f64) -> Self {
        self.rot_sensitivity = sensitivity;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Set the blocking read timeout, clamped to at least `MIN_READ_TIMEOUT`.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout.max(MIN_READ_TIMEOUT);
        self
    }

    /// Apply `SPACEMOUSE_*` environment overrides on top of this profile.
    ///
    /// Unset or unparsable variables leave the current value in place.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = parse_f64(lookup("SPACEMOUSE_POS_SENSITIVITY")) {
            self.pos_sensitivity = v;
        }
        if let Some(v) = parse_f64(lookup("SPACEMOUSE_ROT_SENSITIVITY")) {
            self.rot_sensitivity = v;
        }
        if let Some(v) = parse_bool(lookup("SPACEMOUSE_VERBOSE")) {
            self.verbose = v;
        }
        if let Some(ms) = lookup("SPACEMOUSE_READ_TIMEOUT_MS")
            .and_then(|v| v.trim().parse::<u64>().ok())
        {
            self = self.with_read_timeout(Duration::from_millis(ms));
        }
        log::debug!(
            "Profile '{}': pos_sensitivity={} rot_sensitivity={} verbose={} read_timeout={:?}",
            self.name,
            self.pos_sensitivity,
            self.rot_sensitivity,
            self.verbose,
            self.read_timeout
        );
        self
    }
}

fn parse_f64(value: Option<String>) -> Option<f64> {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn parse_bool(value: Option<String>) -> Option<bool> {
    value.and_then(|v| {
        let v = v.trim().to_ascii_lowercase();
        match v.as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        }
    })
}
