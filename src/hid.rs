use crate::types::DeviceDescription;
use crate::{Result, SpaceMouseError};
use hidapi::{HidApi, HidDevice};
use std::fmt::Display;
use std::time::Duration;

/// Source of raw input reports.
///
/// The acquisition thread owns the transport exclusively; dropping it releases
/// the underlying device.
pub trait Transport: Send + 'static {
    /// Read one report into `buf`, waiting at most `timeout`.
    ///
    /// Returns `Ok(None)` when no report arrived in time. An `Err` means the
    /// transport is unusable and the session ends.
    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<Option<usize>>;

    /// Manufacturer/product strings for diagnostics.
    fn describe(&self) -> DeviceDescription;
}

/// HID transport over hidapi interrupt reads.
pub struct HidTransport {
    device: HidDevice,
}

impl HidTransport {
    /// Open the first HID device matching `vendor_id`/`product_id`.
    pub fn open(vendor_id: u16, product_id: u16) -> Result<Self> {
        let api = HidApi::new().map_err(|e| open_failed(vendor_id, product_id, e))?;

        if !api
            .device_list()
            .any(|d| d.vendor_id() == vendor_id && d.product_id() == product_id)
        {
            return Err(SpaceMouseError::DeviceNotFound {
                vendor_id,
                product_id,
            });
        }

        let device = api
            .open(vendor_id, product_id)
            .map_err(|e| open_failed(vendor_id, product_id, e))?;

        Ok(Self { device })
    }
}

fn open_failed(vendor_id: u16, product_id: u16, e: impl Display) -> SpaceMouseError {
    SpaceMouseError::DeviceOpenFailed(format!(
        "VID={:04X} PID={:04X}: {}",
        vendor_id, product_id, e
    ))
}

/// hidapi milliseconds for a blocking read. Zero would make it non-blocking.
fn timeout_millis(timeout: Duration) -> i32 {
    i32::try_from(timeout.as_millis()).unwrap_or(i32::MAX).max(1)
}

impl Transport for HidTransport {
    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<Option<usize>> {
        match self.device.read_timeout(buf, timeout_millis(timeout)) {
            Ok(0) => Ok(None),
            Ok(n) => Ok(Some(n)),
            Err(e) => Err(SpaceMouseError::TransportFault(format!("read failed: {}", e))),
        }
    }

    fn describe(&self) -> DeviceDescription {
        let string = |s: hidapi::HidResult<Option<String>>| {
            s.ok().flatten().unwrap_or_default()
        };
        DeviceDescription {
            manufacturer: string(self.device.get_manufacturer_string()),
            product: string(self.device.get_product_string()),
        }
    }
}
