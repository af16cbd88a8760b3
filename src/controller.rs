use crate::hid::{HidTransport, Transport};
use crate::profile::DeviceProfile;
use crate::protocol::{self, Report, BUTTON_RESET, BUTTON_TOGGLE};
use crate::rotation::{self, SEED_ROTATION};
use crate::types::{AxisSample, ControlFrame, DeviceDescription, Matrix3, ReportStats};
use crate::{Result, SpaceMouseError};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

/// Raw device counts are scaled by this before sensitivity is applied.
pub const CONTROL_SCALE: f64 = 0.05;

/// Extra time `close()` allows beyond one read timeout for the reader to exit.
pub const CLOSE_GRACE: Duration = Duration::from_millis(500);

/// Session lifecycle as seen by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Running,
    Stopping,
    Stopped,
}

/// Mutable device state. Only touched with the controller lock held.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ControllerState {
    axes: AxisSample,
    /// Split layout: translation waits here for its rotation half.
    pending: AxisSample,
    absolute_rotation: Matrix3,
    grasp: bool,
    reset_requested: bool,
    enabled: bool,
}

impl ControllerState {
    fn new() -> Self {
        Self {
            axes: AxisSample::ZERO,
            pending: AxisSample::ZERO,
            absolute_rotation: SEED_ROTATION,
            grasp: false,
            reset_requested: false,
            enabled: true,
        }
    }

    fn reset(&mut self) {
        self.axes = AxisSample::ZERO;
        self.pending = AxisSample::ZERO;
        self.absolute_rotation = SEED_ROTATION;
        self.grasp = false;
    }

    fn rearm(&mut self) {
        self.reset();
        self.reset_requested = false;
        self.enabled = true;
    }

    /// Apply one decoded report. Returns the control vector if a sample was committed.
    fn apply(&mut self, report: Report, rot_scale: f64) -> Option<[f64; 6]> {
        match report {
            Report::Translation { x, y, z } => {
                self.pending.translation = [x, y, z];
                None
            }
            Report::Rotation { roll, pitch, yaw } => {
                self.pending.rotation = [roll, pitch, yaw];
                Some(self.commit(rot_scale))
            }
            Report::Motion {
                translation,
                rotation,
            } => {
                self.pending = AxisSample {
                    translation,
                    rotation,
                };
                Some(self.commit(rot_scale))
            }
            Report::Button { id: BUTTON_TOGGLE } => {
                self.grasp = !self.grasp;
                None
            }
            Report::Button { id: BUTTON_RESET } => {
                self.reset();
                self.reset_requested = true;
                self.enabled = false;
                None
            }
            Report::Button { .. } | Report::Unrecognized { .. } => None,
        }
    }

    fn commit(&mut self, rot_scale: f64) -> [f64; 6] {
        self.axes = self.pending;
        let [roll, pitch, yaw] = self.axes.rotation.map(|v| v * rot_scale);
        let delta = rotation::incremental(roll, pitch, yaw);
        self.absolute_rotation =
            rotation::orthonormalize(&rotation::mul(&self.absolute_rotation, &delta));
        self.axes.control()
    }

    fn frame(&self, profile: &DeviceProfile) -> ControlFrame {
        let pos_scale = CONTROL_SCALE * profile.pos_sensitivity;
        let rot_scale = CONTROL_SCALE * profile.rot_sensitivity;
        ControlFrame {
            dpos: self.axes.translation.map(|v| v * pos_scale),
            rotation: self.absolute_rotation,
            raw_drotation: self.axes.rotation.map(|v| v * rot_scale),
            grasp: self.grasp,
            reset_requested: self.reset_requested,
        }
    }
}

#[derive(Default)]
struct Counters {
    read: AtomicU64,
    applied: AtomicU64,
    ignored: AtomicU64,
    unrecognized: AtomicU64,
    malformed: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Release);
    }

    fn snapshot(&self) -> ReportStats {
        ReportStats {
            read: self.read.load(Ordering::Acquire),
            applied: self.applied.load(Ordering::Acquire),
            ignored: self.ignored.load(Ordering::Acquire),
            unrecognized: self.unrecognized.load(Ordering::Acquire),
            malformed: self.malformed.load(Ordering::Acquire),
        }
    }
}

/// State shared between the controller handle and its reader thread.
struct Shared {
    state: Mutex<ControllerState>,
    stop_flag: AtomicBool,
    stopped: AtomicBool,
    fault: Mutex<Option<String>>,
    counters: Counters,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn fault(&self) -> Option<String> {
        self.fault
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_fault(&self, message: String) {
        *self.fault.lock().unwrap_or_else(PoisonError::into_inner) = Some(message);
    }
}

struct Worker {
    thread: JoinHandle<()>,
    /// Disconnects when the reader loop returns (or unwinds).
    exited: Receiver<()>,
}

/// An open SpaceMouse session.
///
/// A background thread reads reports and folds them into the controller
/// state; `snapshot()` copies that state out at the caller's own cadence.
/// All methods take `&self`, so the handle can be shared behind an `Arc`.
pub struct Controller {
    profile: DeviceProfile,
    description: DeviceDescription,
    shared: Arc<Shared>,
    worker: Mutex<Option<Worker>>,
}

impl Controller {
    /// Open the HID device named by `profile` and start reading.
    pub fn open(profile: DeviceProfile) -> Result<Controller> {
        let transport = HidTransport::open(profile.vendor_id, profile.product_id)?;
        Self::with_transport(profile, transport)
    }

    /// Open a built-in profile by name, with `SPACEMOUSE_*` environment overrides.
    pub fn open_by_name(name: &str) -> Result<Controller> {
        Self::open(DeviceProfile::by_name(name)?.with_env_overrides())
    }

    /// Start a session over an already-open transport.
    pub fn with_transport<T: Transport>(
        profile: DeviceProfile,
        transport: T,
    ) -> Result<Controller> {
        let description = transport.describe();
        log::info!(
            "Opened {}: manufacturer='{}' product='{}' (VID={:04X} PID={:04X} layout={:?})",
            profile.name,
            description.manufacturer,
            description.product,
            profile.vendor_id,
            profile.product_id,
            profile.layout
        );
        if profile.verbose {
            log::info!("{}", controls_help());
        }

        let shared = Arc::new(Shared {
            state: Mutex::new(ControllerState::new()),
            stop_flag: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
            fault: Mutex::new(None),
            counters: Counters::default(),
        });
        let (exit_tx, exit_rx) = crossbeam_channel::bounded(0);

        let thread_shared = shared.clone();
        let thread_profile = profile.clone();
        let thread = std::thread::Builder::new()
            .name("spacemouse-reader".into())
            .spawn(move || {
                reader_loop(exit_tx, transport, thread_profile, thread_shared);
            })
            .map_err(|e| SpaceMouseError::ThreadSpawn(e.to_string()))?;

        Ok(Controller {
            profile,
            description,
            shared,
            worker: Mutex::new(Some(Worker {
                thread,
                exited: exit_rx,
            })),
        })
    }

    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }

    /// Manufacturer/product strings read when the device was opened.
    pub fn description(&self) -> &DeviceDescription {
        &self.description
    }

    /// `Stopped` once `close()` has finished or the reader died on a transport error.
    pub fn lifecycle(&self) -> Lifecycle {
        if self.shared.stopped.load(Ordering::Acquire) {
            Lifecycle::Stopped
        } else if self.shared.stop_flag.load(Ordering::Relaxed) {
            Lifecycle::Stopping
        } else {
            Lifecycle::Running
        }
    }

    /// True while the reader thread is alive and has not faulted.
    pub fn is_running(&self) -> bool {
        self.lifecycle() == Lifecycle::Running && self.shared.fault().is_none()
    }

    pub fn stats(&self) -> ReportStats {
        self.shared.counters.snapshot()
    }

    /// Copy out the most recently committed state.
    ///
    /// Fails with `Closed` once `close()` has been called, and with
    /// `TransportFault` if the reader thread died on a transport error.
    pub fn snapshot(&self) -> Result<ControlFrame> {
        self.ensure_open()?;
        if let Some(fault) = self.shared.fault() {
            return Err(SpaceMouseError::TransportFault(fault));
        }
        Ok(self.shared.lock().frame(&self.profile))
    }

    /// Unscaled `[x, y, z, roll, pitch, yaw]` of the last committed sample, in device counts.
    pub fn control(&self) -> Result<[f64; 6]> {
        self.ensure_open()?;
        if let Some(fault) = self.shared.fault() {
            return Err(SpaceMouseError::TransportFault(fault));
        }
        Ok(self.shared.lock().axes.control())
    }

    /// Reset orientation, axes and grasp, clear the reset request and re-enable input.
    pub fn rearm(&self) -> Result<()> {
        self.ensure_open()?;
        self.shared.lock().rearm();
        log::debug!("{} re-armed", self.profile.name);
        Ok(())
    }

    /// Stop the reader thread and release the device.
    ///
    /// Waits at most one read timeout plus `CLOSE_GRACE`; if the reader has
    /// not exited by then it is detached. A second call returns `AlreadyClosed`.
    pub fn close(&self) -> Result<()> {
        let worker = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(SpaceMouseError::AlreadyClosed)?;

        self.shared.stop_flag.store(true, Ordering::Relaxed);

        let wait = self.profile.read_timeout + CLOSE_GRACE;
        match worker.exited.recv_timeout(wait) {
            Err(RecvTimeoutError::Timeout) => {
                log::warn!(
                    "{} reader did not stop within {:?}, detaching",
                    self.profile.name,
                    wait
                );
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if worker.thread.join().is_err() {
                    log::warn!("{} reader thread panicked", self.profile.name);
                }
            }
        }

        self.shared.stopped.store(true, Ordering::Release);
        log::info!("Closed {}", self.profile.name);
        Ok(())
    }

    fn ensure_open(&self) -> Result<()> {
        if self.shared.stop_flag.load(Ordering::Relaxed) {
            return Err(SpaceMouseError::Closed);
        }
        Ok(())
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

/// Reads reports until the stop flag is set or the transport fails.
///
/// Owns the transport; it is dropped (and the device released) on every exit
/// path. Parameters drop in reverse order, so `_exited` goes last and its
/// disconnect tells `close()` the device is already released.
fn reader_loop<T: Transport>(
    _exited: Sender<()>,
    mut transport: T,
    profile: DeviceProfile,
    shared: Arc<Shared>,
) {
    let mut buf = vec![0u8; profile.report_length];
    let rot_scale = CONTROL_SCALE * profile.rot_sensitivity;
    let counters = &shared.counters;

    log::info!("{} reader started", profile.name);

    loop {
        if shared.stop_flag.load(Ordering::Relaxed) {
            log::info!("{} reader stopping (stop flag set)", profile.name);
            break;
        }

        let len = match transport.read(&mut buf, profile.read_timeout) {
            Ok(Some(n)) => n,
            Ok(None) => continue,
            Err(e) => {
                log::warn!("{} reader stopping: {}", profile.name, e);
                shared.set_fault(e.to_string());
                shared.stopped.store(true, Ordering::Release);
                break;
            }
        };
        Counters::bump(&counters.read);
        let data = &buf[..len.min(buf.len())];

        let (decoded, committed, grasp) = {
            let mut state = shared.lock();
            if !state.enabled {
                drop(state);
                Counters::bump(&counters.ignored);
                continue;
            }
            match protocol::decode(data, &profile) {
                Ok(report) => {
                    let committed = state.apply(report, rot_scale);
                    (Ok(report), committed, state.grasp)
                }
                Err(e) => (Err(e), None, state.grasp),
            }
        };

        if profile.verbose {
            log::info!("Raw HID data: {:?}", data);
        }

        match decoded {
            Ok(Report::Unrecognized { tag }) => {
                log::debug!("Ignoring report with unknown tag 0x{:02x}", tag);
                Counters::bump(&counters.unrecognized);
            }
            Ok(report) => {
                if profile.verbose {
                    if let Some(control) = committed {
                        log::info!("Control values: {:?}", control);
                    }
                    match report {
                        Report::Button { id: BUTTON_TOGGLE } => log::info!(
                            "Gripper toggled to: {}",
                            if grasp { "closed" } else { "opened" }
                        ),
                        Report::Button { id: BUTTON_RESET } => {
                            log::info!("Reset requested, input disabled until re-armed")
                        }
                        _ => {}
                    }
                }
                Counters::bump(&counters.applied);
            }
            Err(e) => {
                log::warn!("Dropping report: {}", e);
                Counters::bump(&counters.malformed);
            }
        }
    }
}

/// Control legend for the operator.
pub fn controls_help() -> String {
    let rows = [
        ("Control", "Command"),
        ("Right button", "reset simulation"),
        ("Left button", "toggle gripper open/close"),
        ("Move mouse laterally", "move arm horizontally in x-y plane"),
        ("Move mouse vertically", "move arm vertically"),
        ("Twist mouse about an axis", "rotate arm about a corresponding axis"),
    ];
    let mut out = String::from("\n");
    for (control, command) in rows {
        out.push_str(&format!("{:<30}\t{}\n", control, command));
    }
    out
}
