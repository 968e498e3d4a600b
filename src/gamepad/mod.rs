//! # Virtual Gamepad Module
//!
//! Presents the mapped axes to the OS as a gamepad via Linux uinput.
//!
//! The device exposes one analog stick on ABS_RX/ABS_RY (the right-stick
//! convention of the original setup) plus a single gamepad button so udev
//! classifies the node as a joystick. Each [`StickSink::set_stick`] call
//! emits both axis events followed by the synthesized SYN_REPORT, which is
//! the per-cycle commit that makes the values take effect.
//!
//! The session loop talks to the [`StickSink`] trait rather than the uinput
//! device directly, so tests can substitute a recording mock.

use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
use evdev::{AbsInfo, AbsoluteAxisType, AttributeSet, EventType, InputEvent, Key, UinputAbsSetup};
use tracing::{debug, info};

use crate::error::{Result, TiltStickError};
use crate::mapping::MappedAxes;

/// Absolute-axis range advertised for the virtual stick.
const ABS_MIN: i32 = -32768;
const ABS_MAX: i32 = 32767;

/// Output seam for mapped axes.
///
/// The loop forwards one [`MappedAxes`] pair per streaming cycle; the
/// implementation commits both values atomically.
pub trait StickSink {
    /// Sets both stick axes and commits them.
    fn set_stick(&mut self, axes: MappedAxes) -> Result<()>;
}

/// Virtual gamepad backed by `/dev/uinput`.
pub struct VirtualGamepad {
    device: VirtualDevice,
}

impl std::fmt::Debug for VirtualGamepad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualGamepad").finish_non_exhaustive()
    }
}

impl VirtualGamepad {
    /// Creates the uinput device.
    ///
    /// # Arguments
    ///
    /// * `name` - Device name shown to applications (from config)
    ///
    /// # Errors
    ///
    /// [`TiltStickError::Gamepad`] if `/dev/uinput` cannot be opened or the
    /// device cannot be registered (usually a permissions problem). Fatal at
    /// startup. The kernel device is destroyed when the handle drops.
    pub fn create(name: &str) -> Result<Self> {
        let device = Self::build_device(name)
            .map_err(|e| TiltStickError::Gamepad(format!("Failed to create {}: {}", name, e)))?;

        info!("Virtual gamepad \"{}\" created", name);
        Ok(Self { device })
    }

    fn build_device(name: &str) -> std::io::Result<VirtualDevice> {
        let stick_axis = AbsInfo::new(0, ABS_MIN, ABS_MAX, 0, 0, 1);

        let mut buttons = AttributeSet::<Key>::new();
        buttons.insert(Key::BTN_SOUTH);

        VirtualDeviceBuilder::new()?
            .name(name)
            .with_absolute_axis(&UinputAbsSetup::new(AbsoluteAxisType::ABS_RX, stick_axis))?
            .with_absolute_axis(&UinputAbsSetup::new(AbsoluteAxisType::ABS_RY, stick_axis))?
            .with_keys(&buttons)?
            .build()
    }
}

impl StickSink for VirtualGamepad {
    fn set_stick(&mut self, axes: MappedAxes) -> Result<()> {
        let events = [
            InputEvent::new(
                EventType::ABSOLUTE,
                AbsoluteAxisType::ABS_RX.0,
                axes.x as i32,
            ),
            InputEvent::new(
                EventType::ABSOLUTE,
                AbsoluteAxisType::ABS_RY.0,
                axes.y as i32,
            ),
        ];

        // emit() appends the SYN_REPORT commit after the batch
        self.device
            .emit(&events)
            .map_err(|e| TiltStickError::Gamepad(format!("Failed to emit axes: {}", e)))?;

        debug!("Stick set to x={}, y={}", axes.x, axes.y);
        Ok(())
    }
}
