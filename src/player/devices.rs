//! Device bootstrap run once while the player is being constructed.
//!
//! Devices are selected by their position in the enumeration, not by a
//! stable id. An index past the end of the enumeration is a construction
//! error rather than a silent fallback.

use tracing::{debug, info};

use crate::engine::{DeviceInfo, InputDeviceHost, MediaEngine};
use crate::error::{DeviceKind, PlayerError};

fn select(devices: &[DeviceInfo], index: usize, kind: DeviceKind) -> Result<&DeviceInfo, PlayerError> {
    devices.get(index).ok_or(PlayerError::DeviceNotFound {
        kind,
        index,
        available: devices.len(),
    })
}

/// Enumerate the engine's outputs and bind the one at `index`.
pub(crate) fn bind_output<E: MediaEngine>(
    engine: &mut E,
    index: usize,
) -> Result<Vec<DeviceInfo>, PlayerError> {
    let devices = engine.output_devices()?;
    debug!(count = devices.len(), "enumerated output devices");
    let device = select(&devices, index, DeviceKind::Output)?;
    engine.bind_output_device(device)?;
    info!(index, name = %device.name, "bound output device");
    Ok(devices)
}

/// Enumerate the chat client's inputs and bind the one at `index`.
pub(crate) fn bind_input(
    host: &mut dyn InputDeviceHost,
    index: usize,
) -> Result<Vec<DeviceInfo>, PlayerError> {
    let devices = host.input_devices()?;
    debug!(count = devices.len(), "enumerated input devices");
    let device = select(&devices, index, DeviceKind::Input)?;
    host.bind_input_device(device)?;
    info!(index, name = %device.name, "bound input device");
    Ok(devices)
}
