//! Hardware seams used by the device cycle
//!
//! The controller only talks to the load cell, the screen and the BLE
//! server through these traits, so the cycle runs the same against the
//! real peripherals and against in-memory fakes.

use crate::types::{DeviceError, Screen};

/// Load cell with calibration already applied.
pub trait WeightSensor {
    /// One instantaneous reading in calibrated sensor units (grams).
    fn read_units(&mut self) -> Result<f32, DeviceError>;

    /// Zero the baseline using the given number of raw samples.
    fn tare(&mut self, samples: usize) -> Result<(), DeviceError>;

    fn set_calibration_factor(&mut self, factor: f32);
}

/// Full-frame screen output.
pub trait WeightDisplay {
    fn show(&mut self, screen: &Screen) -> Result<(), DeviceError>;
}

/// Device to client side of the BLE link.
pub trait WeightLink {
    /// Write the payload into the notify characteristic and notify subscribers.
    fn notify(&mut self, payload: &[u8]) -> Result<(), DeviceError>;

    fn restart_advertising(&mut self) -> Result<(), DeviceError>;
}
