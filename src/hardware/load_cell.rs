//! HX711 load cell on two GPIOs, driven by the `loadcell` crate

use crate::hardware::traits::WeightSensor;
use crate::measurement::calibrated_units;
use crate::types::DeviceError;
use esp_idf_svc::hal::{
    delay::{Ets, FreeRtos},
    gpio::{AnyInputPin, AnyOutputPin, Input, Output, PinDriver},
};
use loadcell::{hx711::HX711, LoadCell};
use embassy_time::{Duration, Instant};
use log::{debug, info};

// HX711 samples at 10 Hz on the default board wiring
const READY_TIMEOUT: Duration = Duration::from_millis(500);

type Hx711Driver =
    HX711<PinDriver<'static, AnyOutputPin, Output>, PinDriver<'static, AnyInputPin, Input>, Ets>;

pub struct LoadCellSensor {
    hx711: Hx711Driver,
    calibration_factor: f32,
}

impl LoadCellSensor {
    pub fn new(
        sck: AnyOutputPin,
        dout: AnyInputPin,
        calibration_factor: f32,
    ) -> Result<Self, DeviceError> {
        info!("Initializing HX711 load cell");

        let sck = PinDriver::output(sck)
            .map_err(|e| DeviceError::Sensor(format!("Failed to configure SCK: {:?}", e)))?;
        let dout = PinDriver::input(dout)
            .map_err(|e| DeviceError::Sensor(format!("Failed to configure DOUT: {:?}", e)))?;

        // Driver scale stays at its identity default; calibration is applied here
        let hx711 = HX711::new(sck, dout, Ets);

        Ok(Self {
            hx711,
            calibration_factor,
        })
    }

    fn wait_ready(&mut self) -> Result<(), DeviceError> {
        let start = Instant::now();
        while !self.hx711.is_ready() {
            if start.elapsed() > READY_TIMEOUT {
                return Err(DeviceError::Sensor(format!(
                    "HX711 not ready after {}ms",
                    READY_TIMEOUT.as_millis()
                )));
            }
            FreeRtos::delay_ms(1);
        }
        Ok(())
    }
}

impl WeightSensor for LoadCellSensor {
    fn read_units(&mut self) -> Result<f32, DeviceError> {
        self.wait_ready()?;
        let tared = self
            .hx711
            .read_scaled()
            .map_err(|_| DeviceError::Sensor("HX711 conversion not ready".to_string()))?;
        Ok(calibrated_units(tared, self.calibration_factor))
    }

    fn tare(&mut self, samples: usize) -> Result<(), DeviceError> {
        info!("Taring load cell over {} samples", samples);
        self.wait_ready()?;
        self.hx711.tare(samples);
        debug!("Tare complete");
        Ok(())
    }

    fn set_calibration_factor(&mut self, factor: f32) {
        info!("Calibration factor set to {}", factor);
        self.calibration_factor = factor;
    }
}
