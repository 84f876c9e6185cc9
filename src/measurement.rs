use crate::hardware::traits::WeightSensor;
use crate::types::{DeviceError, Measurement, SENSOR_UNITS_PER_KG};
use log::{debug, info};

/// Apply the calibration factor to a tared raw reading, giving grams.
///
/// A factor of 11.2 turns 1120 counts above the tare baseline into 100 g.
pub fn calibrated_units(tared_counts: f32, calibration_factor: f32) -> f32 {
    tared_counts / calibration_factor
}

/// Convert a calibrated sensor reading to kilograms.
pub fn units_to_kg(units: f32) -> f32 {
    units / SENSOR_UNITS_PER_KG
}

/// Negative, negative-zero and NaN results all report as zero.
pub fn clamp_weight(weight_kg: f32) -> f32 {
    if weight_kg > 0.0 {
        weight_kg
    } else {
        0.0
    }
}

/// Take `samples` consecutive readings with no delay between them and
/// average them.
pub fn measure<S: WeightSensor>(sensor: &mut S, samples: usize) -> Result<Measurement, DeviceError> {
    if samples == 0 {
        return Err(DeviceError::Config(
            "measurement needs at least one sample".to_string(),
        ));
    }

    let mut sum = 0.0f64;
    for i in 0..samples {
        let reading = sensor.read_units()?;
        debug!("Sample {}/{}: {:.2}", i + 1, samples, reading);
        sum += reading as f64;
    }

    let mean = (sum / samples as f64) as f32;
    let weight_kg = clamp_weight(units_to_kg(mean));
    info!(
        "Measured {:.2}Kg from {} samples (mean {:.2} units)",
        weight_kg, samples, mean
    );

    Ok(Measurement { weight_kg, samples })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    struct ScriptedSensor {
        readings: VecDeque<Result<f32, DeviceError>>,
        reads: usize,
    }

    impl ScriptedSensor {
        fn constant(value: f32, count: usize) -> Self {
            Self {
                readings: (0..count).map(|_| Ok(value)).collect(),
                reads: 0,
            }
        }
    }

    impl WeightSensor for ScriptedSensor {
        fn read_units(&mut self) -> Result<f32, DeviceError> {
            self.reads += 1;
            self.readings
                .pop_front()
                .unwrap_or_else(|| Err(DeviceError::Sensor("script exhausted".to_string())))
        }

        fn tare(&mut self, _samples: usize) -> Result<(), DeviceError> {
            Ok(())
        }

        fn set_calibration_factor(&mut self, _factor: f32) {}
    }

    #[test]
    fn test_calibrated_example() {
        // Raw 1120 counts at factor 11.2 is 100 g per reading
        let mut sensor = ScriptedSensor::constant(1120.0 / 11.2, 70);
        let measurement = measure(&mut sensor, 70).unwrap();
        assert_eq!(measurement.samples, 70);
        assert_eq!(sensor.reads, 70);
        assert!((measurement.weight_kg - 0.10).abs() < 1e-4);
    }

    #[test]
    fn test_calibration_factor_division() {
        assert!((calibrated_units(1120.0, 11.2) - 100.0).abs() < 1e-4);
        assert!((units_to_kg(calibrated_units(1120.0, 11.2)) - 0.10).abs() < 1e-6);
    }

    #[test]
    fn test_negative_mean_clamps_to_zero() {
        let mut sensor = ScriptedSensor::constant(-250.0, 70);
        let measurement = measure(&mut sensor, 70).unwrap();
        assert_eq!(measurement.weight_kg, 0.0);
        assert!(measurement.weight_kg.is_sign_positive());
    }

    #[test]
    fn test_average_of_mixed_readings() {
        let mut sensor = ScriptedSensor {
            readings: [900.0, 1100.0, 1000.0, 1000.0].into_iter().map(Ok).collect(),
            reads: 0,
        };
        let measurement = measure(&mut sensor, 4).unwrap();
        assert!((measurement.weight_kg - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_clamp_handles_negative_zero_and_nan() {
        assert!(clamp_weight(-0.0).is_sign_positive());
        assert_eq!(clamp_weight(f32::NAN), 0.0);
        assert_eq!(clamp_weight(-3.0), 0.0);
        assert_eq!(clamp_weight(2.5), 2.5);
    }

    #[test]
    fn test_sensor_failure_aborts_measurement() {
        let mut sensor = ScriptedSensor::constant(100.0, 3);
        assert!(matches!(
            measure(&mut sensor, 70),
            Err(DeviceError::Sensor(_))
        ));
        assert_eq!(sensor.reads, 4);
    }

    #[test]
    fn test_zero_samples_rejected() {
        let mut sensor = ScriptedSensor::constant(100.0, 1);
        assert!(measure(&mut sensor, 0).is_err());
        assert_eq!(sensor.reads, 0);
    }
}
