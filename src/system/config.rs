//! Tunable parameters for the weighing cycle

use crate::protocol::DEVICE_NAME;
use crate::types::DeviceError;
use embassy_time::Duration;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CALIBRATION_FACTOR: f32 = 11.2;
pub const DEFAULT_DETECTION_THRESHOLD_KG: f32 = 0.40;
pub const DEFAULT_SAMPLES_PER_MEASUREMENT: usize = 70;
pub const DEFAULT_TARE_SAMPLES: usize = 10;

/// Delays between the steps of one cycle, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    pub settle_ms: u64,
    pub notify_gap_ms: u64,
    pub readvertise_delay_ms: u64,
    pub result_hold_ms: u64,
    pub idle_poll_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            settle_ms: 1000,
            notify_gap_ms: 10,
            readvertise_delay_ms: 500,
            result_hold_ms: 5000,
            idle_poll_ms: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleConfig {
    pub device_name: String,
    pub calibration_factor: f32,
    pub detection_threshold_kg: f32,
    pub samples_per_measurement: usize,
    pub tare_samples: usize,
    pub timing: TimingConfig,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            device_name: DEVICE_NAME.to_string(),
            calibration_factor: DEFAULT_CALIBRATION_FACTOR,
            detection_threshold_kg: DEFAULT_DETECTION_THRESHOLD_KG,
            samples_per_measurement: DEFAULT_SAMPLES_PER_MEASUREMENT,
            tare_samples: DEFAULT_TARE_SAMPLES,
            timing: TimingConfig::default(),
        }
    }
}

impl ScaleConfig {
    pub fn from_json(json: &str) -> Result<Self, DeviceError> {
        let config: ScaleConfig = serde_json::from_str(json)
            .map_err(|e| DeviceError::Config(format!("Invalid config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, DeviceError> {
        serde_json::to_string(self)
            .map_err(|e| DeviceError::Config(format!("Config serialization failed: {}", e)))
    }

    pub fn validate(&self) -> Result<(), DeviceError> {
        if self.device_name.is_empty() {
            return Err(DeviceError::Config("device name is empty".to_string()));
        }
        if self.samples_per_measurement == 0 {
            return Err(DeviceError::Config(
                "samples_per_measurement must be at least 1".to_string(),
            ));
        }
        if !self.calibration_factor.is_finite() || self.calibration_factor == 0.0 {
            return Err(DeviceError::Config(format!(
                "calibration_factor must be finite and non-zero, got {}",
                self.calibration_factor
            )));
        }
        if !self.detection_threshold_kg.is_finite() || self.detection_threshold_kg < 0.0 {
            return Err(DeviceError::Config(format!(
                "detection_threshold_kg must be finite and non-negative, got {}",
                self.detection_threshold_kg
            )));
        }
        Ok(())
    }

    pub fn cycle_timing(&self) -> CycleTiming {
        CycleTiming::from(&self.timing)
    }
}

/// `TimingConfig` resolved to embassy durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleTiming {
    pub settle: Duration,
    pub notify_gap: Duration,
    pub readvertise_delay: Duration,
    pub result_hold: Duration,
    pub idle_poll: Duration,
}

impl From<&TimingConfig> for CycleTiming {
    fn from(timing: &TimingConfig) -> Self {
        Self {
            settle: Duration::from_millis(timing.settle_ms),
            notify_gap: Duration::from_millis(timing.notify_gap_ms),
            readvertise_delay: Duration::from_millis(timing.readvertise_delay_ms),
            result_hold: Duration::from_millis(timing.result_hold_ms),
            idle_poll: Duration::from_millis(timing.idle_poll_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_device() {
        let config = ScaleConfig::default();
        assert_eq!(config.device_name, "CRANE_SCALE_DEVICE");
        assert_eq!(config.samples_per_measurement, 70);
        assert!((config.calibration_factor - 11.2).abs() < f32::EPSILON);
        assert!((config.detection_threshold_kg - 0.40).abs() < f32::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cycle_timing_conversion() {
        let timing = ScaleConfig::default().cycle_timing();
        assert_eq!(timing.result_hold, Duration::from_millis(5000));
        assert_eq!(timing.notify_gap, Duration::from_millis(10));
        assert_eq!(timing.readvertise_delay, Duration::from_millis(500));
        assert_eq!(timing.settle, Duration::from_secs(1));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = ScaleConfig::default();
        config.samples_per_measurement = 0;
        assert!(config.validate().is_err());

        let mut config = ScaleConfig::default();
        config.calibration_factor = 0.0;
        assert!(config.validate().is_err());

        let mut config = ScaleConfig::default();
        config.detection_threshold_kg = f32::NAN;
        assert!(config.validate().is_err());

        let mut config = ScaleConfig::default();
        config.detection_threshold_kg = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_json_override() {
        let json = ScaleConfig::default().to_json().unwrap();
        let patched = json.replace("\"samples_per_measurement\":70", "\"samples_per_measurement\":20");
        let config = ScaleConfig::from_json(&patched).unwrap();
        assert_eq!(config.samples_per_measurement, 20);

        let broken = json.replace("\"samples_per_measurement\":70", "\"samples_per_measurement\":0");
        assert!(ScaleConfig::from_json(&broken).is_err());
        assert!(ScaleConfig::from_json("{not json").is_err());
    }
}
