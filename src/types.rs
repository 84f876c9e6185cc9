/// BLE link presence as seen by the device cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    Connected,
    #[default]
    Disconnected,
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Connected => "Connected",
            ConnectionState::Disconnected => "Disconnected",
        }
    }
}

/// One averaged weight computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub weight_kg: f32,
    pub samples: usize,
}

/// What the screen shows. Each variant maps to one full-frame render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Screen {
    Calibrating,
    Idle,
    Waiting,
    Calculating,
    Result { weight_kg: f32 },
}

/// Calibrated sensor units are grams.
pub const SENSOR_UNITS_PER_KG: f32 = 1000.0;

#[derive(Debug, Clone)]
pub enum DeviceError {
    Sensor(String),
    Display(String),
    Ble(String),
    Config(String),
}

impl std::fmt::Display for DeviceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceError::Sensor(msg) => write!(f, "Sensor error: {}", msg),
            DeviceError::Display(msg) => write!(f, "Display error: {}", msg),
            DeviceError::Ble(msg) => write!(f, "BLE error: {}", msg),
            DeviceError::Config(msg) => write!(f, "Config error: {}", msg),
        }
    }
}

impl std::error::Error for DeviceError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_state_defaults_to_disconnected() {
        let state = ConnectionState::default();
        assert_eq!(state, ConnectionState::Disconnected);
        assert!(!state.is_connected());
        assert!(ConnectionState::Connected.is_connected());
    }

    #[test]
    fn test_device_error_display() {
        let err = DeviceError::Sensor("HX711 not ready".to_string());
        assert_eq!(err.to_string(), "Sensor error: HX711 not ready");
    }
}
