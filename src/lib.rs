#[cfg(target_os = "espidf")]
pub mod ble;
pub mod controller;
pub mod hardware;
pub mod measurement;
pub mod protocol;
pub mod state;
pub mod system;
pub mod types;

pub use controller::*;
pub use types::*;
