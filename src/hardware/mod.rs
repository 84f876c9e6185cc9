pub mod button;
pub mod display;
#[cfg(target_os = "espidf")]
pub mod load_cell;
pub mod traits;

pub use traits::*;
