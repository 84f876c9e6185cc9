use embedded_hal::digital::v2::InputPin;
use log::{info, warn};

/// Active-low push button sampled by polling.
pub struct TareButton<P: InputPin> {
    pin: P,
    was_pressed: bool,
}

impl<P> TareButton<P>
where
    P: InputPin,
    P::Error: std::fmt::Debug,
{
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            was_pressed: false,
        }
    }

    /// True exactly once per press, on the released to pressed edge.
    pub fn poll_pressed(&mut self) -> bool {
        let pressed = match self.pin.is_low() {
            Ok(level) => level,
            Err(e) => {
                warn!("Button read failed: {:?}", e);
                return false;
            }
        };

        let edge = pressed && !self.was_pressed;
        self.was_pressed = pressed;
        if edge {
            info!("Tare button pressed");
        }
        edge
    }
}
