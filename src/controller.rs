use crate::{
    hardware::traits::{WeightDisplay, WeightLink, WeightSensor},
    measurement::{measure, units_to_kg},
    protocol::encode_weight,
    state::{ConnectionTracker, LinkTransition},
    system::{
        config::{CycleTiming, ScaleConfig},
        events::{LinkEventChannel, UserCommand, UserCommandChannel},
    },
    types::{ConnectionState, DeviceError, Measurement, Screen},
};
use embassy_time::Timer;
use log::{debug, info, warn};
use std::sync::Arc;

/// What one pass through the device cycle did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CycleOutcome {
    /// Nothing above the detection threshold.
    Idle,
    /// A sensor failure cut the iteration short.
    Skipped,
    Measured {
        measurement: Measurement,
        notified: bool,
    },
}

/// The weighing loop: detect a load, average it, show it, publish it.
pub struct ScaleController<S, D, L> {
    config: ScaleConfig,
    timing: CycleTiming,

    sensor: S,
    display: D,
    link: L,

    connection: ConnectionTracker,
    link_events: Arc<LinkEventChannel>,
    user_commands: Arc<UserCommandChannel>,

    notifications_sent: u32,
}

impl<S, D, L> ScaleController<S, D, L>
where
    S: WeightSensor,
    D: WeightDisplay,
    L: WeightLink,
{
    pub fn new(
        config: ScaleConfig,
        sensor: S,
        display: D,
        link: L,
        link_events: Arc<LinkEventChannel>,
        user_commands: Arc<UserCommandChannel>,
    ) -> Result<Self, DeviceError> {
        config.validate()?;
        let timing = config.cycle_timing();

        Ok(Self {
            config,
            timing,
            sensor,
            display,
            link,
            connection: ConnectionTracker::new(),
            link_events,
            user_commands,
            notifications_sent: 0,
        })
    }

    /// Apply the calibration factor and zero the baseline.
    pub fn calibrate(&mut self) -> Result<(), DeviceError> {
        info!(
            "Calibrating load cell (factor {}, {} tare samples)",
            self.config.calibration_factor, self.config.tare_samples
        );
        self.show(&Screen::Calibrating);
        self.sensor
            .set_calibration_factor(self.config.calibration_factor);
        self.sensor.tare(self.config.tare_samples)
    }

    pub async fn run(&mut self) -> ! {
        info!("Starting device cycle");
        self.show(&Screen::Idle);

        loop {
            self.run_cycle().await;
        }
    }

    pub async fn run_cycle(&mut self) -> CycleOutcome {
        self.handle_user_commands();
        self.handle_link_events().await;

        let weight_kg = match self.read_instant_kg() {
            Ok(weight_kg) => weight_kg,
            Err(e) => return self.skip(e).await,
        };

        if !self.above_threshold(weight_kg) {
            self.show(&Screen::Idle);
            Timer::after(self.timing.idle_poll).await;
            return CycleOutcome::Idle;
        }

        // Let the load stop swinging before committing to a measurement
        self.show(&Screen::Waiting);
        Timer::after(self.timing.settle).await;
        let settled_kg = match self.read_instant_kg() {
            Ok(weight_kg) => weight_kg,
            Err(e) => return self.skip(e).await,
        };
        if !self.above_threshold(settled_kg) {
            debug!("Load gone after settling ({:.2}Kg)", settled_kg);
            self.show(&Screen::Idle);
            return CycleOutcome::Idle;
        }

        self.show(&Screen::Calculating);
        let measurement = match measure(&mut self.sensor, self.config.samples_per_measurement) {
            Ok(measurement) => measurement,
            Err(e) => return self.skip(e).await,
        };

        self.show(&Screen::Result {
            weight_kg: measurement.weight_kg,
        });

        // Link state at the moment the measurement completes decides the notify
        self.handle_link_events().await;
        let notified = self.publish(&measurement).await;

        Timer::after(self.timing.result_hold).await;
        self.show(&Screen::Idle);

        CycleOutcome::Measured {
            measurement,
            notified,
        }
    }

    fn handle_user_commands(&mut self) {
        while let Ok(command) = self.user_commands.try_receive() {
            match command {
                UserCommand::Tare => {
                    info!("Tare requested");
                    if let Err(e) = self.calibrate() {
                        warn!("Tare failed: {}", e);
                    }
                }
            }
        }
    }

    async fn handle_link_events(&mut self) {
        while let Ok(event) = self.link_events.try_receive() {
            match self.connection.apply(event) {
                Some(LinkTransition::Disconnected) => {
                    // Give the stack time to settle before advertising again
                    Timer::after(self.timing.readvertise_delay).await;
                    match self.link.restart_advertising() {
                        Ok(()) => info!("Start advertising"),
                        Err(e) => warn!("{}", e),
                    }
                }
                Some(LinkTransition::Connected) => {
                    info!("Client connected, weights will be notified");
                }
                None => {}
            }
        }
    }

    async fn publish(&mut self, measurement: &Measurement) -> bool {
        if !self.connection.is_connected() {
            debug!("No client connected, skipping notify");
            return false;
        }

        let payload = match encode_weight(measurement.weight_kg) {
            Some(payload) => payload,
            None => {
                warn!("Weight {} does not fit the payload", measurement.weight_kg);
                return false;
            }
        };

        let sent = match self.link.notify(payload.as_bytes()) {
            Ok(()) => {
                self.notifications_sent += 1;
                info!("Notified weight {}Kg", payload);
                true
            }
            Err(e) => {
                warn!("{}", e);
                false
            }
        };

        // Keep back-to-back notifications from piling up in the BLE stack
        Timer::after(self.timing.notify_gap).await;
        sent
    }

    fn read_instant_kg(&mut self) -> Result<f32, DeviceError> {
        let weight_kg = units_to_kg(self.sensor.read_units()?);
        debug!("Instant weight {:.2}Kg", weight_kg);
        Ok(weight_kg)
    }

    fn above_threshold(&self, weight_kg: f32) -> bool {
        weight_kg > self.config.detection_threshold_kg
    }

    async fn skip(&mut self, error: DeviceError) -> CycleOutcome {
        warn!("{}", error);
        self.show(&Screen::Idle);
        Timer::after(self.timing.idle_poll).await;
        CycleOutcome::Skipped
    }

    fn show(&mut self, screen: &Screen) {
        if let Err(e) = self.display.show(screen) {
            warn!("{}", e);
        }
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    pub fn notifications_sent(&self) -> u32 {
        self.notifications_sent
    }

    pub fn config(&self) -> &ScaleConfig {
        &self.config
    }

    pub fn timing(&self) -> CycleTiming {
        self.timing
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn link(&self) -> &L {
        &self.link
    }
}
