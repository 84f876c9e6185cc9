#[cfg(target_os = "espidf")]
mod firmware {
    use anyhow::{anyhow, Context};
    use crane_scale::ble::BleWeightServer;
    use crane_scale::controller::ScaleController;
    use crane_scale::hardware::{
        button::TareButton, display::create_display_controller, load_cell::LoadCellSensor,
    };
    use crane_scale::system::{
        config::ScaleConfig,
        events::{post_user_command, LinkEventChannel, UserCommand, UserCommandChannel},
    };
    use embassy_executor::Spawner;
    use embassy_time::{Duration, Timer};
    use esp_idf_svc::hal::gpio::{AnyInputPin, Input, InputPin, OutputPin, PinDriver};
    use esp_idf_svc::hal::prelude::Peripherals;
    use log::info;
    use std::sync::Arc;

    const BUTTON_POLL: Duration = Duration::from_millis(20);

    pub async fn run(spawner: Spawner) -> anyhow::Result<()> {
        let config = ScaleConfig::default();
        config.validate()?;
        info!("Config: {}", config.to_json()?);

        let peripherals = Peripherals::take().context("failed to take peripherals")?;

        let link_events = Arc::new(LinkEventChannel::new());
        let user_commands = Arc::new(UserCommandChannel::new());

        let ble = BleWeightServer::start(&config.device_name, Arc::clone(&link_events))
            .context("failed to start BLE server")?;

        let display = create_display_controller(
            peripherals.i2c0,
            peripherals.pins.gpio21,
            peripherals.pins.gpio22,
        )
        .context("failed to initialize display")?;

        // Weight unit on port B: DOUT on G33, SCK on G32
        let sensor = LoadCellSensor::new(
            peripherals.pins.gpio32.downgrade_output(),
            peripherals.pins.gpio33.downgrade_input(),
            config.calibration_factor,
        )
        .context("failed to initialize load cell")?;

        // Button A, externally pulled up
        let button_pin = PinDriver::input(peripherals.pins.gpio39.downgrade_input())
            .context("failed to configure tare button")?;
        spawner
            .spawn(button_task(TareButton::new(button_pin), Arc::clone(&user_commands)))
            .map_err(|_| anyhow!("failed to spawn button task"))?;

        let mut controller =
            ScaleController::new(config, sensor, display, ble, link_events, user_commands)?;
        controller.calibrate().context("initial tare failed")?;

        controller.run().await
    }

    #[embassy_executor::task]
    async fn button_task(
        mut button: TareButton<PinDriver<'static, AnyInputPin, Input>>,
        commands: Arc<UserCommandChannel>,
    ) {
        info!("Button task started");
        loop {
            if button.poll_pressed() {
                post_user_command(&commands, UserCommand::Tare);
            }
            Timer::after(BUTTON_POLL).await;
        }
    }
}

#[cfg(target_os = "espidf")]
#[embassy_executor::main]
async fn main(spawner: embassy_executor::Spawner) {
    // It is necessary to call this function once. Otherwise some patches to the runtime
    // implemented by esp-idf-sys might not link properly. See https://github.com/esp-rs/esp-idf-template/issues/71
    esp_idf_svc::sys::link_patches();

    // Bind the log crate to the ESP Logging facilities
    esp_idf_svc::log::EspLogger::initialize_default();

    log::info!("Starting crane scale");

    if let Err(e) = firmware::run(spawner).await {
        log::error!("Crane scale stopped: {:?}", e);
    }
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    eprintln!("crane-scale is firmware; build it with --target xtensa-esp32-espidf");
}
