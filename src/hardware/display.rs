//! SH1106 OLED screens for the crane scale
//! Using embedded-graphics for clean, efficient rendering

use crate::hardware::traits::WeightDisplay;
use crate::types::{DeviceError, Screen};
use embedded_graphics::{
    mono_font::{ascii::FONT_6X10, ascii::FONT_9X15, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Alignment, Baseline, Text, TextStyleBuilder},
};
use log::{debug, info};
use sh1106::Builder;

pub const DISPLAY_WIDTH: u32 = 128;
pub const DISPLAY_HEIGHT: u32 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSize {
    Small,
    Large,
}

/// One centered line of a screen.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenLine {
    pub text: String,
    pub size: TextSize,
    pub y: i32,
}

impl ScreenLine {
    fn small(text: impl Into<String>, y: i32) -> Self {
        Self { text: text.into(), size: TextSize::Small, y }
    }

    fn large(text: impl Into<String>, y: i32) -> Self {
        Self { text: text.into(), size: TextSize::Large, y }
    }
}

/// Text content of each screen. The idle prompts stay on every screen
/// except calibration; the bottom line carries the phase.
pub fn screen_lines(screen: &Screen) -> Vec<ScreenLine> {
    let mut lines = Vec::new();

    if let Screen::Calibrating = screen {
        lines.push(ScreenLine::small("Calibration sensor...", 32));
        return lines;
    }

    lines.push(ScreenLine::small("Weight unit on PortB", 6));
    lines.push(ScreenLine::small("(G33,G32)", 17));
    lines.push(ScreenLine::small("Btn A: calibration", 28));

    match screen {
        Screen::Idle => lines.push(ScreenLine::small(">>Input Weight<<", 50)),
        Screen::Waiting => lines.push(ScreenLine::large("Wait...", 50)),
        Screen::Calculating => lines.push(ScreenLine::large("Calculating..", 50)),
        Screen::Result { weight_kg } => lines.push(ScreenLine::large(result_text(*weight_kg), 50)),
        Screen::Calibrating => {}
    }

    lines
}

// Large font glyphs are 9px wide
const LARGE_LINE_CHARS: usize = (DISPLAY_WIDTH / 9) as usize;

/// "Weight X.XXKg", dropping the prefix once the value gets too wide to fit.
fn result_text(weight_kg: f32) -> String {
    let text = format!("Weight {:.2}Kg", weight_kg);
    if text.len() <= LARGE_LINE_CHARS {
        text
    } else {
        format!("{:.2}Kg", weight_kg)
    }
}

/// Draw a screen onto any monochrome target. The caller clears and flushes.
pub fn render_screen<D>(target: &mut D, screen: &Screen) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let small_style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
    let large_style = MonoTextStyle::new(&FONT_9X15, BinaryColor::On);
    let centered = TextStyleBuilder::new()
        .alignment(Alignment::Center)
        .baseline(Baseline::Middle)
        .build();
    let center_x = (DISPLAY_WIDTH / 2) as i32;

    for line in screen_lines(screen) {
        let character_style = match line.size {
            TextSize::Small => small_style,
            TextSize::Large => large_style,
        };
        Text::with_text_style(
            &line.text,
            Point::new(center_x, line.y),
            character_style,
            centered,
        )
        .draw(target)?;
    }

    Ok(())
}

pub struct DisplayController<I2C>
where
    I2C: embedded_hal::blocking::i2c::Write + embedded_hal::blocking::i2c::WriteRead,
{
    display: sh1106::mode::GraphicsMode<sh1106::interface::I2cInterface<I2C>>,
}

impl<I2C> DisplayController<I2C>
where
    I2C: embedded_hal::blocking::i2c::Write + embedded_hal::blocking::i2c::WriteRead,
    <I2C as embedded_hal::blocking::i2c::Write>::Error: std::fmt::Debug,
    <I2C as embedded_hal::blocking::i2c::WriteRead>::Error: std::fmt::Debug,
{
    pub fn new(i2c: I2C) -> Result<Self, DeviceError> {
        info!("Initializing SH1106 OLED display");

        let mut display: sh1106::mode::GraphicsMode<_> = Builder::new().connect_i2c(i2c).into();

        display
            .init()
            .map_err(|e| DeviceError::Display(format!("Display init failed: {:?}", e)))?;
        display.clear();
        display
            .flush()
            .map_err(|e| DeviceError::Display(format!("Display flush failed: {:?}", e)))?;

        info!("SH1106 display initialized");

        Ok(Self { display })
    }
}

impl<I2C> WeightDisplay for DisplayController<I2C>
where
    I2C: embedded_hal::blocking::i2c::Write + embedded_hal::blocking::i2c::WriteRead,
    <I2C as embedded_hal::blocking::i2c::Write>::Error: std::fmt::Debug,
    <I2C as embedded_hal::blocking::i2c::WriteRead>::Error: std::fmt::Debug,
{
    fn show(&mut self, screen: &Screen) -> Result<(), DeviceError> {
        debug!("Rendering screen {:?}", screen);

        // Drawing happens in the off-screen buffer; flush pushes the whole frame
        self.display.clear();
        render_screen(&mut self.display, screen)
            .map_err(|e| DeviceError::Display(format!("Display draw error: {:?}", e)))?;
        self.display
            .flush()
            .map_err(|e| DeviceError::Display(format!("Display flush failed: {:?}", e)))?;

        Ok(())
    }
}

// Helper function to create display controller from ESP32 I2C pins
#[cfg(target_os = "espidf")]
pub fn create_display_controller(
    i2c: impl esp_idf_svc::hal::peripheral::Peripheral<P = impl esp_idf_svc::hal::i2c::I2c>
        + 'static,
    sda: impl esp_idf_svc::hal::peripheral::Peripheral<
            P = impl esp_idf_svc::hal::gpio::InputPin + esp_idf_svc::hal::gpio::OutputPin,
        > + 'static,
    scl: impl esp_idf_svc::hal::peripheral::Peripheral<
            P = impl esp_idf_svc::hal::gpio::InputPin + esp_idf_svc::hal::gpio::OutputPin,
        > + 'static,
) -> Result<DisplayController<esp_idf_svc::hal::i2c::I2cDriver<'static>>, DeviceError> {
    use esp_idf_svc::hal::{
        i2c::{I2cConfig, I2cDriver},
        prelude::*,
    };

    info!("Setting up I2C for SH1106 display");

    let config = I2cConfig::new().baudrate(400.kHz().into());
    let i2c = I2cDriver::new(i2c, sda, scl, &config)
        .map_err(|e| DeviceError::Display(format!("I2C init failed: {:?}", e)))?;

    DisplayController::new(i2c)
}
