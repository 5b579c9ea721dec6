//! TM1637 four-digit LED module as the clock's display
//!
//! `tm1637-embedded-hal` speaks the two-wire protocol; this side maps
//! digits, labels and the colon to segment bytes.

use clock_core::{Digit, DisplaySink, HalError, Label};
use embassy_time::Delay;
use tm1637_embedded_hal::blocking::TM1637;
use tm1637_embedded_hal::Brightness;

use crate::ch32v203_hardware::{DisplayClk, DisplayDio};

/// Segment patterns for 0-9, bit 0 = segment a
const DIGIT_SEGMENTS: [u8; 10] = [0x3F, 0x06, 0x5B, 0x4F, 0x66, 0x6D, 0x7D, 0x07, 0x7F, 0x6F];

/// Colon is wired to the dp segment of the second digit
const COLON_BIT: u8 = 0x80;

/// Settle time per clock edge
const BIT_DELAY_US: u32 = 10;

pub struct Tm1637Display {
    driver: TM1637<DisplayClk, DisplayDio, Delay>,
    colon: bool,
}

impl Tm1637Display {
    pub fn new(clk: DisplayClk, dio: DisplayDio, brightness: Brightness) -> Self {
        let driver = TM1637::builder(clk, dio, Delay)
            .brightness(brightness)
            .delay_us(BIT_DELAY_US)
            .build();
        Self { driver, colon: false }
    }

    /// Blank the module and switch it on at the configured brightness
    pub fn init(&mut self) -> Result<(), HalError> {
        self.driver.init().map_err(|_| HalError::DisplayError)
    }

    fn write(&mut self, mut segments: [u8; 4]) -> Result<(), HalError> {
        if self.colon {
            segments[1] |= COLON_BIT;
        }
        self.driver
            .write_segments_raw(0, &segments)
            .map_err(|_| HalError::DisplayError)
    }
}

/// Segment pattern for a display position
pub const fn encode(digit: Digit) -> u8 {
    match digit {
        Digit::Value(v) if v < 10 => DIGIT_SEGMENTS[v as usize],
        Digit::Value(_) | Digit::Blank => 0x00,
    }
}

/// Closest seven-segment spelling of a label
pub const fn encode_label(label: Label) -> [u8; 4] {
    match label {
        // S E t
        Label::Set => [0x6D, 0x79, 0x78, 0x00],
        // A L
        Label::Alarm => [0x77, 0x38, 0x00, 0x00],
        // O F F
        Label::Off => [0x3F, 0x71, 0x71, 0x00],
    }
}

impl DisplaySink for Tm1637Display {
    type Error = HalError;

    fn set_digits(&mut self, digits: [Digit; 4]) -> Result<(), Self::Error> {
        self.write(digits.map(encode))
    }

    // Latched until the next digit or text write
    fn set_colon(&mut self, on: bool) -> Result<(), Self::Error> {
        self.colon = on;
        Ok(())
    }

    fn set_text(&mut self, label: Label) -> Result<(), Self::Error> {
        self.write(encode_label(label))
    }
}
