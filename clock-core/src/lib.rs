#![cfg_attr(not(any(test, feature = "std")), no_std)]

//! # Clock Core
//!
//! Control core of a four-digit alarm clock for embedded systems.
//! Keeps time on a 500 ms tick, drives the SET / AL menus and the blink
//! patterns, and rings the alarm once per matching minute.

pub mod types;
pub mod controller;
pub mod fsm;
pub mod render;
pub mod hal;

#[cfg(feature = "test-utils")]
pub mod test_utils;


pub use types::*;
pub use controller::*;
pub use fsm::*;
pub use render::*;
pub use hal::{Buzzer, DisplaySink, Duration, EmbeddedHalBuzzer, HalError, NullDisplay};

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration: midnight start, alarm 07:00 off, 500 ms tick
pub fn default_config() -> ClockConfig {
    ClockConfig::default()
}
