#![no_std]

//! Firmware library: CH32V203 board support and the embassy task wrapper

pub use embassy_executor::Spawner;
pub use embassy_time::Duration;

pub use clock_core::*;

pub use crate::ch32v203_hardware::*;
pub use crate::tasks::*;

pub mod tasks {
    use super::*;

    /// Clock task wrapper: embassy tasks cannot be generic, so this pins the
    /// board's display and buzzer types
    #[embassy_executor::task]
    pub async fn clock_task_wrapper(
        events: &'static EventQueue,
        display: ClockDisplay,
        buzzer: ClockBuzzer,
        config: ClockConfig,
    ) {
        #[cfg(feature = "defmt")]
        defmt::info!("Clock task started");
        clock_core::fsm::clock_task(events, display, buzzer, config).await;
    }
}

pub mod ch32v203_hardware;
pub mod tm1637;

// Time driver for embassy
pub mod time_driver;
