#![no_std]
#![no_main]

#[cfg(feature = "defmt")]
use defmt_rtt as _;

// RISC-V runtime
use riscv_rt as _;

#[cfg(feature = "probe")]
use panic_probe as _;
#[cfg(not(feature = "probe"))]
use panic_halt as _;

use embassy_executor::Spawner;
use embassy_time::Duration;

use alarm_clock_firmware::*;

/// Main firmware entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    #[cfg(feature = "defmt")]
    defmt::info!("Alarm clock firmware starting");

    let mut hal = Ch32v203ClockHal::new();
    if let Err(_e) = hal.initialize() {
        #[cfg(feature = "defmt")]
        defmt::error!("Hardware init failed: {:?}", _e);
    }

    let config = ClockConfig {
        alarm_enabled: ALARM_SWITCH.is_enabled(),
        ..default_config()
    };
    #[cfg(feature = "defmt")]
    defmt::info!(
        "Tick {} ms, ring {} ticks, alarm {:?}",
        config.tick_ms(),
        config.ring_ticks,
        config.alarm_time
    );

    let (display, buzzer) = hal.into_parts();
    spawner.must_spawn(clock_task_wrapper(&EVENTS, display, buzzer, config));

    #[cfg(feature = "defmt")]
    defmt::info!("Alarm clock ready");

    // Main supervision loop
    loop {
        embassy_time::Timer::after(Duration::from_secs(1)).await;
        #[cfg(feature = "defmt")]
        defmt::trace!("Heartbeat at {} s", embassy_time::Instant::now().as_secs());
    }
}

// riscv-rt sends every interrupt code past its core table here
#[export_name = "DefaultHandler"]
fn default_handler() {
    handle_interrupt();
}
