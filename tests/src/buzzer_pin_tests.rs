//! GPIO buzzer driven through embedded-hal-mock pin expectations

use clock_core::test_utils::scenarios;
use clock_core::*;
use embedded_hal_mock::eh1::pin::{Mock as PinMock, State as PinState, Transaction as PinTransaction};

#[test]
fn test_play_toggles_and_stop_drives_low() {
    let expectations = [
        PinTransaction::set(PinState::High),
        PinTransaction::set(PinState::Low),
        PinTransaction::set(PinState::High),
        PinTransaction::set(PinState::Low),
    ];
    let pin = PinMock::new(&expectations);
    let mut buzzer = EmbeddedHalBuzzer::new(pin, false);

    buzzer.play().unwrap();
    assert!(buzzer.is_sounding());
    buzzer.play().unwrap();
    assert!(!buzzer.is_sounding());
    buzzer.play().unwrap();
    buzzer.stop().unwrap();
    assert!(!buzzer.is_sounding());

    buzzer.release().done();
}

#[test]
fn test_inverted_pin_levels() {
    let expectations = [
        PinTransaction::set(PinState::Low),
        PinTransaction::set(PinState::High),
    ];
    let pin = PinMock::new(&expectations);
    let mut buzzer = EmbeddedHalBuzzer::new(pin, true);

    buzzer.play().unwrap();
    buzzer.stop().unwrap();

    buzzer.release().done();
}

#[test]
fn test_full_ring_on_gpio() {
    // 60 toggles starting high, then the final stop
    let mut expectations: Vec<PinTransaction> = (0..60)
        .map(|i| PinTransaction::set(if i % 2 == 0 { PinState::High } else { PinState::Low }))
        .collect();
    expectations.push(PinTransaction::set(PinState::Low));

    let pin = PinMock::new(&expectations);
    let mut buzzer = EmbeddedHalBuzzer::new(pin, false);
    let mut clock = scenarios::wake_up();
    let mut display = NullDisplay;

    for _ in 0..61 {
        clock.on_tick(&mut display, &mut buzzer).unwrap();
    }
    // Back in CLOCK the pin sees no further traffic
    for _ in 0..10 {
        clock.on_tick(&mut display, &mut buzzer).unwrap();
    }

    assert_eq!(clock.mode(), Mode::Clock);
    buzzer.release().done();
}

#[test]
fn test_dismiss_silences_pin() {
    let expectations = [
        PinTransaction::set(PinState::High),
        PinTransaction::set(PinState::Low),
        PinTransaction::set(PinState::High),
        PinTransaction::set(PinState::Low),
    ];
    let pin = PinMock::new(&expectations);
    let mut buzzer = EmbeddedHalBuzzer::new(pin, false);
    let mut clock = scenarios::wake_up();
    let mut display = NullDisplay;

    for _ in 0..4 {
        clock.on_tick(&mut display, &mut buzzer).unwrap();
    }
    clock.on_button(Button::Ok, &mut display, &mut buzzer).unwrap();

    assert_eq!(clock.mode(), Mode::Clock);
    buzzer.release().done();
}
