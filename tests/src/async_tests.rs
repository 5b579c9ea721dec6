//! Interrupt-style producers feeding the event queue from tokio tasks and threads

use std::sync::Arc;
use std::thread;

use clock_core::hal::mock::{MockBuzzer, MockDisplay};
use clock_core::test_utils::scenarios;
use clock_core::*;
use tokio::task::yield_now;

#[tokio::test]
async fn test_button_presses_from_another_task() {
    let events = Arc::new(EventQueue::new());
    let mut clock = scenarios::running_at(TimeValue::new(10, 0, 0).unwrap());
    let mut display = MockDisplay::new();
    let mut buzzer = MockBuzzer::new();

    let producer = {
        let events = Arc::clone(&events);
        tokio::spawn(async move {
            for button in [Button::Menu, Button::Ok, Button::Plus, Button::Plus, Button::Ok, Button::Plus, Button::Ok] {
                events.post_button(button).unwrap();
                yield_now().await;
            }
        })
    };

    let mut handled = 0;
    while !producer.is_finished() {
        handled += clock.drain(&events, &mut display, &mut buzzer).unwrap();
        yield_now().await;
    }
    producer.await.unwrap();
    handled += clock.drain(&events, &mut display, &mut buzzer).unwrap();

    assert_eq!(handled, 7);
    assert_eq!(clock.mode(), Mode::Clock);
    assert_eq!(clock.clock_time(), TimeValue::new(12, 1, 0).unwrap());
    assert_eq!(display.digits().map(|d| d[3]), Some(Digit::Value(1)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_switch_and_ticks_from_spawned_producers() {
    let events = Arc::new(EventQueue::new());
    let mut clock = scenarios::running_at(TimeValue::new(6, 59, 58).unwrap());
    let mut display = MockDisplay::new();
    let mut buzzer = MockBuzzer::new();

    let switch = {
        let events = Arc::clone(&events);
        tokio::spawn(async move { events.post_alarm_switch(true) })
    };
    switch.await.unwrap().unwrap();

    let ticker = {
        let events = Arc::clone(&events);
        tokio::spawn(async move {
            for _ in 0..6 {
                events.post(ClockEvent::Tick).unwrap();
            }
        })
    };
    ticker.await.unwrap();

    assert_eq!(clock.drain(&events, &mut display, &mut buzzer), Ok(7));
    assert!(clock.alarm().enabled);
    assert_eq!(clock.mode(), Mode::AlarmRinging);
    assert_eq!(buzzer.plays(), 2);
}

#[test]
fn test_queue_overflow_from_threads() {
    let events = Arc::new(EventQueue::new());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let events = Arc::clone(&events);
            thread::spawn(move || {
                (0..4)
                    .filter(|_| events.post_button(Button::Plus).is_ok())
                    .count()
            })
        })
        .collect();

    let accepted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(accepted, 8);

    let mut drained = 0;
    while events.next().is_some() {
        drained += 1;
    }
    assert_eq!(drained, 8);
}

#[test]
fn test_blocking_drain_with_tokio_test() {
    let events = EventQueue::new();
    let mut clock = scenarios::running_at(TimeValue::MIDNIGHT);
    let mut display = MockDisplay::new();
    let mut buzzer = MockBuzzer::new();

    events.post(ClockEvent::Tick).unwrap();
    events.post(ClockEvent::Tick).unwrap();
    events.post_button(Button::Menu).unwrap();

    let handled = tokio_test::block_on(async { clock.drain(&events, &mut display, &mut buzzer) });
    assert_eq!(handled, Ok(3));
    assert_eq!(clock.clock_time(), TimeValue::new(0, 0, 1).unwrap());
    assert_eq!(display.text(), Some(Label::Set));
}
