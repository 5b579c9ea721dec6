//! Property-based checks over times, edits and arbitrary input sequences

use clock_core::hal::mock::{MockBuzzer, MockDisplay};
use clock_core::*;
use proptest::prelude::*;

fn any_time() -> impl Strategy<Value = TimeValue> {
    (0u8..24, 0u8..60, 0u8..60).prop_map(|(h, m, s)| TimeValue::new(h, m, s).unwrap())
}

fn any_button() -> impl Strategy<Value = Button> {
    prop_oneof![
        Just(Button::Menu),
        Just(Button::Plus),
        Just(Button::Minus),
        Just(Button::Ok),
    ]
}

fn any_event() -> impl Strategy<Value = ClockEvent> {
    prop_oneof![
        4 => Just(ClockEvent::Tick),
        4 => any_button().prop_map(ClockEvent::Button),
        1 => any::<bool>().prop_map(ClockEvent::AlarmSwitch),
    ]
}

proptest! {
    #[test]
    fn prop_from_ticks_truncates_to_second(ms in 0u32..MS_PER_DAY) {
        let t = TimeValue::from_ticks(ms);
        prop_assert!(t.hours() < 24 && t.minutes() < 60 && t.seconds() < 60);
        prop_assert!(t.to_millis() <= ms);
        prop_assert!(ms - t.to_millis() < MS_PER_SECOND);
    }

    #[test]
    fn prop_advance_matches_from_ticks(ms in 0u32..MS_PER_DAY) {
        let mut counter = TickCounter::from_millis(ms);
        prop_assert_eq!(counter.advance(500), TimeValue::from_ticks((ms + 500) % MS_PER_DAY));
    }

    #[test]
    fn prop_full_cycle_is_identity(t in any_time()) {
        let mut hours = t;
        for _ in 0..24 {
            hours = hours.adjust_field(Field::Hours, 1);
        }
        let mut minutes = t;
        for _ in 0..60 {
            minutes = minutes.adjust_field(Field::Minutes, 1);
        }
        prop_assert_eq!(hours, t);
        prop_assert_eq!(minutes, t);
    }

    #[test]
    fn prop_packed_round_trip(t in any_time()) {
        prop_assert!(t.to_packed() < 1 << 17);
        prop_assert_eq!(TimeValue::from_packed(t.to_packed()), Ok(t));
    }

    #[test]
    fn prop_adjust_is_reversible(t in any_time(), delta in -500i32..500, minutes in any::<bool>()) {
        let field = if minutes { Field::Minutes } else { Field::Hours };
        let there = t.adjust_field(field, delta);
        prop_assert_eq!(there.adjust_field(field, -delta), t);
        prop_assert_eq!(there.seconds(), t.seconds());
        match field {
            Field::Hours => prop_assert_eq!(there.minutes(), t.minutes()),
            Field::Minutes => prop_assert_eq!(there.hours(), t.hours()),
        }
    }

    #[test]
    fn prop_packed_rejects_out_of_range(packed in 0u32..(1 << 17)) {
        let (h, m, s) = (packed >> 12, (packed >> 6) & 0x3F, packed & 0x3F);
        let valid = h < 24 && m < 60 && s < 60;
        prop_assert_eq!(TimeValue::from_packed(packed).is_ok(), valid);
    }

    #[test]
    fn prop_tick_counter_stays_in_day(start in 0u32..MS_PER_DAY, ticks in 0usize..2_000) {
        let mut counter = TickCounter::from_millis(start);
        for _ in 0..ticks {
            counter.advance(500);
        }
        prop_assert!(counter.elapsed_ms() < MS_PER_DAY);
        let expected = ((start as u64 + ticks as u64 * 500) % MS_PER_DAY as u64) as u32;
        prop_assert_eq!(counter.elapsed_ms(), expected);
    }

    #[test]
    fn prop_state_invariants_hold(
        start in any_time(),
        alarm in any_time(),
        enabled in any::<bool>(),
        events in prop::collection::vec(any_event(), 0..300),
    ) {
        let config = ClockConfig {
            initial_time: start,
            alarm_time: alarm,
            alarm_enabled: enabled,
            ..ClockConfig::default()
        };
        let mut clock = ClockStateMachine::new(config);
        let mut display = MockDisplay::new();
        let mut buzzer = MockBuzzer::new();
        let mut ticks = 0u32;

        for event in events {
            if event == ClockEvent::Tick {
                ticks += 1;
            }
            clock.dispatch(event, &mut display, &mut buzzer).unwrap();

            prop_assert_eq!(clock.edit_buffer().is_some(), clock.mode().is_editing());
            prop_assert_eq!(clock.alarm().time().seconds(), 0);
            if let Some(left) = clock.ring_ticks_remaining() {
                prop_assert!(left >= 1 && left <= config.ring_ticks);
            }
            if let Some(left) = clock.notice_ticks_remaining() {
                prop_assert!(left >= 1 && left <= config.notice_ticks);
            }
            if clock.mode().shows_label() {
                prop_assert!(display.text().is_some());
            }
        }

        // Every play belongs to a ringing tick
        prop_assert!(buzzer.plays() <= ticks);
    }

    #[test]
    fn prop_rings_at_most_once_per_alarm_minute(offset_s in 0u32..120, alarm_enabled in any::<bool>()) {
        let alarm = TimeValue::hm(7, 0).unwrap();
        let start = alarm.to_millis() + MS_PER_DAY - offset_s * MS_PER_SECOND;
        let config = ClockConfig {
            alarm_time: alarm,
            alarm_enabled,
            ..ClockConfig::default()
        };
        let mut clock = ClockStateMachine::new(config).with_tick_counter(TickCounter::from_millis(start));

        let mut rings = 0;
        let mut was_ringing = false;
        // Four minutes of ticks
        for _ in 0..480 {
            clock.tick();
            let ringing = clock.mode() == Mode::AlarmRinging;
            if ringing && !was_ringing {
                rings += 1;
            }
            was_ringing = ringing;
        }
        prop_assert_eq!(rings, if alarm_enabled { 1 } else { 0 });
    }

    #[test]
    fn prop_switch_toggles_never_rering_within_minute(
        events in prop::collection::vec(
            prop_oneof![
                3 => Just(ClockEvent::Tick),
                1 => Just(ClockEvent::Button(Button::Ok)),
                1 => any::<bool>().prop_map(ClockEvent::AlarmSwitch),
            ],
            0..300,
        ),
    ) {
        let start = TimeValue::new(6, 59, 59).unwrap().to_millis() + 500;
        let config = ClockConfig {
            alarm_enabled: true,
            ..ClockConfig::default()
        };
        let mut clock = ClockStateMachine::new(config).with_tick_counter(TickCounter::from_millis(start));
        let alarm_minute = TimeValue::hm(7, 0).unwrap();

        let mut rings = 0;
        let mut was_ringing = false;
        for event in events {
            clock.handle(event);
            let ringing = clock.mode() == Mode::AlarmRinging;
            if ringing && !was_ringing {
                prop_assert!(clock.clock_time().same_minute(&alarm_minute));
                rings += 1;
            }
            was_ringing = ringing;
        }
        prop_assert!(rings <= 1);
    }
}
