//! What reaches the display, frame by frame

use clock_core::hal::mock::MockBuzzer;
use clock_core::test_utils::event_script::Script;
use clock_core::test_utils::frame_capture::FrameLog;
use clock_core::test_utils::scenarios;
use clock_core::*;

#[test]
fn test_colon_blinks_at_one_hertz() {
    let mut clock = scenarios::running_at(TimeValue::new(9, 41, 0).unwrap());
    let mut log = FrameLog::new();
    let mut buzzer = MockBuzzer::new();

    Script::new("Idle").ticks(8).run(&mut clock, &mut log, &mut buzzer).unwrap();

    assert_eq!(log.strings(), ["09 41", "09:41", "09 41", "09:41", "09 41", "09:41", "09 41", "09:41"]);
    assert_eq!(log.colon_count(), 4);
}

#[test]
fn test_minute_rollover_on_display() {
    let mut clock = scenarios::running_at(TimeValue::new(23, 59, 59).unwrap());
    let mut log = FrameLog::new();
    let mut buzzer = MockBuzzer::new();

    Script::new("Midnight").ticks(2).run(&mut clock, &mut log, &mut buzzer).unwrap();

    assert_eq!(log.strings(), ["23 59", "00:00"]);
}

#[test]
fn test_menu_labels() {
    let mut clock = scenarios::running_at(TimeValue::new(9, 41, 0).unwrap());
    let mut log = FrameLog::new();
    let mut buzzer = MockBuzzer::new();

    Script::new("Menu cycle")
        .presses(Button::Menu, 3)
        .run(&mut clock, &mut log, &mut buzzer)
        .unwrap();

    assert_eq!(log.frames()[0], Frame::Text(Label::Set));
    assert_eq!(log.frames()[1], Frame::Text(Label::Alarm));
    // Back in CLOCK the full time is shown with the colon lit
    assert_eq!(log.strings()[2], "09:41");
}

#[test]
fn test_labels_stay_steady_across_ticks() {
    let mut clock = scenarios::running_at(TimeValue::new(9, 41, 0).unwrap());
    let mut log = FrameLog::new();
    let mut buzzer = MockBuzzer::new();

    Script::new("Idle in menu")
        .press(Button::Menu)
        .ticks(5)
        .run(&mut clock, &mut log, &mut buzzer)
        .unwrap();

    assert!(log.frames().iter().all(|f| *f == Frame::Text(Label::Set)));
}

#[test]
fn test_edit_blinks_focused_field() {
    let mut clock = scenarios::running_at(TimeValue::new(9, 41, 0).unwrap());
    let mut log = FrameLog::new();
    let mut buzzer = MockBuzzer::new();

    Script::new("Edit hours")
        .press(Button::Menu)
        .press(Button::Ok)
        .ticks(2)
        .press(Button::Ok)
        .ticks(2)
        .run(&mut clock, &mut log, &mut buzzer)
        .unwrap();

    assert_eq!(
        log.strings(),
        ["SET", "09:41", "  :41", "09:41", "09:41", "09:  ", "09:41"]
    );
}

#[test]
fn test_adjust_redraw_shows_new_value_immediately() {
    let mut clock = scenarios::running_at(TimeValue::new(9, 41, 0).unwrap());
    let mut log = FrameLog::new();
    let mut buzzer = MockBuzzer::new();

    Script::new("Adjust")
        .press(Button::Menu)
        .press(Button::Ok)
        .ticks(1)
        .press(Button::Plus)
        .run(&mut clock, &mut log, &mut buzzer)
        .unwrap();

    // Hours are in their dark phase; PLUS keeps the phase
    assert_eq!(log.strings()[2], "  :41");
    assert_eq!(log.strings()[3], "  :41");
    assert_eq!(clock.edit_buffer().map(|e| e.time().hours()), Some(10));
}

#[test]
fn test_off_notice_frames() {
    let mut clock = scenarios::running_at(TimeValue::new(9, 41, 0).unwrap());
    let mut log = FrameLog::new();
    let mut buzzer = MockBuzzer::new();

    Script::new("Alarm off")
        .press(Button::Menu)
        .press(Button::Menu)
        .press(Button::Ok)
        .ticks(6)
        .run(&mut clock, &mut log, &mut buzzer)
        .unwrap();

    let strings = log.strings();
    assert_eq!(&strings[2..8], ["OFF", "OFF", "OFF", "OFF", "OFF", "OFF"]);
    // The sixth tick leaves the notice and renders the clock
    assert_eq!(strings[8], "09 41");
    assert_eq!(clock.mode(), Mode::Clock);
}

#[test]
fn test_digit_raw_codes() {
    let frame = Frame::Digits {
        digits: [Digit::Value(0), Digit::Value(7), Digit::Blank, Digit::Blank],
        colon: true,
    };
    let raw = frame.digits().map(|d| d.map(|digit| digit.raw()));
    assert_eq!(raw, Some([0, 7, 0x7F, 0x7F]));
    assert_eq!(frame.to_string(), "07:  ");
}
