//! Core data types for the alarm clock

use core::ops::{BitAnd, BitOr, BitXor, Not};

use crate::hal::Duration;

/// Milliseconds in one second
pub const MS_PER_SECOND: u32 = 1_000;
/// Milliseconds in one minute
pub const MS_PER_MINUTE: u32 = 60 * MS_PER_SECOND;
/// Milliseconds in one hour
pub const MS_PER_HOUR: u32 = 60 * MS_PER_MINUTE;
/// Milliseconds in one day; the tick counter wraps here
pub const MS_PER_DAY: u32 = 24 * MS_PER_HOUR;

const PACKED_HOURS_SHIFT: u32 = 12;
const PACKED_MINUTES_SHIFT: u32 = 6;
const PACKED_FIELD_MASK: u32 = 0b11_1111;

/// Time of day with hours, minutes and seconds always in range
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeValue {
    hours: u8,
    minutes: u8,
    seconds: u8,
}

impl TimeValue {
    /// 00:00:00
    pub const MIDNIGHT: TimeValue = TimeValue { hours: 0, minutes: 0, seconds: 0 };

    /// Create a time value, rejecting out-of-range fields
    pub const fn new(hours: u8, minutes: u8, seconds: u8) -> Result<Self, &'static str> {
        if hours > 23 {
            return Err("Hours must be between 0 and 23");
        }
        if minutes > 59 {
            return Err("Minutes must be between 0 and 59");
        }
        if seconds > 59 {
            return Err("Seconds must be between 0 and 59");
        }
        Ok(Self { hours, minutes, seconds })
    }

    /// Create an hours:minutes value with zero seconds
    pub const fn hm(hours: u8, minutes: u8) -> Result<Self, &'static str> {
        Self::new(hours, minutes, 0)
    }

    /// Decode milliseconds since midnight.
    ///
    /// Input is expected in `[0, MS_PER_DAY)`; larger values wrap.
    pub const fn from_ticks(ms_since_midnight: u32) -> Self {
        let ms = ms_since_midnight % MS_PER_DAY;
        Self {
            hours: (ms / MS_PER_HOUR) as u8,
            minutes: ((ms % MS_PER_HOUR) / MS_PER_MINUTE) as u8,
            seconds: ((ms % MS_PER_MINUTE) / MS_PER_SECOND) as u8,
        }
    }

    /// Milliseconds since midnight at the start of this second
    pub const fn to_millis(&self) -> u32 {
        self.hours as u32 * MS_PER_HOUR
            + self.minutes as u32 * MS_PER_MINUTE
            + self.seconds as u32 * MS_PER_SECOND
    }

    pub const fn hours(&self) -> u8 {
        self.hours
    }

    pub const fn minutes(&self) -> u8 {
        self.minutes
    }

    pub const fn seconds(&self) -> u8 {
        self.seconds
    }

    /// Move one field by `delta`, wrapping within its range.
    ///
    /// Seconds are never touched. Any `delta` is accepted.
    pub const fn adjust_field(&self, field: Field, delta: i32) -> Self {
        match field {
            Field::Hours => Self {
                hours: (self.hours as i64 + delta as i64).rem_euclid(24) as u8,
                ..*self
            },
            Field::Minutes => Self {
                minutes: (self.minutes as i64 + delta as i64).rem_euclid(60) as u8,
                ..*self
            },
        }
    }

    /// Same hours and minutes, different seconds (clamped to 59)
    pub const fn with_seconds(&self, seconds: u8) -> Self {
        let seconds = if seconds > 59 { 59 } else { seconds };
        Self { seconds, ..*self }
    }

    /// True when hours and minutes match, seconds ignored
    pub const fn same_minute(&self, other: &TimeValue) -> bool {
        self.hours == other.hours && self.minutes == other.minutes
    }

    /// Pack into the 17-bit wire layout `HHHHH MMMMMM SSSSSS`
    pub const fn to_packed(&self) -> u32 {
        (self.hours as u32) << PACKED_HOURS_SHIFT
            | (self.minutes as u32) << PACKED_MINUTES_SHIFT
            | self.seconds as u32
    }

    /// Unpack the 17-bit wire layout, rejecting bits above bit 16 and
    /// out-of-range fields
    pub const fn from_packed(packed: u32) -> Result<Self, &'static str> {
        if packed >> (PACKED_HOURS_SHIFT + 5) != 0 {
            return Err("Packed time uses more than 17 bits");
        }
        Self::new(
            (packed >> PACKED_HOURS_SHIFT) as u8,
            ((packed >> PACKED_MINUTES_SHIFT) & PACKED_FIELD_MASK) as u8,
            (packed & PACKED_FIELD_MASK) as u8,
        )
    }
}

/// Editable time fields
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Field {
    /// Left digit pair
    #[default]
    Hours,
    /// Right digit pair
    Minutes,
}

impl Field {
    /// The other field
    pub const fn toggle(&self) -> Field {
        match self {
            Field::Hours => Field::Minutes,
            Field::Minutes => Field::Hours,
        }
    }

    /// Display segments occupied by this field
    pub const fn segments(&self) -> Segments {
        match self {
            Field::Hours => Segments::LEFT_DIGITS,
            Field::Minutes => Segments::RIGHT_DIGITS,
        }
    }
}

/// Front panel buttons
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    Menu,
    Plus,
    Minus,
    Ok,
}

impl Button {
    /// Edit delta carried by this button, if any
    pub const fn delta(&self) -> Option<i32> {
        match self {
            Button::Plus => Some(1),
            Button::Minus => Some(-1),
            Button::Menu | Button::Ok => None,
        }
    }
}

/// Inputs accepted by the state machine, delivered one at a time
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockEvent {
    /// Periodic timer tick
    Tick,
    /// Debounced button press
    Button(Button),
    /// Alarm enable switch moved to the given level
    AlarmSwitch(bool),
}

/// Externally visible operating mode
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Showing the running time with a blinking colon
    Clock,
    /// Menu entry "SET"
    MenuSet,
    /// Menu entry "AL"
    MenuAlarm,
    /// Editing the clock time
    SetClock,
    /// Editing the alarm time
    SetAlarm,
    /// "OFF" shown because the alarm switch is off
    AlarmOffNotice,
    /// Alarm sounding, whole display blinking
    AlarmRinging,
}

impl Mode {
    /// Returns true if this mode shows a text label instead of digits
    pub const fn shows_label(&self) -> bool {
        matches!(self, Mode::MenuSet | Mode::MenuAlarm | Mode::AlarmOffNotice)
    }

    /// Returns true if the user is editing a time in this mode
    pub const fn is_editing(&self) -> bool {
        matches!(self, Mode::SetClock | Mode::SetAlarm)
    }
}

/// Set of display regions: left digit pair, colon, right digit pair
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Segments(u8);

impl Segments {
    pub const NONE: Segments = Segments(0);
    pub const RIGHT_DIGITS: Segments = Segments(0b001);
    pub const LEFT_DIGITS: Segments = Segments(0b010);
    pub const COLON: Segments = Segments(0b100);
    pub const ALL: Segments = Segments(0b111);

    pub const fn bits(&self) -> u8 {
        self.0
    }

    /// Build from raw bits; unknown bits are dropped
    pub const fn from_bits_truncate(bits: u8) -> Self {
        Segments(bits & Self::ALL.0)
    }

    pub const fn contains(&self, other: Segments) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Segments {
    type Output = Segments;

    fn bitor(self, rhs: Segments) -> Segments {
        Segments(self.0 | rhs.0)
    }
}

impl BitAnd for Segments {
    type Output = Segments;

    fn bitand(self, rhs: Segments) -> Segments {
        Segments(self.0 & rhs.0)
    }
}

impl BitXor for Segments {
    type Output = Segments;

    fn bitxor(self, rhs: Segments) -> Segments {
        Segments(self.0 ^ rhs.0)
    }
}

impl Not for Segments {
    type Output = Segments;

    fn not(self) -> Segments {
        Segments(!self.0 & Self::ALL.0)
    }
}

/// Alarm time and enable switch level
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmConfig {
    time: TimeValue,
    /// Mirrors the hardware alarm switch
    pub enabled: bool,
}

impl AlarmConfig {
    /// Create an alarm; seconds of `time` are discarded
    pub const fn new(time: TimeValue, enabled: bool) -> Self {
        Self {
            time: time.with_seconds(0),
            enabled,
        }
    }

    /// Alarm time (seconds always zero)
    pub const fn time(&self) -> TimeValue {
        self.time
    }

    /// Replace the alarm time; seconds are discarded
    pub fn set_time(&mut self, time: TimeValue) {
        self.time = time.with_seconds(0);
    }
}

/// Clock configuration parameters
#[derive(Copy, Clone, Debug)]
pub struct ClockConfig {
    /// Time shown at power-up
    pub initial_time: TimeValue,
    /// Alarm time at power-up
    pub alarm_time: TimeValue,
    /// Alarm switch level at power-up
    pub alarm_enabled: bool,
    /// Period of the hardware tick
    pub tick_period: Duration,
    /// Ticks the alarm rings before returning to the clock
    pub ring_ticks: u8,
    /// Ticks the "OFF" notice stays up
    pub notice_ticks: u8,
    /// MENU dismisses a ringing alarm like OK does
    pub menu_silences_alarm: bool,
    /// How often the clock task drains queued input events
    pub poll_interval: Duration,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            initial_time: TimeValue::MIDNIGHT,
            alarm_time: TimeValue { hours: 7, minutes: 0, seconds: 0 },
            alarm_enabled: false,
            tick_period: Duration::from_millis(500),
            ring_ticks: 60,  // 30 s at 500 ms
            notice_ticks: 6, // 3 s at 500 ms
            menu_silences_alarm: false,
            poll_interval: Duration::from_millis(20),
        }
    }
}

impl ClockConfig {
    /// Create a new configuration with validation
    pub fn new(
        initial_time: TimeValue,
        alarm_time: TimeValue,
        alarm_enabled: bool,
        tick_ms: u64,
        ring_ticks: u8,
        notice_ticks: u8,
    ) -> Result<Self, &'static str> {
        if tick_ms == 0 || tick_ms > 1_000 {
            return Err("Tick period must be between 1 and 1000ms");
        }
        if MS_PER_DAY as u64 % tick_ms != 0 {
            return Err("Tick period must divide one day evenly");
        }
        if ring_ticks == 0 {
            return Err("Ring duration must be at least one tick");
        }
        if notice_ticks == 0 {
            return Err("Notice duration must be at least one tick");
        }

        Ok(Self {
            initial_time,
            alarm_time: alarm_time.with_seconds(0),
            alarm_enabled,
            tick_period: Duration::from_millis(tick_ms),
            ring_ticks,
            notice_ticks,
            ..Self::default()
        })
    }

    /// Tick period in milliseconds
    pub fn tick_ms(&self) -> u32 {
        self.tick_period.as_millis() as u32
    }

    /// Enable MENU-to-dismiss while ringing
    pub fn with_menu_silences_alarm(mut self, enabled: bool) -> Self {
        self.menu_silences_alarm = enabled;
        self
    }
}
