//! Projection of clock state onto the four-digit display

use core::fmt;

use crate::types::{Field, Mode, Segments, TimeValue};

/// One display position: a decimal digit or unlit
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Digit {
    /// 0-9
    Value(u8),
    /// All segments off
    Blank,
}

impl Digit {
    /// Raw code used by TM1637-style drivers for an unlit position
    pub const RAW_BLANK: u8 = 0x7F;

    /// Byte for the driver: the digit value, or `RAW_BLANK`
    pub const fn raw(&self) -> u8 {
        match self {
            Digit::Value(v) => *v,
            Digit::Blank => Self::RAW_BLANK,
        }
    }

    /// Tens and units of a two-digit field
    const fn pair(value: u8) -> [Digit; 2] {
        [Digit::Value(value / 10), Digit::Value(value % 10)]
    }
}

/// Text labels shown in place of digits
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Label {
    Set,
    Alarm,
    Off,
}

impl Label {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Label::Set => "SET",
            Label::Alarm => "AL",
            Label::Off => "OFF",
        }
    }
}

/// What the display collaborator should show
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Frame {
    Text(Label),
    Digits { digits: [Digit; 4], colon: bool },
}

impl Frame {
    /// Digits of a frame, `None` for text frames
    pub const fn digits(&self) -> Option<[Digit; 4]> {
        match self {
            Frame::Digits { digits, .. } => Some(*digits),
            Frame::Text(_) => None,
        }
    }

    /// Colon state; text frames never show the colon
    pub const fn colon(&self) -> bool {
        match self {
            Frame::Digits { colon, .. } => *colon,
            Frame::Text(_) => false,
        }
    }
}

/// `"12:34"`, `"  :34"`, `"12 34"` or the label text
impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::Text(label) => f.write_str(label.as_str()),
            Frame::Digits { digits, colon } => {
                for (i, digit) in digits.iter().enumerate() {
                    if i == 2 {
                        f.write_str(if *colon { ":" } else { " " })?;
                    }
                    match digit {
                        Digit::Value(v) => write!(f, "{}", v)?,
                        Digit::Blank => f.write_str(" ")?,
                    }
                }
                Ok(())
            }
        }
    }
}

/// Visible segments plus the mask flipped on every tick render
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayState {
    visible: Segments,
    blink: Segments,
}

impl DisplayState {
    /// Everything lit, colon blinking
    pub const fn new() -> Self {
        Self {
            visible: Segments::ALL,
            blink: Segments::COLON,
        }
    }

    pub const fn visible(&self) -> Segments {
        self.visible
    }

    pub const fn blink_mask(&self) -> Segments {
        self.blink
    }

    /// Light everything and blink `mask` from here on
    pub fn reset(&mut self, mask: Segments) {
        self.visible = Segments::ALL;
        self.blink = mask;
    }

    /// Light everything, keep the current mask
    pub fn show_all(&mut self) {
        self.visible = Segments::ALL;
    }

    pub fn set_blink_mask(&mut self, mask: Segments) {
        self.blink = mask;
    }

    /// `visible ^= blink`
    pub fn step(&mut self) {
        self.visible = self.visible ^ self.blink;
    }
}

impl Default for DisplayState {
    fn default() -> Self {
        Self::new()
    }
}

/// Inputs the renderer needs from the state machine
#[derive(Copy, Clone, Debug)]
pub struct View {
    pub mode: Mode,
    /// Time source selected for the mode: clock, alarm or edit buffer
    pub time: TimeValue,
    /// Field in focus while editing
    pub focus: Field,
}

/// Stateless frame builder
pub struct Renderer;

impl Renderer {
    /// Blink mask for a mode
    pub const fn blink_mask(mode: Mode, focus: Field) -> Segments {
        match mode {
            Mode::SetClock | Mode::SetAlarm => focus.segments(),
            Mode::AlarmRinging => Segments::ALL,
            Mode::Clock | Mode::MenuSet | Mode::MenuAlarm | Mode::AlarmOffNotice => Segments::COLON,
        }
    }

    /// Label shown by a mode, if it shows one
    pub const fn label(mode: Mode) -> Option<Label> {
        match mode {
            Mode::MenuSet => Some(Label::Set),
            Mode::MenuAlarm => Some(Label::Alarm),
            Mode::AlarmOffNotice => Some(Label::Off),
            Mode::Clock | Mode::SetClock | Mode::SetAlarm | Mode::AlarmRinging => None,
        }
    }

    /// Tick render: select the mode's blink mask, flip it once, then build
    /// the frame from the flipped bits
    pub fn render_tick(view: &View, display: &mut DisplayState) -> Frame {
        if let Some(label) = Self::label(view.mode) {
            return Frame::Text(label);
        }
        display.set_blink_mask(Self::blink_mask(view.mode, view.focus));
        display.step();
        Self::frame(view, display)
    }

    /// Frame from the current bits without flipping
    pub fn frame(view: &View, display: &DisplayState) -> Frame {
        if let Some(label) = Self::label(view.mode) {
            return Frame::Text(label);
        }

        let visible = display.visible();
        let [h1, h0] = if visible.contains(Segments::LEFT_DIGITS) {
            Digit::pair(view.time.hours())
        } else {
            [Digit::Blank; 2]
        };
        let [m1, m0] = if visible.contains(Segments::RIGHT_DIGITS) {
            Digit::pair(view.time.minutes())
        } else {
            [Digit::Blank; 2]
        };

        Frame::Digits {
            digits: [h1, h0, m1, m0],
            colon: visible.contains(Segments::COLON),
        }
    }
}
