//! Hardware Abstraction Layer for the display and buzzer collaborators

// Re-export time types based on feature
#[cfg(feature = "embassy-time")]
pub use embassy_time::Duration;

#[cfg(not(feature = "embassy-time"))]
pub use self::mock_time::Duration;

#[cfg(not(feature = "embassy-time"))]
mod mock_time {
    /// Millisecond duration for builds without embassy-time
    #[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Default)]
    pub struct Duration(u64);

    impl Duration {
        pub const fn from_millis(ms: u64) -> Self {
            Self(ms)
        }

        pub const fn as_millis(&self) -> u64 {
            self.0
        }
    }
}

use embedded_hal::digital::OutputPin;
use crate::render::{Digit, Frame, Label};

/// Error types for HAL operations
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HalError {
    /// Display write failed
    DisplayError,
    /// Buzzer command failed
    BuzzerError,
    /// GPIO operation failed
    GpioError,
    /// Input event queue was full, event dropped
    QueueFull,
}

#[cfg(feature = "std")]
impl core::fmt::Display for HalError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            HalError::DisplayError => write!(f, "Display write failed"),
            HalError::BuzzerError => write!(f, "Buzzer command failed"),
            HalError::GpioError => write!(f, "GPIO operation failed"),
            HalError::QueueFull => write!(f, "Input event queue full"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HalError {}

/// Four-digit display with a center colon
pub trait DisplaySink {
    type Error: From<HalError>;

    /// Show four digits, left to right
    fn set_digits(&mut self, digits: [Digit; 4]) -> Result<(), Self::Error>;

    /// Turn the center colon on or off
    fn set_colon(&mut self, on: bool) -> Result<(), Self::Error>;

    /// Show a text label instead of digits
    fn set_text(&mut self, label: Label) -> Result<(), Self::Error>;

    /// Push a whole frame.
    ///
    /// The colon is written before the digits so drivers that latch on the
    /// digit write show a consistent frame.
    fn show(&mut self, frame: &Frame) -> Result<(), Self::Error> {
        match *frame {
            Frame::Text(label) => {
                self.set_colon(false)?;
                self.set_text(label)
            }
            Frame::Digits { digits, colon } => {
                self.set_colon(colon)?;
                self.set_digits(digits)
            }
        }
    }
}

/// Alarm sounder
pub trait Buzzer {
    type Error: From<HalError>;

    /// Sound for the current tick; called once per ringing tick
    fn play(&mut self) -> Result<(), Self::Error>;

    /// Silence; called once when ringing ends
    fn stop(&mut self) -> Result<(), Self::Error>;
}

/// Active buzzer on an embedded-hal output pin.
///
/// Each `play()` flips the pin, so a 500 ms tick gives a 1 Hz beep.
pub struct EmbeddedHalBuzzer<P> {
    pin: P,
    inverted: bool,
    sounding: bool,
}

impl<P> EmbeddedHalBuzzer<P>
where
    P: OutputPin,
{
    pub fn new(pin: P, inverted: bool) -> Self {
        Self {
            pin,
            inverted,
            sounding: false,
        }
    }

    /// Returns true while the pin is driven to its sounding level
    pub fn is_sounding(&self) -> bool {
        self.sounding
    }

    /// Give back the pin
    pub fn release(self) -> P {
        self.pin
    }

    fn drive(&mut self, sounding: bool) -> Result<(), HalError> {
        let level = sounding != self.inverted;
        if level {
            self.pin.set_high().map_err(|_| HalError::GpioError)?;
        } else {
            self.pin.set_low().map_err(|_| HalError::GpioError)?;
        }
        self.sounding = sounding;
        Ok(())
    }
}

impl<P> Buzzer for EmbeddedHalBuzzer<P>
where
    P: OutputPin,
{
    type Error = HalError;

    fn play(&mut self) -> Result<(), Self::Error> {
        let next = !self.sounding;
        self.drive(next)
    }

    fn stop(&mut self) -> Result<(), Self::Error> {
        self.drive(false)
    }
}

/// Display that discards everything, for headless builds
pub struct NullDisplay;

impl DisplaySink for NullDisplay {
    type Error = HalError;

    fn set_digits(&mut self, _digits: [Digit; 4]) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_colon(&mut self, _on: bool) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_text(&mut self, _label: Label) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    //! Mock implementations for testing

    use super::*;
    use core::cell::{Cell, RefCell};

    /// Display that remembers what it was last told
    #[derive(Default)]
    pub struct MockDisplay {
        digits: RefCell<Option<[Digit; 4]>>,
        colon: Cell<bool>,
        text: Cell<Option<Label>>,
        writes: Cell<u32>,
        fail: Cell<bool>,
    }

    impl MockDisplay {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make every following write fail with `DisplayError`
        pub fn set_failing(&self, fail: bool) {
            self.fail.set(fail);
        }

        pub fn digits(&self) -> Option<[Digit; 4]> {
            *self.digits.borrow()
        }

        pub fn colon(&self) -> bool {
            self.colon.get()
        }

        /// Label currently shown; cleared by a digit write
        pub fn text(&self) -> Option<Label> {
            self.text.get()
        }

        /// Number of successful digit or text writes
        pub fn writes(&self) -> u32 {
            self.writes.get()
        }

        fn check(&self) -> Result<(), HalError> {
            if self.fail.get() {
                Err(HalError::DisplayError)
            } else {
                Ok(())
            }
        }
    }

    // Shared references write too, so a test can watch a display it lent out
    impl DisplaySink for &MockDisplay {
        type Error = HalError;

        fn set_digits(&mut self, digits: [Digit; 4]) -> Result<(), Self::Error> {
            self.check()?;
            *self.digits.borrow_mut() = Some(digits);
            self.text.set(None);
            self.writes.set(self.writes.get() + 1);
            Ok(())
        }

        fn set_colon(&mut self, on: bool) -> Result<(), Self::Error> {
            self.check()?;
            self.colon.set(on);
            Ok(())
        }

        fn set_text(&mut self, label: Label) -> Result<(), Self::Error> {
            self.check()?;
            self.text.set(Some(label));
            *self.digits.borrow_mut() = None;
            self.writes.set(self.writes.get() + 1);
            Ok(())
        }
    }

    impl DisplaySink for MockDisplay {
        type Error = HalError;

        fn set_digits(&mut self, digits: [Digit; 4]) -> Result<(), Self::Error> {
            (&*self).set_digits(digits)
        }

        fn set_colon(&mut self, on: bool) -> Result<(), Self::Error> {
            (&*self).set_colon(on)
        }

        fn set_text(&mut self, label: Label) -> Result<(), Self::Error> {
            (&*self).set_text(label)
        }
    }

    /// Buzzer that counts commands
    #[derive(Default)]
    pub struct MockBuzzer {
        plays: Cell<u32>,
        stops: Cell<u32>,
        sounding: Cell<bool>,
    }

    impl MockBuzzer {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn plays(&self) -> u32 {
            self.plays.get()
        }

        pub fn stops(&self) -> u32 {
            self.stops.get()
        }

        /// True between a `play()` and the next `stop()`
        pub fn is_sounding(&self) -> bool {
            self.sounding.get()
        }
    }

    impl Buzzer for &MockBuzzer {
        type Error = HalError;

        fn play(&mut self) -> Result<(), Self::Error> {
            self.plays.set(self.plays.get() + 1);
            self.sounding.set(true);
            Ok(())
        }

        fn stop(&mut self) -> Result<(), Self::Error> {
            self.stops.set(self.stops.get() + 1);
            self.sounding.set(false);
            Ok(())
        }
    }

    impl Buzzer for MockBuzzer {
        type Error = HalError;

        fn play(&mut self) -> Result<(), Self::Error> {
            (&*self).play()
        }

        fn stop(&mut self) -> Result<(), Self::Error> {
            (&*self).stop()
        }
    }
}
