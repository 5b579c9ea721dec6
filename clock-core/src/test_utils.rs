//! Test utilities for clock core functionality

pub mod frame_capture {
    //! Display sink that keeps every frame it is shown

    use crate::hal::{DisplaySink, HalError};
    use crate::render::{Digit, Frame, Label};
    use std::string::{String, ToString};
    use std::vec::Vec;

    /// Recording display; each completed `show` appends one frame
    #[derive(Default)]
    pub struct FrameLog {
        frames: Vec<Frame>,
        colon: bool,
    }

    impl FrameLog {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn frames(&self) -> &[Frame] {
            &self.frames
        }

        pub fn last(&self) -> Option<&Frame> {
            self.frames.last()
        }

        pub fn len(&self) -> usize {
            self.frames.len()
        }

        pub fn is_empty(&self) -> bool {
            self.frames.is_empty()
        }

        pub fn clear(&mut self) {
            self.frames.clear();
        }

        /// Frames rendered as `"07:00"` / `"SET"` strings
        pub fn strings(&self) -> Vec<String> {
            self.frames.iter().map(|f| f.to_string()).collect()
        }

        /// Count frames where the colon was lit
        pub fn colon_count(&self) -> usize {
            self.frames.iter().filter(|f| f.colon()).count()
        }
    }

    impl DisplaySink for FrameLog {
        type Error = HalError;

        fn set_digits(&mut self, digits: [Digit; 4]) -> Result<(), Self::Error> {
            self.frames.push(Frame::Digits {
                digits,
                colon: self.colon,
            });
            Ok(())
        }

        fn set_colon(&mut self, on: bool) -> Result<(), Self::Error> {
            self.colon = on;
            Ok(())
        }

        fn set_text(&mut self, label: Label) -> Result<(), Self::Error> {
            self.frames.push(Frame::Text(label));
            Ok(())
        }
    }
}

pub mod event_script {
    //! Scripted input sequences replayed against a state machine

    use crate::fsm::ClockStateMachine;
    use crate::hal::{Buzzer, DisplaySink, HalError};
    use crate::types::{Button, ClockEvent};
    use heapless::{String, Vec};

    /// One scripted input
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Step {
        /// Run this many ticks
        Tick(u32),
        Press(Button),
        Switch(bool),
    }

    /// Named input sequence
    #[derive(Debug, Clone)]
    pub struct Script {
        pub steps: Vec<Step, 128>,
        pub description: String<32>,
    }

    impl Script {
        pub fn new(description: &str) -> Self {
            let mut name = String::new();
            for c in description.chars() {
                if name.push(c).is_err() {
                    break;
                }
            }
            Self {
                steps: Vec::new(),
                description: name,
            }
        }

        pub fn ticks(mut self, count: u32) -> Self {
            self.steps.push(Step::Tick(count)).ok();
            self
        }

        pub fn press(mut self, button: Button) -> Self {
            self.steps.push(Step::Press(button)).ok();
            self
        }

        pub fn presses(mut self, button: Button, count: usize) -> Self {
            for _ in 0..count {
                self.steps.push(Step::Press(button)).ok();
            }
            self
        }

        pub fn switch(mut self, enabled: bool) -> Self {
            self.steps.push(Step::Switch(enabled)).ok();
            self
        }

        /// Number of events the script expands to
        pub fn event_count(&self) -> usize {
            self.steps
                .iter()
                .map(|step| match step {
                    Step::Tick(n) => *n as usize,
                    Step::Press(_) | Step::Switch(_) => 1,
                })
                .sum()
        }

        /// Replay every step through the interrupt entry points
        pub fn run<D, B>(&self, clock: &mut ClockStateMachine, display: &mut D, buzzer: &mut B) -> Result<(), HalError>
        where
            D: DisplaySink,
            B: Buzzer,
        {
            for step in &self.steps {
                match *step {
                    Step::Tick(n) => {
                        for _ in 0..n {
                            clock.dispatch(ClockEvent::Tick, display, buzzer)?;
                        }
                    }
                    Step::Press(button) => {
                        clock.dispatch(ClockEvent::Button(button), display, buzzer)?;
                    }
                    Step::Switch(enabled) => {
                        clock.dispatch(ClockEvent::AlarmSwitch(enabled), display, buzzer)?;
                    }
                }
            }
            Ok(())
        }
    }
}

pub mod scenarios {
    //! Ready-made configurations and scripts

    use super::event_script::Script;
    use crate::controller::TickCounter;
    use crate::fsm::ClockStateMachine;
    use crate::types::{Button, ClockConfig, TimeValue};

    /// Alarm at 07:00 enabled, clock half a second before the alarm minute
    pub fn wake_up() -> ClockStateMachine {
        let config = ClockConfig {
            initial_time: TimeValue::new(6, 59, 59).unwrap(),
            alarm_time: TimeValue::hm(7, 0).unwrap(),
            alarm_enabled: true,
            ..ClockConfig::default()
        };
        let start = config.initial_time.to_millis() + 500;
        ClockStateMachine::new(config).with_tick_counter(TickCounter::from_millis(start))
    }

    /// Clock running from `time` with default settings
    pub fn running_at(time: TimeValue) -> ClockStateMachine {
        ClockStateMachine::new(ClockConfig {
            initial_time: time,
            ..ClockConfig::default()
        })
    }

    /// Enter SET, add `hours` and `minutes`, commit
    pub fn set_clock(hours: usize, minutes: usize) -> Script {
        Script::new("Set clock")
            .press(Button::Menu)
            .press(Button::Ok)
            .presses(Button::Plus, hours)
            .press(Button::Ok)
            .presses(Button::Plus, minutes)
            .press(Button::Ok)
    }

    /// Enter AL, subtract `hours` and `minutes`, commit
    pub fn set_alarm_back(hours: usize, minutes: usize) -> Script {
        Script::new("Set alarm")
            .press(Button::Menu)
            .press(Button::Menu)
            .press(Button::Ok)
            .presses(Button::Minus, hours)
            .press(Button::Ok)
            .presses(Button::Minus, minutes)
            .press(Button::Ok)
    }

    /// Ring, let it sound for a few ticks, dismiss with OK
    pub fn dismiss_after(ringing_ticks: u32) -> Script {
        Script::new("Dismiss alarm")
            .ticks(1 + ringing_ticks)
            .press(Button::Ok)
    }
}
