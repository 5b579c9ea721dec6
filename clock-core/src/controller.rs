//! Time keeping, alarm matching, edit buffer and interrupt-side event queue

use heapless::mpmc::MpMcQueue;

use crate::hal::HalError;
use crate::types::{AlarmConfig, Button, ClockEvent, Field, TimeValue, MS_PER_DAY};

/// Day-wrapping millisecond counter driven by the hardware tick
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickCounter {
    elapsed_ms: u32,
}

impl TickCounter {
    /// Counter positioned at the start of `time`
    pub const fn seeded(time: TimeValue) -> Self {
        Self {
            elapsed_ms: time.to_millis(),
        }
    }

    /// Counter at an arbitrary millisecond of the day (wrapped)
    pub const fn from_millis(ms: u32) -> Self {
        Self {
            elapsed_ms: ms % MS_PER_DAY,
        }
    }

    /// Advance by one tick and decode the new time.
    ///
    /// Call exactly once per hardware tick; there is no de-duplication.
    pub fn advance(&mut self, delta_ms: u32) -> TimeValue {
        // u64 so a delta near u32::MAX cannot overflow before the wrap
        self.elapsed_ms = ((self.elapsed_ms as u64 + delta_ms as u64) % MS_PER_DAY as u64) as u32;
        self.time()
    }

    /// Jump to the start of `time`; the sub-second phase restarts at zero
    pub fn reseed(&mut self, time: TimeValue) {
        self.elapsed_ms = time.to_millis();
    }

    pub const fn time(&self) -> TimeValue {
        TimeValue::from_ticks(self.elapsed_ms)
    }

    pub const fn elapsed_ms(&self) -> u32 {
        self.elapsed_ms
    }
}

/// Alarm match predicate
pub struct AlarmEvaluator;

impl AlarmEvaluator {
    /// True for every instant of the alarm minute while the alarm is enabled.
    ///
    /// Pure; ringing only once per minute is the state machine's job.
    pub const fn should_trigger(current: TimeValue, alarm: &AlarmConfig) -> bool {
        alarm.enabled && current.same_minute(&alarm.time())
    }
}

/// Where an edit lands when committed
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommitTarget {
    /// Reseed the running clock
    Clock,
    /// Replace the alarm time
    Alarm,
}

/// Scratch time being edited, with the field in focus and its destination
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EditBuffer {
    time: TimeValue,
    focus: Field,
    target: CommitTarget,
}

impl EditBuffer {
    /// Start editing a copy of `source`, hours first
    pub const fn new(source: TimeValue, target: CommitTarget) -> Self {
        Self {
            time: source,
            focus: Field::Hours,
            target,
        }
    }

    pub const fn time(&self) -> TimeValue {
        self.time
    }

    pub const fn focus(&self) -> Field {
        self.focus
    }

    pub const fn target(&self) -> CommitTarget {
        self.target
    }

    /// Move the focused field by `delta`
    pub fn adjust(&mut self, delta: i32) {
        self.time = self.time.adjust_field(self.focus, delta);
    }

    /// Switch focus between hours and minutes
    pub fn toggle_focus(&mut self) {
        self.focus = self.focus.toggle();
    }

    /// Write the buffer to its target, consuming it
    pub fn commit(self, clock: &mut TickCounter, alarm: &mut AlarmConfig) -> CommitTarget {
        match self.target {
            CommitTarget::Clock => clock.reseed(self.time),
            CommitTarget::Alarm => alarm.set_time(self.time),
        }
        self.target
    }
}

/// Lock-free input queue between interrupt handlers and the task that owns
/// the state machine.
///
/// Const-constructible so it can live in a `static`; interrupt handlers only
/// ever touch this queue, never the state machine.
pub struct EventQueue {
    queue: MpMcQueue<ClockEvent, 8>,
}

impl EventQueue {
    pub const fn new() -> Self {
        Self {
            queue: MpMcQueue::new(),
        }
    }

    /// Post an event (safe from interrupt context)
    pub fn post(&self, event: ClockEvent) -> Result<(), HalError> {
        self.queue.enqueue(event).map_err(|_dropped| {
            #[cfg(feature = "defmt")]
            defmt::warn!("Input queue full, dropped {:?}", _dropped);
            HalError::QueueFull
        })
    }

    /// Button edge from an EXTI handler
    pub fn post_button(&self, button: Button) -> Result<(), HalError> {
        self.post(ClockEvent::Button(button))
    }

    /// Alarm switch level change
    pub fn post_alarm_switch(&self, enabled: bool) -> Result<(), HalError> {
        self.post(ClockEvent::AlarmSwitch(enabled))
    }

    /// Oldest pending event
    pub fn next(&self) -> Option<ClockEvent> {
        self.queue.dequeue()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
