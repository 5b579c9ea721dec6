//! Finite State Machine implementation for the alarm clock

use crate::controller::{AlarmEvaluator, CommitTarget, EditBuffer, EventQueue, TickCounter};
use crate::hal::{Buzzer, DisplaySink, HalError};
use crate::render::{DisplayState, Frame, Renderer, View};
use crate::types::{AlarmConfig, Button, ClockConfig, ClockEvent, Field, Mode, TimeValue};

/// FSM states; data that only exists in one mode lives inside that mode
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockState {
    /// Running time on display
    Clock,
    /// "SET" menu entry
    MenuSet,
    /// "AL" menu entry
    MenuAlarm,
    /// Editing the clock or alarm, target recorded in the buffer
    Editing(EditBuffer),
    /// "OFF" notice counting down
    AlarmOffNotice { ticks_left: u8 },
    /// Alarm sounding, counting down
    AlarmRinging { ticks_left: u8 },
}

impl ClockState {
    /// Externally visible mode for this state
    pub const fn mode(&self) -> Mode {
        match self {
            ClockState::Clock => Mode::Clock,
            ClockState::MenuSet => Mode::MenuSet,
            ClockState::MenuAlarm => Mode::MenuAlarm,
            ClockState::Editing(edit) => match edit.target() {
                CommitTarget::Clock => Mode::SetClock,
                CommitTarget::Alarm => Mode::SetAlarm,
            },
            ClockState::AlarmOffNotice { .. } => Mode::AlarmOffNotice,
            ClockState::AlarmRinging { .. } => Mode::AlarmRinging,
        }
    }

    /// Field in focus; hours outside of editing
    pub const fn focus(&self) -> Field {
        match self {
            ClockState::Editing(edit) => edit.focus(),
            _ => Field::Hours,
        }
    }
}

/// Buzzer commands produced by one event
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Effects {
    /// Sound for this tick
    pub play: bool,
    /// Ringing ended on this event
    pub stop: bool,
}

/// Main clock FSM implementation
pub struct ClockStateMachine {
    state: ClockState,
    clock: TickCounter,
    alarm: AlarmConfig,
    display: DisplayState,
    config: ClockConfig,
    /// Minute the alarm last rang in, held until the clock leaves it
    fired_minute: Option<TimeValue>,
}

impl ClockStateMachine {
    /// Create new FSM with given configuration
    pub fn new(config: ClockConfig) -> Self {
        Self {
            state: ClockState::Clock,
            clock: TickCounter::seeded(config.initial_time),
            alarm: AlarmConfig::new(config.alarm_time, config.alarm_enabled),
            display: DisplayState::new(),
            config,
            fired_minute: None,
        }
    }

    /// Replace the tick counter, e.g. to start mid-second
    pub fn with_tick_counter(mut self, clock: TickCounter) -> Self {
        self.clock = clock;
        self
    }

    /// Get current FSM state
    pub fn current_state(&self) -> ClockState {
        self.state
    }

    pub fn mode(&self) -> Mode {
        self.state.mode()
    }

    /// Running clock time
    pub fn clock_time(&self) -> TimeValue {
        self.clock.time()
    }

    pub fn alarm(&self) -> &AlarmConfig {
        &self.alarm
    }

    /// Edit buffer, present only in SET_CLOCK / SET_ALARM
    pub fn edit_buffer(&self) -> Option<EditBuffer> {
        match self.state {
            ClockState::Editing(edit) => Some(edit),
            _ => None,
        }
    }

    pub fn display_state(&self) -> DisplayState {
        self.display
    }

    /// Remaining ringing ticks while ringing
    pub fn ring_ticks_remaining(&self) -> Option<u8> {
        match self.state {
            ClockState::AlarmRinging { ticks_left } => Some(ticks_left),
            _ => None,
        }
    }

    /// Remaining "OFF" notice ticks while the notice is up
    pub fn notice_ticks_remaining(&self) -> Option<u8> {
        match self.state {
            ClockState::AlarmOffNotice { ticks_left } => Some(ticks_left),
            _ => None,
        }
    }

    /// Would the alarm fire if the current time were evaluated now
    pub fn alarm_due(&self) -> bool {
        let now = self.clock.time();
        self.state == ClockState::Clock
            && !self.fired_minute.is_some_and(|fired| fired.same_minute(&now))
            && AlarmEvaluator::should_trigger(now, &self.alarm)
    }

    /// Get current configuration
    pub fn config(&self) -> &ClockConfig {
        &self.config
    }

    /// Process one event to completion, without touching hardware
    pub fn handle(&mut self, event: ClockEvent) -> Effects {
        match event {
            ClockEvent::Tick => self.tick(),
            ClockEvent::Button(button) => self.press(button),
            ClockEvent::AlarmSwitch(enabled) => {
                self.set_alarm_enabled(enabled);
                Effects::default()
            }
        }
    }

    /// Advance the clock by one tick period and run the mode's countdowns
    pub fn tick(&mut self) -> Effects {
        let now = self.clock.advance(self.config.tick_ms());
        // Only leaving the fired minute re-arms, the switch does not
        if self.fired_minute.is_some_and(|fired| !fired.same_minute(&now)) {
            self.fired_minute = None;
        }

        let mut effects = Effects::default();
        match self.state {
            ClockState::Clock => {
                if self.fired_minute.is_none() && AlarmEvaluator::should_trigger(now, &self.alarm) {
                    self.fired_minute = Some(now);
                    #[cfg(feature = "defmt")]
                    defmt::info!("Alarm triggered at {:?}", now);
                    self.enter(ClockState::AlarmRinging {
                        ticks_left: self.config.ring_ticks,
                    });
                }
            }

            ClockState::AlarmRinging { ticks_left } => {
                effects.play = true;
                let ticks_left = ticks_left.saturating_sub(1);
                if ticks_left == 0 {
                    effects.stop = true;
                    self.enter(ClockState::Clock);
                } else {
                    self.state = ClockState::AlarmRinging { ticks_left };
                }
            }

            ClockState::AlarmOffNotice { ticks_left } => {
                let ticks_left = ticks_left.saturating_sub(1);
                if ticks_left == 0 {
                    self.enter(ClockState::Clock);
                } else {
                    self.state = ClockState::AlarmOffNotice { ticks_left };
                }
            }

            ClockState::MenuSet | ClockState::MenuAlarm | ClockState::Editing(_) => {}
        }

        effects
    }

    /// Handle a debounced button press
    pub fn press(&mut self, button: Button) -> Effects {
        if matches!(button, Button::Menu | Button::Ok) {
            self.display.show_all();
        }

        match button {
            Button::Menu => self.handle_menu(),
            Button::Ok => self.handle_ok(),
            Button::Plus | Button::Minus => {
                if let (ClockState::Editing(mut edit), Some(delta)) = (self.state, button.delta()) {
                    edit.adjust(delta);
                    self.state = ClockState::Editing(edit);
                }
                Effects::default()
            }
        }
    }

    /// Follow the alarm enable switch; never changes mode
    pub fn set_alarm_enabled(&mut self, enabled: bool) {
        #[cfg(feature = "defmt")]
        defmt::debug!("Alarm switch: {}", enabled);
        self.alarm.enabled = enabled;
    }

    /// Handle MENU: cycle the menu, or cancel an edit
    fn handle_menu(&mut self) -> Effects {
        match self.state {
            ClockState::Clock => self.enter(ClockState::MenuSet),
            ClockState::MenuSet => self.enter(ClockState::MenuAlarm),
            ClockState::MenuAlarm => self.enter(ClockState::Clock),
            ClockState::Editing(_) => {
                #[cfg(feature = "defmt")]
                defmt::debug!("Edit cancelled");
                self.enter(ClockState::Clock);
            }
            ClockState::AlarmRinging { .. } if self.config.menu_silences_alarm => {
                return self.dismiss_alarm();
            }
            ClockState::AlarmRinging { .. } | ClockState::AlarmOffNotice { .. } => {}
        }
        Effects::default()
    }

    /// Handle OK: open an editor, advance focus, commit, or dismiss the alarm
    fn handle_ok(&mut self) -> Effects {
        match self.state {
            ClockState::MenuSet => {
                let edit = EditBuffer::new(self.clock.time(), CommitTarget::Clock);
                self.enter(ClockState::Editing(edit));
            }
            ClockState::MenuAlarm => {
                if self.alarm.enabled {
                    let edit = EditBuffer::new(self.alarm.time(), CommitTarget::Alarm);
                    self.enter(ClockState::Editing(edit));
                } else {
                    self.enter(ClockState::AlarmOffNotice {
                        ticks_left: self.config.notice_ticks,
                    });
                }
            }
            ClockState::Editing(mut edit) => match edit.focus() {
                Field::Minutes => {
                    let _target = edit.commit(&mut self.clock, &mut self.alarm);
                    #[cfg(feature = "defmt")]
                    defmt::info!("Committed {:?} to {:?}", edit.time(), _target);
                    self.enter(ClockState::Clock);
                }
                Field::Hours => {
                    edit.toggle_focus();
                    self.enter(ClockState::Editing(edit));
                }
            },
            ClockState::AlarmRinging { .. } => return self.dismiss_alarm(),
            ClockState::Clock | ClockState::AlarmOffNotice { .. } => {}
        }
        Effects::default()
    }

    fn dismiss_alarm(&mut self) -> Effects {
        #[cfg(feature = "defmt")]
        defmt::info!("Alarm dismissed");
        self.enter(ClockState::Clock);
        Effects { play: false, stop: true }
    }

    /// Transition: every entry lights the whole display and installs the
    /// new mode's blink mask
    fn enter(&mut self, next: ClockState) {
        #[cfg(feature = "defmt")]
        defmt::debug!("Mode {:?} -> {:?}", self.state.mode(), next.mode());
        self.state = next;
        self.display.reset(Renderer::blink_mask(next.mode(), next.focus()));
    }

    /// Renderer inputs for the current mode
    pub fn view(&self) -> View {
        let time = match self.state {
            ClockState::Editing(edit) => edit.time(),
            ClockState::AlarmRinging { .. } => self.alarm.time(),
            ClockState::Clock
            | ClockState::MenuSet
            | ClockState::MenuAlarm
            | ClockState::AlarmOffNotice { .. } => self.clock.time(),
        };
        View {
            mode: self.mode(),
            time,
            focus: self.state.focus(),
        }
    }

    /// Frame for a tick: flips the blink mask once
    pub fn render_tick(&mut self) -> Frame {
        let view = self.view();
        Renderer::render_tick(&view, &mut self.display)
    }

    /// Frame for a forced redraw: current bits, no flip
    pub fn frame(&self) -> Frame {
        Renderer::frame(&self.view(), &self.display)
    }

    /// Tick interrupt body: advance, check alarm, render, drive outputs
    pub fn on_tick<D, B>(&mut self, display: &mut D, buzzer: &mut B) -> Result<Frame, HalError>
    where
        D: DisplaySink,
        B: Buzzer,
    {
        let effects = self.tick();
        let frame = self.render_tick();
        let shown = display.show(&frame).map_err(|_| HalError::DisplayError);
        let sounded = Self::apply(effects, buzzer);
        shown?;
        sounded?;
        Ok(frame)
    }

    /// Button interrupt body: transition, then full redraw
    pub fn on_button<D, B>(&mut self, button: Button, display: &mut D, buzzer: &mut B) -> Result<Frame, HalError>
    where
        D: DisplaySink,
        B: Buzzer,
    {
        let effects = self.press(button);
        let shown = self.redraw(display);
        let sounded = Self::apply(effects, buzzer);
        sounded?;
        shown
    }

    /// Switch interrupt body
    pub fn on_alarm_switch_changed<D>(&mut self, enabled: bool, display: &mut D) -> Result<Frame, HalError>
    where
        D: DisplaySink,
    {
        self.set_alarm_enabled(enabled);
        self.redraw(display)
    }

    /// Route any event to its interrupt body
    pub fn dispatch<D, B>(&mut self, event: ClockEvent, display: &mut D, buzzer: &mut B) -> Result<Frame, HalError>
    where
        D: DisplaySink,
        B: Buzzer,
    {
        match event {
            ClockEvent::Tick => self.on_tick(display, buzzer),
            ClockEvent::Button(button) => self.on_button(button, display, buzzer),
            ClockEvent::AlarmSwitch(enabled) => self.on_alarm_switch_changed(enabled, display),
        }
    }

    /// Push the current frame without flipping the blink mask
    pub fn redraw<D: DisplaySink>(&self, display: &mut D) -> Result<Frame, HalError> {
        let frame = self.frame();
        display.show(&frame).map_err(|_| HalError::DisplayError)?;
        Ok(frame)
    }

    /// Drain every pending event from an interrupt-fed queue
    pub fn drain<D, B>(&mut self, events: &EventQueue, display: &mut D, buzzer: &mut B) -> Result<usize, HalError>
    where
        D: DisplaySink,
        B: Buzzer,
    {
        let mut handled = 0;
        let mut first_error = None;
        while let Some(event) = events.next() {
            if let Err(e) = self.dispatch(event, display, buzzer) {
                first_error.get_or_insert(e);
            }
            handled += 1;
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(handled),
        }
    }

    fn apply<B: Buzzer>(effects: Effects, buzzer: &mut B) -> Result<(), HalError> {
        if effects.play {
            buzzer.play().map_err(|_| HalError::BuzzerError)?;
        }
        if effects.stop {
            buzzer.stop().map_err(|_| HalError::BuzzerError)?;
        }
        Ok(())
    }

    /// Reset FSM to the configured power-up state
    pub fn reset(&mut self) {
        *self = Self::new(self.config);
    }
}

/// Async task owning the state machine: drains interrupt events every
/// `poll_interval` and runs one tick per `tick_period` on a fixed schedule
#[cfg(feature = "embassy-time")]
pub async fn clock_task<D, B>(events: &EventQueue, mut display: D, mut buzzer: B, config: ClockConfig)
where
    D: DisplaySink,
    B: Buzzer,
{
    use embassy_time::{Instant, Timer};

    let mut clock = ClockStateMachine::new(config);
    if let Err(_e) = clock.redraw(&mut display) {
        #[cfg(feature = "defmt")]
        defmt::warn!("Power-up redraw failed: {:?}", _e);
    }
    let mut next_tick = Instant::now() + config.tick_period;

    loop {
        if let Err(_e) = clock.drain(events, &mut display, &mut buzzer) {
            #[cfg(feature = "defmt")]
            defmt::warn!("Event handling failed: {:?}", _e);
        }

        if Instant::now() >= next_tick {
            // Deadline-based so the tick period does not drift
            next_tick += config.tick_period;
            if let Err(_e) = clock.on_tick(&mut display, &mut buzzer) {
                #[cfg(feature = "defmt")]
                defmt::warn!("Tick output failed: {:?}", _e);
            }

            #[cfg(feature = "defmt")]
            defmt::trace!("Clock: {:?} {:?}", clock.mode(), clock.clock_time());
        }

        let poll_at = Instant::now() + config.poll_interval;
        Timer::at(if poll_at < next_tick { poll_at } else { next_tick }).await;
    }
}
