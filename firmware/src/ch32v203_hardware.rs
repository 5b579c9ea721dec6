//! CH32V203 Hardware Implementation
//!
//! 64KB Flash / 20KB RAM. Buttons and the alarm switch sit on EXTI lines
//! and only post into [`EVENTS`]; the clock task owns everything else.

use core::convert::Infallible;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use embassy_time::Instant;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

use clock_core::{Button, EmbeddedHalBuzzer, EventQueue, HalError};

use crate::tm1637::Tm1637Display;

/// Interrupt-fed input events, drained by the clock task
pub static EVENTS: EventQueue = EventQueue::new();

/// Output line on GPIOA; readable back, which open-drain lines need
pub struct PortAPin<const N: u8>;

impl<const N: u8> PortAPin<N> {
    /// Push-pull output, driven low
    fn push_pull() -> Self {
        regs::set_mode(N, regs::MODE_PUSH_PULL);
        regs::write(regs::GPIOA_BSHR, 1 << (N + 16));
        Self
    }

    /// Open-drain output, released high
    fn open_drain() -> Self {
        regs::set_mode(N, regs::MODE_OPEN_DRAIN);
        regs::write(regs::GPIOA_BSHR, 1 << N);
        Self
    }
}

impl<const N: u8> ErrorType for PortAPin<N> {
    type Error = Infallible;
}

impl<const N: u8> OutputPin for PortAPin<N> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        regs::write(regs::GPIOA_BSHR, 1 << (N + 16));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        regs::write(regs::GPIOA_BSHR, 1 << N);
        Ok(())
    }
}

impl<const N: u8> InputPin for PortAPin<N> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(regs::read(regs::GPIOA_INDR) & (1 << N) != 0)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}

pub type DisplayClk = PortAPin<{ pins::DISPLAY_CLK }>;
pub type DisplayDio = PortAPin<{ pins::DISPLAY_DIO }>;
pub type ClockDisplay = Tm1637Display;
pub type ClockBuzzer = EmbeddedHalBuzzer<PortAPin<{ pins::BUZZER }>>;

/// Debounced push button on one EXTI line (active-low, pull-up)
pub struct ButtonInput {
    button: Button,
    pressed: AtomicBool,
    last_edge: AtomicU32,
}

impl ButtonInput {
    pub const fn new(button: Button) -> Self {
        Self {
            button,
            pressed: AtomicBool::new(false),
            last_edge: AtomicU32::new(0),
        }
    }

    /// Called from the EXTI handler on both edges.
    ///
    /// Posts once per press; presses inside the debounce window of the
    /// previous one are dropped.
    pub fn on_interrupt(&self, pressed: bool, events: &EventQueue) -> Result<(), HalError> {
        let was_pressed = self.pressed.swap(pressed, Ordering::Relaxed);
        if !pressed || was_pressed {
            return Ok(());
        }

        let now_ms = Instant::now().as_millis() as u32;
        let last_ms = self.last_edge.load(Ordering::Relaxed);
        if now_ms.wrapping_sub(last_ms) < timing::DEBOUNCE_MS {
            return Ok(());
        }
        self.last_edge.store(now_ms, Ordering::Relaxed);
        events.post_button(self.button)
    }
}

/// Alarm enable slide switch; posts every level change
pub struct AlarmSwitchInput {
    enabled: AtomicBool,
}

impl AlarmSwitchInput {
    pub const fn new() -> Self {
        Self {
            enabled: AtomicBool::new(false),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn on_interrupt(&self, enabled: bool, events: &EventQueue) -> Result<(), HalError> {
        if self.enabled.swap(enabled, Ordering::Relaxed) != enabled {
            events.post_alarm_switch(enabled)
        } else {
            Ok(())
        }
    }
}

pub static MENU_BUTTON: ButtonInput = ButtonInput::new(Button::Menu);
pub static PLUS_BUTTON: ButtonInput = ButtonInput::new(Button::Plus);
pub static MINUS_BUTTON: ButtonInput = ButtonInput::new(Button::Minus);
pub static OK_BUTTON: ButtonInput = ButtonInput::new(Button::Ok);
pub static ALARM_SWITCH: AlarmSwitchInput = AlarmSwitchInput::new();

/// Display and buzzer, handed to the clock task
pub struct Ch32v203ClockHal {
    pub display: ClockDisplay,
    pub buzzer: ClockBuzzer,
}

impl Ch32v203ClockHal {
    pub fn new() -> Self {
        // GPIOA and AFIO are gated off after reset
        regs::enable_port_clocks();
        Self {
            display: Tm1637Display::new(PortAPin::open_drain(), PortAPin::open_drain(), timing::BRIGHTNESS),
            buzzer: EmbeddedHalBuzzer::new(PortAPin::push_pull(), false),
        }
    }

    /// Clear the display, then configure the input lines, their EXTI
    /// interrupts and the SysTick
    pub fn initialize(&mut self) -> Result<(), HalError> {
        self.display.init()?;

        for line in pins::INPUTS {
            regs::configure_input_pull_up(line);
        }
        let lines = pins::INPUTS.iter().fold(0u32, |mask, line| mask | 1 << line);
        regs::write(regs::EXTI_RTENR, lines);
        regs::write(regs::EXTI_FTENR, lines);
        regs::write(regs::EXTI_INTENR, lines);
        regs::write(regs::PFIC_IENR1, regs::EXTI0_4_IRQ_MASK);

        // Latch the switch level at power-up
        let level = regs::read(regs::GPIOA_INDR) & (1 << pins::ALARM_SWITCH) != 0;
        ALARM_SWITCH.enabled.store(!level, Ordering::Relaxed);

        regs::start_systick(embassy_time::TICK_HZ as u32);

        // SAFETY: every handler reachable from the trap entry is installed
        unsafe { riscv::interrupt::enable() };

        #[cfg(feature = "defmt")]
        defmt::info!("CH32V203 HAL initialized");
        Ok(())
    }

    pub fn into_parts(self) -> (ClockDisplay, ClockBuzzer) {
        (self.display, self.buzzer)
    }
}

impl Default for Ch32v203ClockHal {
    fn default() -> Self {
        Self::new()
    }
}

/// Trap entry for every PFIC interrupt.
///
/// With `mtvec` in unified-entry mode the IRQ number arrives in `mcause`.
pub fn handle_interrupt() {
    match riscv::register::mcause::read().code() {
        irq::SYSTICK => handle_systick_interrupt(),
        code @ irq::EXTI0..=irq::EXTI4 => handle_exti_interrupt((code - irq::EXTI0) as u8),
        _code => {
            #[cfg(feature = "defmt")]
            defmt::warn!("Unexpected IRQ {}", _code);
        }
    }
}

/// EXTI line handler body: sample the pin, acknowledge, post.
///
/// Inputs are active-low, so a low level means pressed / switch on.
fn handle_exti_interrupt(line: u8) {
    regs::write(regs::EXTI_INTFR, 1 << line);
    let active = regs::read(regs::GPIOA_INDR) & (1 << line) == 0;
    let result = match line {
        pins::MENU => MENU_BUTTON.on_interrupt(active, &EVENTS),
        pins::PLUS => PLUS_BUTTON.on_interrupt(active, &EVENTS),
        pins::MINUS => MINUS_BUTTON.on_interrupt(active, &EVENTS),
        pins::OK => OK_BUTTON.on_interrupt(active, &EVENTS),
        pins::ALARM_SWITCH => ALARM_SWITCH.on_interrupt(active, &EVENTS),
        _ => Ok(()),
    };
    if let Err(_e) = result {
        #[cfg(feature = "defmt")]
        defmt::warn!("EXTI{}: {:?}", line, _e);
    }
}

/// Acknowledge the SysTick compare interrupt and advance embassy time
fn handle_systick_interrupt() {
    regs::write(regs::STK_SR, 0);
    crate::time_driver::on_systick();
}

/// PFIC interrupt numbers
mod irq {
    pub const SYSTICK: usize = 12;
    pub const EXTI0: usize = 22;
    pub const EXTI4: usize = 26;
}

/// Memory-mapped registers used by this board
mod regs {
    const RCC_APB2PCENR: usize = 0x4002_1018;
    const AFIOEN: u32 = 1 << 0;
    const IOPAEN: u32 = 1 << 2;

    const GPIOA_BASE: usize = 0x4001_0800;
    pub const GPIOA_CFGLR: usize = GPIOA_BASE;
    pub const GPIOA_INDR: usize = GPIOA_BASE + 0x08;
    pub const GPIOA_BSHR: usize = GPIOA_BASE + 0x10;

    /// CFGLR nibbles, 2 MHz outputs
    pub const MODE_PUSH_PULL: u32 = 0b0010;
    pub const MODE_OPEN_DRAIN: u32 = 0b0110;

    const EXTI_BASE: usize = 0x4001_0400;
    pub const EXTI_INTENR: usize = EXTI_BASE;
    pub const EXTI_RTENR: usize = EXTI_BASE + 0x08;
    pub const EXTI_FTENR: usize = EXTI_BASE + 0x0C;
    pub const EXTI_INTFR: usize = EXTI_BASE + 0x14;

    pub const PFIC_IENR1: usize = 0xE000_E100;
    /// EXTI0-EXTI4 are IRQ 22-26
    pub const EXTI0_4_IRQ_MASK: u32 = 0b1_1111 << super::irq::EXTI0;
    const SYSTICK_IRQ_MASK: u32 = 1 << super::irq::SYSTICK;

    const STK_CTLR: usize = 0xE000_F000;
    pub const STK_SR: usize = 0xE000_F004;
    const STK_CMPLR: usize = 0xE000_F010;

    /// HSI without PLL
    const HCLK_HZ: u32 = 8_000_000;

    pub fn read(addr: usize) -> u32 {
        // SAFETY: fixed, aligned peripheral register address
        unsafe { core::ptr::read_volatile(addr as *const u32) }
    }

    pub fn write(addr: usize, value: u32) {
        // SAFETY: fixed, aligned peripheral register address
        unsafe { core::ptr::write_volatile(addr as *mut u32, value) }
    }

    pub fn set_mode(line: u8, mode: u32) {
        let shift = (line as u32) * 4;
        let cfg = read(GPIOA_CFGLR) & !(0xF << shift);
        write(GPIOA_CFGLR, cfg | (mode << shift));
    }

    pub fn enable_port_clocks() {
        write(RCC_APB2PCENR, read(RCC_APB2PCENR) | IOPAEN | AFIOEN);
    }

    /// Input with pull-up (pull direction set through OUTDR)
    pub fn configure_input_pull_up(line: u8) {
        set_mode(line, 0b1000);
        write(GPIOA_BSHR, 1 << line);
    }

    /// Auto-reloading compare interrupt at `hz`
    pub fn start_systick(hz: u32) {
        write(STK_CMPLR, HCLK_HZ / hz - 1);
        write(STK_SR, 0);
        // STE | STIE | STCLK (HCLK) | STRE
        write(STK_CTLR, 0b1111);
        write(PFIC_IENR1, SYSTICK_IRQ_MASK);
    }
}

pub mod timing {
    /// Ignore edges closer together than this
    pub const DEBOUNCE_MS: u32 = 20;

    /// TM1637 brightness step
    pub const BRIGHTNESS: tm1637_embedded_hal::Brightness = tm1637_embedded_hal::Brightness::L4;
}

/// CH32V203 pin configuration constants (all on GPIOA)
pub mod pins {
    pub const MENU: u8 = 0;
    pub const PLUS: u8 = 1;
    pub const MINUS: u8 = 2;
    pub const OK: u8 = 3;
    pub const ALARM_SWITCH: u8 = 4;
    pub const INPUTS: [u8; 5] = [MENU, PLUS, MINUS, OK, ALARM_SWITCH];

    pub const DISPLAY_CLK: u8 = 5;
    pub const DISPLAY_DIO: u8 = 6;
    pub const BUZZER: u8 = 7;
}
