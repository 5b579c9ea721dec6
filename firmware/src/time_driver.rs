//! Embassy time driver on the CH32V203 SysTick
//!
//! SysTick fires at `embassy_time::TICK_HZ`; one alarm slot is enough for
//! the generic timer queue.

use core::cell::Cell;

use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};
use embassy_time_driver::{AlarmHandle, Driver};
use portable_atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

const NO_ALARM: u64 = u64::MAX;

pub struct SysTickDriver {
    ticks: AtomicU64,
    alarm_allocated: AtomicBool,
    alarm_at: AtomicU64,
    callback: Mutex<CriticalSectionRawMutex, Cell<Option<fn(*mut ())>>>,
    callback_ctx: AtomicUsize,
}

impl SysTickDriver {
    const fn new() -> Self {
        Self {
            ticks: AtomicU64::new(0),
            alarm_allocated: AtomicBool::new(false),
            alarm_at: AtomicU64::new(NO_ALARM),
            callback: Mutex::const_new(CriticalSectionRawMutex::new(), Cell::new(None)),
            callback_ctx: AtomicUsize::new(0),
        }
    }

    /// SysTick interrupt body
    pub fn on_tick(&self) {
        let now = self.ticks.fetch_add(1, Ordering::Relaxed) + 1;
        if now >= self.alarm_at.load(Ordering::Relaxed) {
            self.alarm_at.store(NO_ALARM, Ordering::Relaxed);
            self.fire();
        }
    }

    fn fire(&self) {
        let ctx = self.callback_ctx.load(Ordering::Relaxed) as *mut ();
        if let Some(callback) = self.callback.lock(|cell| cell.get()) {
            callback(ctx);
        }
    }
}

impl Driver for SysTickDriver {
    fn now(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    unsafe fn allocate_alarm(&self) -> Option<AlarmHandle> {
        if self.alarm_allocated.swap(true, Ordering::Relaxed) {
            None
        } else {
            Some(AlarmHandle::new(0))
        }
    }

    fn set_alarm_callback(&self, _alarm: AlarmHandle, callback: fn(*mut ()), ctx: *mut ()) {
        self.callback_ctx.store(ctx as usize, Ordering::Relaxed);
        self.callback.lock(|cell| cell.set(Some(callback)));
    }

    // A timestamp already passed is refused; the queue then fires it itself
    fn set_alarm(&self, _alarm: AlarmHandle, timestamp: u64) -> bool {
        if timestamp <= self.now() {
            self.alarm_at.store(NO_ALARM, Ordering::Relaxed);
            return false;
        }
        self.alarm_at.store(timestamp, Ordering::Relaxed);
        true
    }
}

embassy_time_driver::time_driver_impl!(static DRIVER: SysTickDriver = SysTickDriver::new());

/// Call from the SysTick handler
pub fn on_systick() {
    DRIVER.on_tick();
}

// Critical section implementation for single-hart RISC-V
critical_section::set_impl!(RiscvCriticalSection);

struct RiscvCriticalSection;

unsafe impl critical_section::Impl for RiscvCriticalSection {
    unsafe fn acquire() -> u8 {
        let was_enabled = riscv::register::mstatus::read().mie();
        riscv::interrupt::disable();
        was_enabled as u8
    }

    unsafe fn release(was_enabled: u8) {
        if was_enabled != 0 {
            riscv::interrupt::enable();
        }
    }
}
