//! Deep-sleep entry with a timer or alarm wake-up.
//!
//! The microcontroller side of a battery-powered logger: arm a periodic wake
//! timer (typically a watchdog in interrupt mode), suspend the CPU, and
//! report what woke it. A DS3231 alarm routed to an external interrupt pin is
//! the other wake source; it needs no cooperation from this module beyond
//! returning [`WakeSource::External`].
//!
//! The timer interrupt handler must stay minimal. Call
//! [`handle_wake_interrupt`] from it: it disarms the timer and raises a
//! [`WakeFlag`], nothing else. Never touch the RTC bus from interrupt
//! context.
//!
//! ```rust,ignore
//! static WAKE: WakeFlag = WakeFlag::new();
//!
//! #[interrupt]
//! fn WDT() {
//!     // SAFETY: only the ISR touches the watchdog while asleep
//!     let mut wdt = unsafe { Watchdog::steal() };
//!     handle_wake_interrupt(&mut wdt, &WAKE);
//! }
//!
//! let mut sleep = SleepController::new(board, &WAKE);
//! match sleep.enter_low_power_mode()? {
//!     WakeSource::Timer => { /* periodic work */ }
//!     WakeSource::External => rtc.clear_alarm1_flag()?,
//! }
//! ```

use core::sync::atomic::{AtomicBool, Ordering};

/// Platform hooks used by [`SleepController`], called from thread context.
pub trait SleepHardware {
    /// Platform error type
    type Error;

    /// Starts the wake timer with its interrupt enabled.
    fn arm_wake_timer(&mut self) -> Result<(), Self::Error>;

    /// Stops the wake timer. Must be harmless if it is already stopped.
    fn disarm_wake_timer(&mut self) -> Result<(), Self::Error>;

    /// Powers down peripherals and halts the CPU until the next interrupt,
    /// then undoes whatever it changed before returning.
    fn suspend(&mut self);
}

/// The part of the wake timer reachable from its own interrupt handler.
pub trait WakeTimer {
    /// Stops the timer so it neither fires again nor resets the chip.
    fn disarm(&mut self);
}

/// Set by the wake-timer interrupt, read by the sleeping thread.
///
/// Uses plain loads and stores so it works on cores without atomic
/// read-modify-write instructions.
#[derive(Debug, Default)]
pub struct WakeFlag(AtomicBool);

impl WakeFlag {
    /// A lowered flag, usable in a `static`.
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Called from the wake-timer interrupt.
    pub fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Lowers the flag before the next sleep.
    pub fn clear(&self) {
        self.0.store(false, Ordering::Release);
    }

    /// `true` if the wake timer fired since the last [`clear`](Self::clear).
    #[must_use]
    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// What ended a [`SleepController::enter_low_power_mode`] call.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WakeSource {
    /// The wake timer interrupt fired
    Timer,
    /// Any other interrupt, such as the RTC INT/SQW alarm line
    External,
}

/// Body of the wake-timer interrupt handler.
pub fn handle_wake_interrupt<T: WakeTimer + ?Sized>(timer: &mut T, flag: &WakeFlag) {
    timer.disarm();
    flag.raise();
}

/// Drives one sleep cycle at a time over a [`SleepHardware`].
pub struct SleepController<'a, H: SleepHardware> {
    hardware: H,
    wake: &'a WakeFlag,
}

impl<'a, H: SleepHardware> SleepController<'a, H> {
    /// `wake` must be the flag the timer interrupt passes to
    /// [`handle_wake_interrupt`].
    pub fn new(hardware: H, wake: &'a WakeFlag) -> Self {
        Self { hardware, wake }
    }

    /// Arms the wake timer, suspends, and reports the wake source once the
    /// CPU runs again.
    ///
    /// On a timer wake the interrupt handler has already disarmed the timer;
    /// on any other wake it is disarmed here before returning.
    ///
    /// # Errors
    ///
    /// Propagates errors from arming or disarming the timer.
    pub fn enter_low_power_mode(&mut self) -> Result<WakeSource, H::Error> {
        self.wake.clear();
        self.hardware.arm_wake_timer()?;
        debug!("entering low power mode");
        self.hardware.suspend();
        let source = if self.wake.is_raised() {
            self.wake.clear();
            WakeSource::Timer
        } else {
            self.hardware.disarm_wake_timer()?;
            WakeSource::External
        };
        debug!("woke up: {:?}", source);
        Ok(source)
    }

    /// Gives back the hardware.
    pub fn release(self) -> H {
        self.hardware
    }
}
