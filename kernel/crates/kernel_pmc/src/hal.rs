//! Platform hooks: interrupt masking and delays
//!
//! The DPD sequence waits microseconds with the access lock held and must
//! never yield, while the fuse latch waits milliseconds and should. These are
//! two separate primitives and one is never used in place of the other.

/// Interrupt masking and delay primitives used by [`crate::Pmc`].
pub trait Hal {
    /// Mask local interrupts, returning whether they were enabled before.
    fn irq_save(&self) -> bool;

    /// Restore the state returned by [`Hal::irq_save`].
    fn irq_restore(&self, were_enabled: bool);

    /// Busy-wait for at least `us` microseconds without yielding the CPU.
    fn udelay(&self, us: u32);

    /// Wait at least `ms` milliseconds. May yield to the scheduler.
    fn msleep(&self, ms: u32);
}

impl<T: Hal + ?Sized> Hal for &T {
    fn irq_save(&self) -> bool {
        (**self).irq_save()
    }

    fn irq_restore(&self, were_enabled: bool) {
        (**self).irq_restore(were_enabled);
    }

    fn udelay(&self, us: u32) {
        (**self).udelay(us);
    }

    fn msleep(&self, ms: u32) {
        (**self).msleep(ms);
    }
}

#[cfg(target_arch = "aarch64")]
pub use aarch64::GenericTimerHal;

#[cfg(target_arch = "aarch64")]
mod aarch64 {
    use aarch64_cpu::registers::*;

    use super::Hal;

    /// ARM64 implementation using DAIF for IRQ masking and the generic timer
    /// for busy-waits.
    ///
    /// Millisecond waits are handed to `sleep`, which should block the
    /// current task through the scheduler.
    pub struct GenericTimerHal {
        sleep: fn(u32),
    }

    impl GenericTimerHal {
        pub const fn new(sleep: fn(u32)) -> Self {
            Self { sleep }
        }
    }

    impl Hal for GenericTimerHal {
        fn irq_save(&self) -> bool {
            let daif: u64;
            // SAFETY: reading DAIF has no side effects. Bit 7 (I) is the IRQ
            // mask; setting it through daifset only affects delivery.
            unsafe {
                core::arch::asm!("mrs {}, daif", out(reg) daif);
                core::arch::asm!("msr daifset, #2");
            }
            (daif & 0x80) == 0
        }

        fn irq_restore(&self, were_enabled: bool) {
            if were_enabled {
                // SAFETY: clears the IRQ mask that irq_save set.
                unsafe {
                    core::arch::asm!("msr daifclr, #2");
                }
            }
        }

        fn udelay(&self, us: u32) {
            let ticks = CNTFRQ_EL0.get() * u64::from(us) / 1_000_000;
            let start = CNTPCT_EL0.get();
            while CNTPCT_EL0.get().wrapping_sub(start) <= ticks {
                core::hint::spin_loop();
            }
        }

        fn msleep(&self, ms: u32) {
            (self.sleep)(ms);
        }
    }
}
