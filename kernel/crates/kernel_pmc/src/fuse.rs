//! Fuse redirection and the PS18 fuse latch

use log::trace;

use crate::access::Pmc;
use crate::hal::Hal;
use crate::port::RegisterPort;
use crate::regs::{self, FuseCtrl};

/// Time the latch needs after each step.
const LATCH_DELAY_MS: u32 = 1;

/// PS18 latch state decoded from `FUSE_CTRL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatchState {
    Unlatched,
    /// Between the two steps of a set or clear, or neither bit asserted.
    Latching,
    Latched,
}

impl LatchState {
    fn decode(ctrl: FuseCtrl) -> Self {
        let set = ctrl.contains(FuseCtrl::PS18_LATCH_SET);
        let clear = ctrl.contains(FuseCtrl::PS18_LATCH_CLEAR);
        match (set, clear) {
            (true, false) => Self::Latched,
            (false, true) => Self::Unlatched,
            _ => Self::Latching,
        }
    }
}

impl<P: RegisterPort, H: Hal> Pmc<P, H> {
    /// Turn fuse redirection on if it is off.
    pub fn fuse_enable_mirroring(&self) {
        self.with_lock_irqsave(|| {
            let ctrl = FuseCtrl::from_bits_retain(self.readl(regs::FUSE_CTRL));
            if !ctrl.contains(FuseCtrl::ENABLE_REDIRECTION) {
                self.writel(FuseCtrl::ENABLE_REDIRECTION.bits(), regs::FUSE_CTRL);
            }
        });
    }

    /// Turn fuse redirection off if it is on.
    pub fn fuse_disable_mirroring(&self) {
        self.with_lock_irqsave(|| {
            let ctrl = FuseCtrl::from_bits_retain(self.readl(regs::FUSE_CTRL));
            if ctrl.contains(FuseCtrl::ENABLE_REDIRECTION) {
                self.writel(FuseCtrl::DISABLE_REDIRECTION.bits(), regs::FUSE_CTRL);
            }
        });
    }

    /// Latch the PS18 fuses. Sleeps; not for interrupt context.
    pub fn fuse_ps18_latch_set(&self) {
        self.fuse_ps18_latch(FuseCtrl::PS18_LATCH_SET, FuseCtrl::PS18_LATCH_CLEAR);
    }

    /// Release the PS18 fuse latch. Sleeps; not for interrupt context.
    pub fn fuse_ps18_latch_clear(&self) {
        self.fuse_ps18_latch(FuseCtrl::PS18_LATCH_CLEAR, FuseCtrl::PS18_LATCH_SET);
    }

    pub fn fuse_ps18_latch_state(&self) -> LatchState {
        LatchState::decode(FuseCtrl::from_bits_retain(self.get(regs::FUSE_CTRL)))
    }

    /// Drop `release`, wait, raise `assert`, wait.
    ///
    /// The read and the first write form one locked read-modify-write. The
    /// second write is a locked store of that same value plus `assert`; it is
    /// not re-read. Both sleeps run with the lock released.
    fn fuse_ps18_latch(&self, assert: FuseCtrl, release: FuseCtrl) {
        let mut ctrl = self.with_lock_irqsave(|| {
            let mut ctrl = FuseCtrl::from_bits_retain(self.readl(regs::FUSE_CTRL));
            ctrl.remove(release);
            self.writel(ctrl.bits(), regs::FUSE_CTRL);
            ctrl
        });
        self.hal().msleep(LATCH_DELAY_MS);

        ctrl.insert(assert);
        self.with_lock_irqsave(|| self.writel(ctrl.bits(), regs::FUSE_CTRL));
        self.hal().msleep(LATCH_DELAY_MS);

        trace!("fuse_ctrl={:#x}", ctrl.bits());
    }
}
