//! I/O pad deep power down
//!
//! Each pad is one bit in one of eight request/status register pairs. A
//! transition is a single request write, a fixed settle of
//! [`DPD_SETTLE_US`], then one status read to confirm. The whole sequence
//! runs with the access lock held and the settle is a busy-wait, so nothing
//! else can touch the block between request and confirmation.
//!
//! The request write is a plain store of the pad's bit, not a
//! read-modify-write: the request registers act on the bits written and
//! ignore zeros.

use core::fmt;

use log::{trace, warn};

use crate::access::Pmc;
use crate::hal::Hal;
use crate::port::RegisterPort;
use crate::regs;

/// Number of DPD request/status register pairs.
pub const DPD_GROUPS: u8 = 8;

/// DPD sampling timer value programmed before an enable request.
const DPD_TIMER: u32 = 0x10;
/// Time the pads need to act on a request.
const DPD_SETTLE_US: u32 = 7;

/// One pad: register pair `index`, bit `bit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DpdGroup {
    index: u8,
    bit: u8,
}

impl DpdGroup {
    /// `None` unless `index < DPD_GROUPS` and `bit < 32`.
    #[must_use]
    pub const fn new(index: u8, bit: u8) -> Option<Self> {
        if index < DPD_GROUPS && bit < 32 {
            Some(Self { index, bit })
        } else {
            None
        }
    }

    pub const fn index(self) -> u8 {
        self.index
    }

    pub const fn bit(self) -> u8 {
        self.bit
    }

    pub const fn mask(self) -> u32 {
        1 << self.bit
    }

    pub const fn req_offset(self) -> u32 {
        regs::IO_DPD_REQ + self.index as u32 * regs::DPD_STRIDE
    }

    pub const fn status_offset(self) -> u32 {
        regs::IO_DPD_STATUS + self.index as u32 * regs::DPD_STRIDE
    }
}

/// Registers are numbered from one in the hardware manual (`IO_DPD_REQ`,
/// `IO_DPD2_REQ`, ...), and so are the log messages.
impl fmt::Display for DpdGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dpd{}.{}", self.index + 1, self.bit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DpdPhase {
    Requested,
    Settling,
    Resolved,
}

impl<P: RegisterPort, H: Hal> Pmc<P, H> {
    /// Put the pad `group` into deep power down.
    ///
    /// A pad that does not report DPD afterwards is logged; the call still
    /// completes.
    pub fn io_dpd_enable(&self, group: DpdGroup) {
        let status = self.with_lock(|| {
            self.writel(DPD_TIMER, regs::IO_SEL_DPD_TIM);
            self.dpd_request(group)
        });
        if status & group.mask() == 0 {
            warn!("dpd{} enable failed, status={status:#x}", group.index() + 1);
        }
    }

    /// Take the pad `group` out of deep power down.
    pub fn io_dpd_disable(&self, group: DpdGroup) {
        let status = self.with_lock(|| self.dpd_request(group));
        if status & group.mask() != 0 {
            warn!("dpd{} disable failed, status={status:#x}", group.index() + 1);
        }
    }

    /// `true` when the pad reports deep power down.
    pub fn io_dpd_status(&self, group: DpdGroup) -> bool {
        self.get(group.status_offset()) & group.mask() != 0
    }

    /// Request, settle, sample. Callers hold the access lock.
    fn dpd_request(&self, group: DpdGroup) -> u32 {
        self.writel(group.mask(), group.req_offset());
        trace!("{group}: {:?}", DpdPhase::Requested);

        trace!("{group}: {:?}", DpdPhase::Settling);
        self.hal().udelay(DPD_SETTLE_US);

        let status = self.readl(group.status_offset());
        trace!("{group}: {:?} status={status:#x}", DpdPhase::Resolved);
        status
    }
}
