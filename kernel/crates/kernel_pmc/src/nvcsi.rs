//! NVCSI camera brick DPD
//!
//! The A/B bricks are requested in `IO_DPD_REQ`, C through F in
//! `IO_DPD2_REQ`. These are plain masked updates on the request registers;
//! unlike the pad DPD sequence nothing waits for or checks a status.

use crate::access::Pmc;
use crate::hal::Hal;
use crate::port::RegisterPort;
use crate::regs::{self, NvcsiAb, NvcsiCdef};

impl<P: RegisterPort, H: Hal> Pmc<P, H> {
    pub fn nvcsi_ab_brick_update(&self, mask: u32, value: u32) {
        self.update(regs::IO_DPD_REQ, mask, value);
    }

    pub fn nvcsi_ab_brick_getstatus(&self) -> u32 {
        self.get(regs::IO_DPD_REQ)
    }

    pub fn nvcsi_cdef_brick_update(&self, mask: u32, value: u32) {
        self.update(regs::IO_DPD2_REQ, mask, value);
    }

    pub fn nvcsi_cdef_brick_getstatus(&self) -> u32 {
        self.get(regs::IO_DPD2_REQ)
    }

    /// Put every NVCSI brick into DPD.
    pub fn enable_nvcsi_brick_dpd(&self) {
        self.set_nvcsi_bricks(true);
    }

    /// Take every NVCSI brick out of DPD.
    pub fn disable_nvcsi_brick_dpd(&self) {
        self.set_nvcsi_bricks(false);
    }

    fn set_nvcsi_bricks(&self, dpd: bool) {
        let ab = NvcsiAb::all().bits();
        let cdef = NvcsiCdef::all().bits();
        self.with_lock_irqsave(|| {
            self.modify(regs::IO_DPD_REQ, ab, if dpd { ab } else { 0 });
            self.modify(regs::IO_DPD2_REQ, cdef, if dpd { cdef } else { 0 });
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::sim::{SimEvent, SimHal, SimRegisters};

    fn pmc() -> (Arc<SimRegisters>, Pmc<Arc<SimRegisters>, SimHal>) {
        let regs = Arc::new(SimRegisters::new());
        let pmc = Pmc::new(regs.clone(), SimHal::new(regs.clone()));
        (regs, pmc)
    }

    #[test]
    fn enable_then_disable_round_trips_all_bricks() {
        let (_, pmc) = pmc();

        pmc.enable_nvcsi_brick_dpd();
        assert_eq!(pmc.nvcsi_ab_brick_getstatus() & 0x3, 0x3);
        assert_eq!(pmc.nvcsi_cdef_brick_getstatus() & 0x7800, 0x7800);

        pmc.disable_nvcsi_brick_dpd();
        assert_eq!(pmc.nvcsi_ab_brick_getstatus(), 0);
        assert_eq!(pmc.nvcsi_cdef_brick_getstatus(), 0);
    }

    #[test]
    fn composite_keeps_other_request_bits() {
        let (regs, pmc) = pmc();
        regs.poke(regs::IO_DPD_REQ, 0x100);
        regs.poke(regs::IO_DPD2_REQ, 0x1);

        pmc.enable_nvcsi_brick_dpd();
        pmc.disable_nvcsi_brick_dpd();

        assert_eq!(regs.peek(regs::IO_DPD_REQ), 0x100);
        assert_eq!(regs.peek(regs::IO_DPD2_REQ), 0x1);
    }

    #[test]
    fn composite_is_two_writes_under_one_lock_hold() {
        let (regs, pmc) = pmc();
        regs.clear_trace();

        pmc.enable_nvcsi_brick_dpd();

        let trace = regs.trace();
        assert_eq!(trace.first(), Some(&SimEvent::IrqSave));
        assert_eq!(trace.last(), Some(&SimEvent::IrqRestore));
        assert_eq!(
            regs.writes(),
            [(regs::IO_DPD_REQ, 0x3), (regs::IO_DPD2_REQ, 0x7800)]
        );
    }

    #[test]
    fn brick_updates_are_masked() {
        let (_, pmc) = pmc();

        pmc.nvcsi_ab_brick_update(NvcsiAb::CSIB.bits(), 0xffff_ffff);
        pmc.nvcsi_cdef_brick_update(NvcsiCdef::CSID.bits(), NvcsiCdef::CSID.bits());

        assert_eq!(pmc.nvcsi_ab_brick_getstatus(), NvcsiAb::CSIB.bits());
        assert_eq!(pmc.nvcsi_cdef_brick_getstatus(), NvcsiCdef::CSID.bits());
    }
}
