use crate::access::Pmc;
use crate::hal::Hal;
use crate::port::RegisterPort;
use crate::regs::{self, RamdumpCtl};

impl<P: RegisterPort, H: Hal> Pmc<P, H> {
    /// Whether a FIQ halts the CPUs for a RAM dump instead of being handled.
    pub fn is_halt_in_fiq(&self) -> bool {
        RamdumpCtl::from_bits_retain(self.get(regs::IMPL_RAMDUMP_CTL_STATUS))
            .contains(RamdumpCtl::HALT_IN_FIQ)
    }

    /// Only set from bring-up; nothing clears it.
    pub(crate) fn enable_halt_in_fiq(&self) {
        let halt = RamdumpCtl::HALT_IN_FIQ.bits();
        self.update(regs::IMPL_RAMDUMP_CTL_STATUS, halt, halt);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::sim::{SimHal, SimRegisters};

    #[test]
    fn halt_in_fiq_is_bit_28() {
        let regs = Arc::new(SimRegisters::new());
        let pmc = Pmc::new(regs.clone(), SimHal::new(regs.clone()));
        regs.poke(regs::IMPL_RAMDUMP_CTL_STATUS, 0x0fff_ffff);
        assert!(!pmc.is_halt_in_fiq());

        pmc.enable_halt_in_fiq();

        assert!(pmc.is_halt_in_fiq());
        assert_eq!(regs.peek(regs::IMPL_RAMDUMP_CTL_STATUS), 0x1fff_ffff);
    }
}
