//! Masked updates on every named register.

use std::sync::Arc;

use kernel_pmc::sim::{SimHal, SimRegisters};
use kernel_pmc::{Pmc, regs};
use proptest::prelude::*;

fn register() -> impl Strategy<Value = u32> {
    prop::sample::select(regs::REGISTERS).prop_map(|(_, offset)| offset)
}

proptest! {
    #[test]
    fn update_lands_masked_bits_and_keeps_the_rest(
        offset in register(),
        initial in any::<u32>(),
        mask in any::<u32>(),
        value in any::<u32>(),
        in_task in any::<bool>(),
    ) {
        let regs = Arc::new(SimRegisters::new());
        let pmc = Pmc::new(regs.clone(), SimHal::new(regs.clone()));
        regs.poke(offset, initial);

        if in_task {
            pmc.update_in_task(offset, mask, value);
        } else {
            pmc.update(offset, mask, value);
        }

        let got = pmc.get(offset);
        prop_assert_eq!(got & mask, value & mask);
        prop_assert_eq!(got & !mask, initial & !mask);
        prop_assert_eq!(regs.writes(), vec![(offset, got)]);
    }
}
