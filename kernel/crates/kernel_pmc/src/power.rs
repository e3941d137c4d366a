//! Pad voltage, I/O rail, SATA and UFS power control

use crate::access::Pmc;
use crate::hal::Hal;
use crate::port::RegisterPort;
use crate::regs::{self, E33vPwr};

impl<P: RegisterPort, H: Hal> Pmc<P, H> {
    pub fn pad_voltage_update(&self, offset: u32, mask: u32, value: u32) {
        self.update(offset, mask, value);
    }

    pub fn pad_voltage_get(&self, offset: u32) -> u32 {
        self.get(offset)
    }

    /// Power the rails in `mask`. The hardware bit means "no power", so this
    /// clears it.
    pub fn io_power_enable(&self, offset: u32, mask: u32) {
        self.update(offset, mask, 0);
    }

    pub fn io_power_disable(&self, offset: u32, mask: u32) {
        self.update(offset, mask, mask);
    }

    /// `true` when every rail in `mask` is powered.
    pub fn io_power_status(&self, offset: u32, mask: u32) -> bool {
        self.get(offset) & mask == 0
    }

    pub fn sata_pwrgt_update(&self, mask: u32, value: u32) {
        self.update(regs::SATA_PWRGT_0, mask, value);
    }

    pub fn sata_pwrgt_get(&self) -> u32 {
        self.get(regs::SATA_PWRGT_0)
    }

    pub fn ufs_pwrcntrl_update(&self, mask: u32, value: u32) {
        self.update(regs::UFSHC_PWR_CNTRL_0, mask, value);
    }

    pub fn ufs_pwrcntrl_get(&self) -> u32 {
        self.get(regs::UFSHC_PWR_CNTRL_0)
    }

    /// Switch the SD card pads in `pads` to 3.3V (`true`) or 1.8V.
    pub fn set_sdmmc_high_voltage(&self, pads: E33vPwr, high: bool) {
        let value = if high { pads.bits() } else { 0 };
        self.pad_voltage_update(regs::E_33V_PWR, pads.bits(), value);
    }

    pub fn sdmmc_high_voltage(&self) -> E33vPwr {
        E33vPwr::from_bits_truncate(self.pad_voltage_get(regs::E_33V_PWR))
    }

    /// Level of the last reset, as latched in `RST_STATUS`.
    pub fn reset_level(&self) -> u32 {
        self.get(regs::RST_STATUS) & regs::RST_LEVEL_MASK
    }
}
