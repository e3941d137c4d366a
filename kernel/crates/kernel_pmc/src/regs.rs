//! PMC register map
//!
//! Offsets are byte offsets from the start of the PMC window. Only this one
//! layout is supported.

use bitflags::bitflags;

pub const CTRL: u32 = 0x0;
pub const SLCG_CTRL: u32 = 0x4;
pub const DPD_PADS_ORIDE: u32 = 0x8;
pub const SC7_CONFIG: u32 = 0x14;
pub const SC7_STATUS: u32 = 0x18;
pub const IMPL_PWRGOOD_TIMER: u32 = 0x2c;
pub const BLINK_TIMER: u32 = 0x30;
/// I/O rail power-off bits. A set bit means the rail is *unpowered*.
pub const NO_IOPOWER: u32 = 0x34;
pub const DDR_PWR: u32 = 0x38;
pub const E_18V_PWR: u32 = 0x3c;
/// 3.3V pad high-voltage enables, see [`E33vPwr`].
pub const E_33V_PWR: u32 = 0x40;
pub const SATA_PWRGT_0: u32 = 0x68;
pub const SENSOR_CTRL: u32 = 0x6c;
pub const RST_STATUS: u32 = 0x70;

/// First DPD request register. Requests for group `n` live at
/// `IO_DPD_REQ + n * DPD_STRIDE`, status at `IO_DPD_STATUS + n * DPD_STRIDE`.
pub const IO_DPD_REQ: u32 = 0x74;
pub const IO_DPD_STATUS: u32 = 0x78;
pub const IO_DPD2_REQ: u32 = 0x7c;
pub const IO_DPD2_STATUS: u32 = 0x80;
pub const IO_DPD3_REQ: u32 = 0x84;
pub const IO_DPD3_STATUS: u32 = 0x88;
pub const IO_DPD4_REQ: u32 = 0x8c;
pub const IO_DPD4_STATUS: u32 = 0x90;
pub const IO_DPD5_REQ: u32 = 0x94;
pub const IO_DPD5_STATUS: u32 = 0x98;
pub const IO_DPD6_REQ: u32 = 0x9c;
pub const IO_DPD6_STATUS: u32 = 0xa0;
pub const IO_DPD7_REQ: u32 = 0xa4;
pub const IO_DPD7_STATUS: u32 = 0xa8;
pub const IO_DPD8_REQ: u32 = 0xac;
pub const IO_DPD8_STATUS: u32 = 0xb0;
pub const IO_DPD7_OFF_MASK: u32 = 0xb4;
pub const IO_DPD8_OFF_MASK: u32 = 0xb8;
pub const DPD_STRIDE: u32 = 8;

/// DPD sampling timer, programmed before every DPD enable request.
pub const IO_SEL_DPD_TIM: u32 = 0xbc;
pub const DSI_SEL_DPD: u32 = 0xd0;
pub const TSC_MULT0: u32 = 0xd4;
pub const UFSHC_PWR_CNTRL_0: u32 = 0xf4;
pub const FUSE_CTRL: u32 = 0x100;
pub const THERMTRIP_CFG: u32 = 0x104;
pub const IMPL_RAMDUMP_CTL_STATUS: u32 = 0x10c;
pub const DDR_CNTRL: u32 = 0x11c;

/// Bytes covered by the registers above.
pub const WINDOW_SIZE: usize = 0x120;

/// Reset level field of [`RST_STATUS`].
pub const RST_LEVEL_MASK: u32 = 0x3;

bitflags! {
    /// [`FUSE_CTRL`] bits.
    ///
    /// The redirection bits are write strobes: disabling is its own bit,
    /// not the complement of enabling.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FuseCtrl: u32 {
        const ENABLE_REDIRECTION = 1 << 0;
        const DISABLE_REDIRECTION = 1 << 1;
        const PS18_LATCH_SET = 1 << 8;
        const PS18_LATCH_CLEAR = 1 << 9;
    }
}

bitflags! {
    /// NVCSI A/B brick DPD requests in [`IO_DPD_REQ`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct NvcsiAb: u32 {
        const CSIA = 1 << 0;
        const CSIB = 1 << 1;
    }
}

bitflags! {
    /// NVCSI C..F brick DPD requests in [`IO_DPD2_REQ`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct NvcsiCdef: u32 {
        const CSIC = 1 << 11;
        const CSID = 1 << 12;
        const CSIE = 1 << 13;
        const CSIF = 1 << 14;
    }
}

bitflags! {
    /// SD card high-voltage enables in [`E_33V_PWR`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct E33vPwr: u32 {
        const SDMMC1_HV = 1 << 4;
        const SDMMC2_HV = 1 << 5;
        const SDMMC3_HV = 1 << 6;
    }
}

bitflags! {
    /// [`SENSOR_CTRL`] bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SensorCtrl: u32 {
        const ENABLE_RST = 1 << 1;
        const SCRATCH_WRITE = 1 << 2;
    }
}

bitflags! {
    /// [`THERMTRIP_CFG`] bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ThermtripCfg: u32 {
        const LOCK = 1 << 5;
    }
}

bitflags! {
    /// [`IMPL_RAMDUMP_CTL_STATUS`] bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RamdumpCtl: u32 {
        const HALT_IN_FIQ = 1 << 28;
    }
}

/// Named registers, in address order. Used for dumps.
pub const REGISTERS: &[(&str, u32)] = &[
    ("CTRL", CTRL),
    ("SLCG_CTRL", SLCG_CTRL),
    ("DPD_PADS_ORIDE", DPD_PADS_ORIDE),
    ("SC7_CONFIG", SC7_CONFIG),
    ("SC7_STATUS", SC7_STATUS),
    ("IMPL_PWRGOOD_TIMER", IMPL_PWRGOOD_TIMER),
    ("BLINK_TIMER", BLINK_TIMER),
    ("NO_IOPOWER", NO_IOPOWER),
    ("DDR_PWR", DDR_PWR),
    ("E_18V_PWR", E_18V_PWR),
    ("E_33V_PWR", E_33V_PWR),
    ("SATA_PWRGT_0", SATA_PWRGT_0),
    ("SENSOR_CTRL", SENSOR_CTRL),
    ("RST_STATUS", RST_STATUS),
    ("IO_DPD_REQ", IO_DPD_REQ),
    ("IO_DPD_STATUS", IO_DPD_STATUS),
    ("IO_DPD2_REQ", IO_DPD2_REQ),
    ("IO_DPD2_STATUS", IO_DPD2_STATUS),
    ("IO_DPD3_REQ", IO_DPD3_REQ),
    ("IO_DPD3_STATUS", IO_DPD3_STATUS),
    ("IO_DPD4_REQ", IO_DPD4_REQ),
    ("IO_DPD4_STATUS", IO_DPD4_STATUS),
    ("IO_DPD5_REQ", IO_DPD5_REQ),
    ("IO_DPD5_STATUS", IO_DPD5_STATUS),
    ("IO_DPD6_REQ", IO_DPD6_REQ),
    ("IO_DPD6_STATUS", IO_DPD6_STATUS),
    ("IO_DPD7_REQ", IO_DPD7_REQ),
    ("IO_DPD7_STATUS", IO_DPD7_STATUS),
    ("IO_DPD8_REQ", IO_DPD8_REQ),
    ("IO_DPD8_STATUS", IO_DPD8_STATUS),
    ("IO_DPD7_OFF_MASK", IO_DPD7_OFF_MASK),
    ("IO_DPD8_OFF_MASK", IO_DPD8_OFF_MASK),
    ("IO_SEL_DPD_TIM", IO_SEL_DPD_TIM),
    ("DSI_SEL_DPD", DSI_SEL_DPD),
    ("TSC_MULT0", TSC_MULT0),
    ("UFSHC_PWR_CNTRL_0", UFSHC_PWR_CNTRL_0),
    ("FUSE_CTRL", FUSE_CTRL),
    ("THERMTRIP_CFG", THERMTRIP_CFG),
    ("IMPL_RAMDUMP_CTL_STATUS", IMPL_RAMDUMP_CTL_STATUS),
    ("DDR_CNTRL", DDR_CNTRL),
];
