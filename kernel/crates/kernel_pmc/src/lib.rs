//! Tegra186 Power Management Controller
//!
//! The PMC is a single register block shared by several unrelated features:
//! I/O rail power, pad deep-power-down (DPD), SATA and UFS power control,
//! NVCSI brick DPD, fuse redirection and the PS18 fuse latch, and the
//! RAM-dump halt-in-FIQ flag.
//!
//! Everything goes through one [`Pmc`] context. It owns the mapped window
//! (as a [`RegisterPort`]), the platform hooks for interrupt masking and
//! delays (a [`Hal`]), and the single lock that serializes every
//! read-modify-write on the block. Feature operations are methods on
//! [`Pmc`], grouped by file:
//!
//! - `access`: raw access and the masked update primitive
//! - `power`: pad voltage, I/O rails, SATA, UFS
//! - `nvcsi`: camera brick DPD
//! - `dpd`: the I/O pad DPD request/settle/verify sequence
//! - `fuse`: fuse mirroring and the two-phase PS18 latch
//! - `ramdump`: halt-in-FIQ
//!
//! [`bringup`] locates the node in the device tree, maps it, and applies the
//! static configuration once.
//!
//! The `sim` feature adds `sim`, an in-memory register file with fake
//! platform collaborators, for host tools and integration tests.

#![cfg_attr(not(test), no_std)]
extern crate alloc;

mod access;
pub mod bringup;
mod dpd;
pub mod dt;
mod fuse;
pub mod hal;
mod nvcsi;
pub mod port;
mod power;
mod ramdump;
pub mod regs;
#[cfg(any(test, feature = "sim"))]
pub mod sim;

pub use access::Pmc;
pub use bringup::{BringUpError, Board, ProdSetting, bring_up, install};
pub use dpd::{DPD_GROUPS, DpdGroup};
pub use fuse::LatchState;
pub use hal::Hal;
pub use port::{MmioPort, RegisterPort};
