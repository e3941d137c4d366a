//! One-time PMC bring-up
//!
//! Finds the PMC node, maps its window, applies the static bits the device
//! tree asks for, and hands the device to the outside collaborators (device
//! registration, prod presets, pad controller). Only a missing or disabled
//! node, or a window that cannot be mapped, stops bring-up; everything after
//! the mapping is logged and skipped on failure.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use conquer_once::spin::OnceCell;
use log::{error, info};
use thiserror::Error;

use crate::access::Pmc;
use crate::dt::{DeviceTree, DtNode, RegWindow};
use crate::hal::Hal;
use crate::port::RegisterPort;
use crate::regs;

pub const COMPATIBLE: &str = "nvidia,tegra186-pmc";
pub const DEVICE_NAME: &str = "tegra186-pmc";
pub const HALT_IN_FIQ_PROPERTY: &str = "nvidia,enable-halt-in-fiq";
/// Prod table holding the platform pad rail presets.
pub const PAD_RAIL_PROD: &str = "prod_c_platform_pad_rail";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BringUpError {
    #[error("no nvidia,tegra186-pmc node found")]
    NoDevice,
    #[error("node {0} is not enabled")]
    NodeDisabled(String),
    #[error("node {0} has no register window")]
    NoRegWindow(String),
    #[error("failed to map PMC window: {0}")]
    Map(#[from] MapError),
    #[error("PMC is already initialized")]
    AlreadyInitialized,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    #[error("window {base:#x}+{size:#x} is smaller than the PMC register block")]
    TooSmall { base: usize, size: usize },
    #[error("cannot map window at {0:#x}")]
    Unmappable(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegisterDeviceError {
    #[error("device {0} is already registered")]
    AlreadyRegistered(String),
    #[error("device registration failed: {0}")]
    Failed(i32),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProdError {
    #[error("prod list not found")]
    ListNotFound,
    #[error("prod setting {0} not found")]
    SettingNotFound(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("pad control driver init failed: {0}")]
pub struct PadCtrlError(pub i32);

/// One entry of a prod preset, applied as `update(offset, mask, value)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProdSetting {
    pub offset: u32,
    pub mask: u32,
    pub value: u32,
}

/// Everything bring-up needs from the platform besides the device tree.
pub trait Board {
    type Port: RegisterPort;
    type Hal: Hal;

    /// Map the PMC register window.
    ///
    /// # Errors
    /// Returns an error if the window cannot be mapped.
    fn iomap(&self, window: RegWindow) -> Result<Self::Port, MapError>;

    fn hal(&self) -> Self::Hal;

    /// # Errors
    /// Returns an error if the device model rejects the device.
    fn register_device(&self, name: &str, node: &str) -> Result<(), RegisterDeviceError>;

    /// Look up the prod table `table` for `device`.
    ///
    /// # Errors
    /// Returns [`ProdError::ListNotFound`] if the device has no prod list,
    /// [`ProdError::SettingNotFound`] if the list has no such table.
    fn prod_table(&self, device: &str, table: &str) -> Result<Vec<ProdSetting>, ProdError>;

    /// # Errors
    /// Returns an error if the pad controller could not be registered.
    fn padctrl_init(&self, device: &str, node: &str) -> Result<(), PadCtrlError>;
}

/// What bring-up reads out of the PMC node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PmcNodeConfig {
    pub name: String,
    pub window: RegWindow,
    pub halt_in_fiq: bool,
}

impl PmcNodeConfig {
    /// # Errors
    /// Fails if the node is disabled or has no `reg` window.
    pub fn from_node<N: DtNode>(node: &N) -> Result<Self, BringUpError> {
        let name = node.name().to_string();
        if !node.is_available() {
            info!("Node {name} is not enabled");
            return Err(BringUpError::NodeDisabled(name));
        }
        let Some(window) = node.reg_window() else {
            return Err(BringUpError::NoRegWindow(name));
        };
        Ok(Self {
            halt_in_fiq: node.has_property(HALT_IN_FIQ_PROPERTY),
            name,
            window,
        })
    }
}

/// Bring the PMC up.
///
/// # Errors
/// Returns [`BringUpError::NoDevice`] when no compatible node exists,
/// [`BringUpError::NodeDisabled`] when it is disabled, and a map error when
/// its window is unusable. Registration, prod and pad controller failures
/// are logged and do not fail bring-up.
pub fn bring_up<T, B>(dt: &T, board: &B) -> Result<Pmc<B::Port, B::Hal>, BringUpError>
where
    T: DeviceTree,
    B: Board,
{
    let Some(node) = dt.find_compatible(COMPATIBLE) else {
        info!("Failed to find t186pmc node");
        return Err(BringUpError::NoDevice);
    };
    let config = PmcNodeConfig::from_node(&node)?;

    let RegWindow { base, size } = config.window;
    if size < regs::WINDOW_SIZE {
        return Err(MapError::TooSmall { base, size }.into());
    }
    let pmc = Pmc::new(board.iomap(config.window)?, board.hal());

    if config.halt_in_fiq {
        pmc.enable_halt_in_fiq();
    }

    match board.register_device(DEVICE_NAME, &config.name) {
        Ok(()) => info!("{DEVICE_NAME} device create success"),
        Err(e) => error!("{DEVICE_NAME} device create failed: {e}"),
    }

    apply_pad_rail_prod(&pmc, board);

    if let Err(e) = board.padctrl_init(DEVICE_NAME, &config.name) {
        error!("{e}");
    }

    Ok(pmc)
}

fn apply_pad_rail_prod<B: Board>(pmc: &Pmc<B::Port, B::Hal>, board: &B) {
    match board.prod_table(DEVICE_NAME, PAD_RAIL_PROD) {
        Ok(settings) => {
            for setting in &settings {
                pmc.update(setting.offset, setting.mask, setting.value);
            }
            info!("{DEVICE_NAME}: applied {} {PAD_RAIL_PROD} settings", settings.len());
        }
        Err(ProdError::ListNotFound) => info!("{DEVICE_NAME}: prod list not found"),
        Err(ProdError::SettingNotFound(_)) => {
            info!("{DEVICE_NAME}: prod setting for rail not found");
        }
    }
}

/// Store the brought-up PMC in `cell`, enforcing that there is only one.
///
/// # Errors
/// Returns [`BringUpError::AlreadyInitialized`] if `cell` is already set.
pub fn install<P, H>(
    cell: &'static OnceCell<Pmc<P, H>>,
    pmc: Pmc<P, H>,
) -> Result<&'static Pmc<P, H>, BringUpError>
where
    P: RegisterPort,
    H: Hal,
{
    cell.try_init_once(|| pmc)
        .map_err(|_| BringUpError::AlreadyInitialized)?;
    cell.get().ok_or(BringUpError::AlreadyInitialized)
}
