//! Simulated PMC
//!
//! A register file in plain memory plus the collaborators bring-up needs, so
//! the access discipline and the hardware sequences can be exercised and
//! inspected without a PMC. Every access and every platform hook call is
//! appended to one trace, which keeps the relative order of register writes,
//! delays and interrupt masking observable.

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use spin::{Mutex, RwLock};

use crate::bringup::{
    Board, COMPATIBLE, MapError, PadCtrlError, ProdError, ProdSetting, RegisterDeviceError,
};
use crate::dt::{DeviceTree, DtNode, RegWindow};
use crate::hal::Hal;
use crate::port::RegisterPort;
use crate::regs;

const WORDS: usize = regs::WINDOW_SIZE / 4;

/// One observable step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimEvent {
    Read { offset: u32, value: u32 },
    Write { offset: u32, value: u32 },
    IrqSave,
    IrqRestore,
    Udelay(u32),
    Msleep(u32),
}

type WriteHook = Box<dyn Fn(&SimRegisters, u32, u32) + Send + Sync>;

/// In-memory PMC register file.
pub struct SimRegisters {
    words: [AtomicU32; WORDS],
    trace: Mutex<Vec<SimEvent>>,
    tracing: AtomicBool,
    write_hook: RwLock<Option<WriteHook>>,
    access_hook: RwLock<Option<fn()>>,
}

impl Default for SimRegisters {
    fn default() -> Self {
        Self::new()
    }
}

impl SimRegisters {
    #[must_use]
    pub fn new() -> Self {
        Self {
            words: [const { AtomicU32::new(0) }; WORDS],
            trace: Mutex::new(Vec::new()),
            tracing: AtomicBool::new(true),
            write_hook: RwLock::new(None),
            access_hook: RwLock::new(None),
        }
    }

    fn word(&self, offset: u32) -> &AtomicU32 {
        assert!(
            offset % 4 == 0 && (offset as usize) < regs::WINDOW_SIZE,
            "offset {offset:#x} outside the PMC window"
        );
        &self.words[offset as usize / 4]
    }

    fn record(&self, event: SimEvent) {
        if self.tracing.load(Ordering::Relaxed) {
            self.trace.lock().push(event);
        }
    }

    fn accessed(&self) {
        let hook = *self.access_hook.read();
        if let Some(hook) = hook {
            hook();
        }
    }

    /// Current value, bypassing the trace and hooks.
    pub fn peek(&self, offset: u32) -> u32 {
        self.word(offset).load(Ordering::SeqCst)
    }

    /// Set a value as the hardware would, bypassing the trace and hooks.
    pub fn poke(&self, offset: u32, value: u32) {
        self.word(offset).store(value, Ordering::SeqCst);
    }

    /// Run `hook` after every traced write, with the written offset and value.
    pub fn on_write(&self, hook: impl Fn(&SimRegisters, u32, u32) + Send + Sync + 'static) {
        *self.write_hook.write() = Some(Box::new(hook));
    }

    /// Run `hook` between the halves of every access, e.g. to yield and
    /// widen race windows.
    pub fn on_access(&self, hook: fn()) {
        *self.access_hook.write() = Some(hook);
    }

    /// Model pads that follow their requests: writing a request register
    /// toggles the written bits in the matching status register.
    pub fn dpd_loopback(&self) {
        self.on_write(|sim, offset, value| {
            let req_end = regs::IO_DPD_REQ + 8 * regs::DPD_STRIDE;
            if (regs::IO_DPD_REQ..req_end).contains(&offset)
                && (offset - regs::IO_DPD_REQ) % regs::DPD_STRIDE == 0
            {
                let status = offset + (regs::IO_DPD_STATUS - regs::IO_DPD_REQ);
                sim.poke(status, sim.peek(status) ^ value);
            }
        });
    }

    pub fn trace(&self) -> Vec<SimEvent> {
        self.trace.lock().clone()
    }

    /// Stop or resume recording. Hooks run either way.
    pub fn set_tracing(&self, on: bool) {
        self.tracing.store(on, Ordering::Relaxed);
    }

    pub fn clear_trace(&self) {
        self.trace.lock().clear();
    }

    /// All traced writes as `(offset, value)`, in order.
    pub fn writes(&self) -> Vec<(u32, u32)> {
        self.trace
            .lock()
            .iter()
            .filter_map(|event| match *event {
                SimEvent::Write { offset, value } => Some((offset, value)),
                _ => None,
            })
            .collect()
    }

    /// Values written to `offset`, in order.
    pub fn writes_to(&self, offset: u32) -> Vec<u32> {
        self.writes()
            .into_iter()
            .filter(|&(o, _)| o == offset)
            .map(|(_, value)| value)
            .collect()
    }
}

impl RegisterPort for SimRegisters {
    fn read(&self, offset: u32) -> u32 {
        let value = self.peek(offset);
        self.record(SimEvent::Read { offset, value });
        self.accessed();
        value
    }

    fn write(&self, value: u32, offset: u32) {
        self.accessed();
        self.poke(offset, value);
        self.record(SimEvent::Write { offset, value });
        if let Some(hook) = self.write_hook.read().as_ref() {
            hook(self, offset, value);
        }
    }
}

/// [`Hal`] that records its calls into the register trace instead of
/// touching a CPU.
pub struct SimHal {
    regs: Arc<SimRegisters>,
    irqs_enabled: AtomicBool,
}

impl SimHal {
    #[must_use]
    pub fn new(regs: Arc<SimRegisters>) -> Self {
        Self {
            regs,
            irqs_enabled: AtomicBool::new(true),
        }
    }

    pub fn irqs_enabled(&self) -> bool {
        self.irqs_enabled.load(Ordering::SeqCst)
    }
}

impl Hal for SimHal {
    fn irq_save(&self) -> bool {
        self.regs.record(SimEvent::IrqSave);
        self.irqs_enabled.swap(false, Ordering::SeqCst)
    }

    fn irq_restore(&self, were_enabled: bool) {
        self.regs.record(SimEvent::IrqRestore);
        if were_enabled {
            self.irqs_enabled.store(true, Ordering::SeqCst);
        }
    }

    fn udelay(&self, us: u32) {
        self.regs.record(SimEvent::Udelay(us));
    }

    fn msleep(&self, ms: u32) {
        self.regs.record(SimEvent::Msleep(ms));
    }
}

/// Device tree node for [`SimTree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimNode {
    pub name: String,
    pub compatible: String,
    pub status: Option<String>,
    pub properties: Vec<String>,
    pub reg: Option<RegWindow>,
}

impl SimNode {
    /// The PMC node as Tegra186 device trees describe it.
    #[must_use]
    pub fn tegra186() -> Self {
        Self {
            name: "pmc@c360000".to_string(),
            compatible: COMPATIBLE.to_string(),
            status: Some("okay".to_string()),
            properties: Vec::new(),
            reg: Some(RegWindow {
                base: 0x0c36_0000,
                size: 0x1_0000,
            }),
        }
    }
}

impl DtNode for SimNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_available(&self) -> bool {
        matches!(self.status.as_deref(), None | Some("okay" | "ok"))
    }

    fn has_property(&self, name: &str) -> bool {
        self.properties.iter().any(|p| p == name)
    }

    fn reg_window(&self) -> Option<RegWindow> {
        self.reg
    }
}

/// A flat list of nodes.
#[derive(Debug, Clone, Default)]
pub struct SimTree {
    nodes: Vec<SimNode>,
}

impl SimTree {
    pub fn new(nodes: impl IntoIterator<Item = SimNode>) -> Self {
        Self {
            nodes: nodes.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

impl DeviceTree for SimTree {
    type Node<'n> = &'n SimNode;

    fn find_compatible(&self, compatible: &str) -> Option<Self::Node<'_>> {
        self.nodes.iter().find(|node| node.compatible == compatible)
    }
}

/// [`Board`] that maps every window onto one [`SimRegisters`] and records
/// what bring-up asked of it.
pub struct SimBoard {
    regs: Arc<SimRegisters>,
    prod_list: Option<Vec<(String, Vec<ProdSetting>)>>,
    iomap_result: Result<(), MapError>,
    register_result: Result<(), RegisterDeviceError>,
    padctrl_result: Result<(), PadCtrlError>,
    mapped: Mutex<Option<RegWindow>>,
    registered: Mutex<Vec<String>>,
    padctrl_nodes: Mutex<Vec<String>>,
}

impl SimBoard {
    #[must_use]
    pub fn new(regs: Arc<SimRegisters>) -> Self {
        Self {
            regs,
            prod_list: Some(Vec::new()),
            iomap_result: Ok(()),
            register_result: Ok(()),
            padctrl_result: Ok(()),
            mapped: Mutex::new(None),
            registered: Mutex::new(Vec::new()),
            padctrl_nodes: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn with_prod_table(
        mut self,
        name: &str,
        settings: impl IntoIterator<Item = ProdSetting>,
    ) -> Self {
        self.prod_list
            .get_or_insert_with(Vec::new)
            .push((name.to_string(), settings.into_iter().collect()));
        self
    }

    #[must_use]
    pub fn without_prod_list(mut self) -> Self {
        self.prod_list = None;
        self
    }

    #[must_use]
    pub fn failing_iomap(mut self, err: MapError) -> Self {
        self.iomap_result = Err(err);
        self
    }

    #[must_use]
    pub fn failing_registration(mut self, err: RegisterDeviceError) -> Self {
        self.register_result = Err(err);
        self
    }

    #[must_use]
    pub fn failing_padctrl(mut self, err: PadCtrlError) -> Self {
        self.padctrl_result = Err(err);
        self
    }

    pub fn regs(&self) -> &Arc<SimRegisters> {
        &self.regs
    }

    pub fn mapped(&self) -> Option<RegWindow> {
        *self.mapped.lock()
    }

    pub fn registered(&self) -> Vec<String> {
        self.registered.lock().clone()
    }

    pub fn padctrl_nodes(&self) -> Vec<String> {
        self.padctrl_nodes.lock().clone()
    }
}

impl Board for SimBoard {
    type Port = Arc<SimRegisters>;
    type Hal = SimHal;

    fn iomap(&self, window: RegWindow) -> Result<Self::Port, MapError> {
        self.iomap_result.clone()?;
        *self.mapped.lock() = Some(window);
        Ok(self.regs.clone())
    }

    fn hal(&self) -> Self::Hal {
        SimHal::new(self.regs.clone())
    }

    fn register_device(&self, name: &str, _node: &str) -> Result<(), RegisterDeviceError> {
        self.register_result.clone()?;
        self.registered.lock().push(name.to_string());
        Ok(())
    }

    fn prod_table(&self, _device: &str, table: &str) -> Result<Vec<ProdSetting>, ProdError> {
        let list = self.prod_list.as_ref().ok_or(ProdError::ListNotFound)?;
        list.iter()
            .find(|(name, _)| name == table)
            .map(|(_, settings)| settings.clone())
            .ok_or_else(|| ProdError::SettingNotFound(table.to_string()))
    }

    fn padctrl_init(&self, _device: &str, node: &str) -> Result<(), PadCtrlError> {
        self.padctrl_result.clone()?;
        self.padctrl_nodes.lock().push(node.to_string());
        Ok(())
    }
}
