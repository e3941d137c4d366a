//! Hardware mismatches and skipped bring-up steps are reported through
//! `log`, never as errors.

use std::sync::{Arc, Mutex, Once};

use kernel_pmc::bringup::RegisterDeviceError;
use kernel_pmc::sim::{SimBoard, SimHal, SimNode, SimRegisters, SimTree};
use kernel_pmc::{DpdGroup, Pmc, bring_up, regs};
use log::{Level, Metadata, Record};

struct CaptureLogger {
    records: Mutex<Vec<(Level, String)>>,
}

static LOGGER: CaptureLogger = CaptureLogger {
    records: Mutex::new(Vec::new()),
};

impl log::Log for CaptureLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.target().starts_with("kernel_pmc")
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            self.records
                .lock()
                .unwrap()
                .push((record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

fn init() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        log::set_logger(&LOGGER).unwrap();
        log::set_max_level(log::LevelFilter::Trace);
    });
}

fn logged(level: Level, message: &str) -> bool {
    LOGGER
        .records
        .lock()
        .unwrap()
        .iter()
        .any(|(l, m)| *l == level && m == message)
}

#[test]
fn dpd_mismatch_is_a_warning() {
    init();
    let regs = Arc::new(SimRegisters::new());
    regs.poke(regs::IO_DPD3_STATUS, 0x40);
    let pmc = Pmc::new(regs.clone(), SimHal::new(regs.clone()));

    pmc.io_dpd_enable(DpdGroup::new(2, 1).unwrap());

    assert!(logged(Level::Warn, "dpd3 enable failed, status=0x40"));
}

#[test]
fn dpd_disable_mismatch_is_a_warning() {
    init();
    let regs = Arc::new(SimRegisters::new());
    regs.poke(regs::IO_DPD7_STATUS, 0x8000_0000);
    let pmc = Pmc::new(regs.clone(), SimHal::new(regs.clone()));

    pmc.io_dpd_disable(DpdGroup::new(6, 31).unwrap());

    assert!(logged(Level::Warn, "dpd7 disable failed, status=0x80000000"));
}

#[test]
fn skipped_bring_up_steps_are_logged() {
    init();
    let regs = Arc::new(SimRegisters::new());
    let board = SimBoard::new(regs)
        .without_prod_list()
        .failing_registration(RegisterDeviceError::AlreadyRegistered("tegra186-pmc".into()));

    bring_up(&SimTree::new([SimNode::tegra186()]), &board).unwrap();

    assert!(logged(Level::Info, "tegra186-pmc: prod list not found"));
    assert!(logged(
        Level::Error,
        "tegra186-pmc device create failed: device tegra186-pmc is already registered"
    ));
}

#[test]
fn missing_node_is_logged() {
    init();
    let board = SimBoard::new(Arc::new(SimRegisters::new()));

    assert!(bring_up(&SimTree::empty(), &board).is_err());
    assert!(logged(Level::Info, "Failed to find t186pmc node"));
}
