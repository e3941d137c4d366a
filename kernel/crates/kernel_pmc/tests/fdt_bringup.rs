//! Bring-up from flattened device tree blobs.

use std::sync::Arc;

use kernel_pmc::bringup::{COMPATIBLE, HALT_IN_FIQ_PROPERTY};
use kernel_pmc::dt::{DeviceTree, DtNode, FdtTree, RegWindow};
use kernel_pmc::regs::{self, RamdumpCtl};
use kernel_pmc::sim::{SimBoard, SimRegisters};
use kernel_pmc::{BringUpError, bring_up};

const FDT_BEGIN_NODE: u32 = 1;
const FDT_END_NODE: u32 = 2;
const FDT_PROP: u32 = 3;
const FDT_END: u32 = 9;

/// Minimal DTB writer: one level of children under the root.
#[derive(Default)]
struct DtbBuilder {
    structs: Vec<u8>,
    strings: Vec<u8>,
}

impl DtbBuilder {
    fn word(&mut self, value: u32) {
        self.structs.extend_from_slice(&value.to_be_bytes());
    }

    fn pad(&mut self) {
        while self.structs.len() % 4 != 0 {
            self.structs.push(0);
        }
    }

    fn begin(&mut self, name: &str) -> &mut Self {
        self.word(FDT_BEGIN_NODE);
        self.structs.extend_from_slice(name.as_bytes());
        self.structs.push(0);
        self.pad();
        self
    }

    fn end(&mut self) -> &mut Self {
        self.word(FDT_END_NODE);
        self
    }

    fn prop(&mut self, name: &str, value: &[u8]) -> &mut Self {
        let nameoff = self.strings.len() as u32;
        self.strings.extend_from_slice(name.as_bytes());
        self.strings.push(0);

        self.word(FDT_PROP);
        self.word(value.len() as u32);
        self.word(nameoff);
        self.structs.extend_from_slice(value);
        self.pad();
        self
    }

    fn prop_str(&mut self, name: &str, value: &str) -> &mut Self {
        let mut bytes = value.as_bytes().to_vec();
        bytes.push(0);
        self.prop(name, &bytes)
    }

    fn prop_cells(&mut self, name: &str, cells: &[u32]) -> &mut Self {
        let bytes: Vec<u8> = cells.iter().flat_map(|c| c.to_be_bytes()).collect();
        self.prop(name, &bytes)
    }

    fn finish(&mut self) -> Vec<u8> {
        self.word(FDT_END);

        let header_len = 40;
        let rsvmap_len = 16;
        let off_struct = header_len + rsvmap_len;
        let off_strings = off_struct + self.structs.len();
        let total = off_strings + self.strings.len();

        let mut blob = Vec::with_capacity(total);
        for field in [
            0xd00d_feed,
            total as u32,
            off_struct as u32,
            off_strings as u32,
            header_len as u32,
            17,
            16,
            0,
            self.strings.len() as u32,
            self.structs.len() as u32,
        ] {
            blob.extend_from_slice(&u32::to_be_bytes(field));
        }
        blob.extend_from_slice(&[0; 16]);
        blob.extend_from_slice(&self.structs);
        blob.extend_from_slice(&self.strings);
        blob
    }
}

/// Root with two address cells and one size cell, holding a PMC node.
fn tegra_dtb(status: Option<&str>, halt_in_fiq: bool) -> Vec<u8> {
    let mut dtb = DtbBuilder::default();
    dtb.begin("")
        .prop_cells("#address-cells", &[2])
        .prop_cells("#size-cells", &[1])
        .prop_str("compatible", "nvidia,p2771-0000");

    dtb.begin("serial@3100000")
        .prop_str("compatible", "nvidia,tegra186-uart")
        .prop_cells("reg", &[0, 0x0310_0000, 0x40])
        .end();

    dtb.begin("pmc@c360000")
        .prop_str("compatible", COMPATIBLE)
        .prop_cells("reg", &[0, 0x0c36_0000, 0x1_0000]);
    if let Some(status) = status {
        dtb.prop_str("status", status);
    }
    if halt_in_fiq {
        dtb.prop(HALT_IN_FIQ_PROPERTY, &[]);
    }
    dtb.end();

    dtb.end().finish()
}

fn board() -> (Arc<SimRegisters>, SimBoard) {
    let regs = Arc::new(SimRegisters::new());
    (regs.clone(), SimBoard::new(regs))
}

#[test]
fn finds_the_pmc_node() {
    let blob = tegra_dtb(None, false);
    let dt = FdtTree::from_bytes(&blob).unwrap();

    let node = dt.find_compatible(COMPATIBLE).unwrap();

    assert_eq!(node.name(), "pmc@c360000");
    assert!(node.is_available());
    assert!(!node.has_property(HALT_IN_FIQ_PROPERTY));
    assert_eq!(
        node.reg_window(),
        Some(RegWindow { base: 0x0c36_0000, size: 0x1_0000 })
    );
}

#[test]
fn parses_from_an_address() {
    let blob = tegra_dtb(Some("okay"), false);
    // SAFETY: `blob` is a complete DTB that outlives `dt`.
    let dt = unsafe { FdtTree::from_addr(blob.as_ptr() as usize) }.unwrap();

    assert!(dt.find_compatible(COMPATIBLE).is_some());
    assert!(dt.find_compatible("nvidia,tegra194-pmc").is_none());
}

#[test]
fn brings_up_from_a_blob() {
    let (regs, board) = board();
    let blob = tegra_dtb(Some("okay"), true);
    let dt = FdtTree::from_bytes(&blob).unwrap();

    let pmc = bring_up(&dt, &board).unwrap();

    assert_eq!(
        board.mapped(),
        Some(RegWindow { base: 0x0c36_0000, size: 0x1_0000 })
    );
    assert!(pmc.is_halt_in_fiq());
    assert_eq!(
        regs.peek(regs::IMPL_RAMDUMP_CTL_STATUS),
        RamdumpCtl::HALT_IN_FIQ.bits()
    );
    assert_eq!(board.registered(), ["tegra186-pmc"]);
}

#[test]
fn disabled_blob_node_stops_bring_up() {
    let (regs, board) = board();
    let blob = tegra_dtb(Some("disabled"), true);
    let dt = FdtTree::from_bytes(&blob).unwrap();

    assert_eq!(
        bring_up(&dt, &board).err(),
        Some(BringUpError::NodeDisabled("pmc@c360000".into()))
    );
    assert_eq!(board.mapped(), None);
    assert!(regs.writes().is_empty());
}
