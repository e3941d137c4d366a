//! pmctl
//!
//! Brings the PMC driver up against a simulated register file and runs one
//! operation on it, printing every register write the operation made.

mod log;

use std::fs;
use std::num::ParseIntError;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use kernel_pmc::dt::{DeviceTree, FdtTree};
use kernel_pmc::regs;
use kernel_pmc::sim::{SimBoard, SimEvent, SimNode, SimRegisters, SimTree};
use kernel_pmc::{DpdGroup, bring_up};

#[derive(Parser)]
#[command(name = "pmctl", version, about = "Exercise the Tegra186 PMC driver on a simulated register file")]
struct Cli {
    /// Device tree blob to bring the PMC up from (default: built-in node)
    #[arg(long, global = true)]
    dtb: Option<PathBuf>,

    /// Most verbose log level shown
    #[arg(long, global = true, default_value = "info")]
    log_level: ::log::LevelFilter,

    /// Let DPD status registers follow their requests
    #[arg(long, global = true)]
    dpd_loopback: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum Switch {
    Enable,
    Disable,
}

#[derive(Clone, Copy, ValueEnum)]
enum Query {
    Enable,
    Disable,
    Status,
}

#[derive(Clone, Copy, ValueEnum)]
enum Latch {
    Set,
    Clear,
}

#[derive(Subcommand)]
enum Command {
    /// Print every named register
    Dump,

    /// Pad deep power down
    Dpd {
        op: Query,
        /// Register pair, 0..=7
        index: u8,
        /// Bit within the pair, 0..=31
        bit: u8,
    },

    /// NVCSI brick deep power down
    Nvcsi { op: Switch },

    /// PS18 fuse latch
    Latch { op: Latch },

    /// Fuse redirection
    Mirror { op: Switch },

    /// I/O rail power
    Rail {
        op: Query,
        #[arg(value_parser = parse_offset)]
        offset: u32,
        #[arg(value_parser = parse_u32)]
        mask: u32,
    },

    /// Masked update of any register
    Update {
        #[arg(value_parser = parse_offset)]
        offset: u32,
        #[arg(value_parser = parse_u32)]
        mask: u32,
        #[arg(value_parser = parse_u32)]
        value: u32,
    },

    /// Show the RAM-dump halt-in-FIQ flag
    HaltInFiq,
}

fn parse_u32(s: &str) -> Result<u32, ParseIntError> {
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    }
}

/// A register offset inside the PMC window, word aligned.
fn parse_offset(s: &str) -> Result<u32, String> {
    let offset = parse_u32(s).map_err(|e| e.to_string())?;
    if offset % 4 != 0 {
        return Err(format!("offset {offset:#x} is not word aligned"));
    }
    if offset as usize >= regs::WINDOW_SIZE {
        return Err(format!(
            "offset {offset:#x} is outside the PMC window (size {:#x})",
            regs::WINDOW_SIZE
        ));
    }
    Ok(offset)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    log::init(cli.log_level)?;

    match &cli.dtb {
        Some(path) => {
            let blob =
                fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
            let dt = FdtTree::from_bytes(&blob)?;
            run(&cli, &dt)
        }
        None => run(&cli, &SimTree::new([SimNode::tegra186()])),
    }
}

fn run<T: DeviceTree>(cli: &Cli, dt: &T) -> Result<()> {
    let regs = Arc::new(SimRegisters::new());
    if cli.dpd_loopback {
        regs.dpd_loopback();
    }
    let board = SimBoard::new(regs.clone());
    let pmc = bring_up(dt, &board)?;
    regs.clear_trace();

    match cli.command {
        Command::Dump => {
            for (name, offset) in regs::REGISTERS {
                println!("{name:<24} {offset:#05x}  {:#010x}", pmc.get(*offset));
            }
            return Ok(());
        }
        Command::Dpd { op, index, bit } => {
            let Some(group) = DpdGroup::new(index, bit) else {
                bail!("no DPD pad {index}.{bit}");
            };
            match op {
                Query::Enable => pmc.io_dpd_enable(group),
                Query::Disable => pmc.io_dpd_disable(group),
                Query::Status => println!("{group}: {}", on_off(pmc.io_dpd_status(group))),
            }
        }
        Command::Nvcsi { op: Switch::Enable } => pmc.enable_nvcsi_brick_dpd(),
        Command::Nvcsi { op: Switch::Disable } => pmc.disable_nvcsi_brick_dpd(),
        Command::Latch { op: Latch::Set } => pmc.fuse_ps18_latch_set(),
        Command::Latch { op: Latch::Clear } => pmc.fuse_ps18_latch_clear(),
        Command::Mirror { op: Switch::Enable } => pmc.fuse_enable_mirroring(),
        Command::Mirror { op: Switch::Disable } => pmc.fuse_disable_mirroring(),
        Command::Rail { op, offset, mask } => match op {
            Query::Enable => pmc.io_power_enable(offset, mask),
            Query::Disable => pmc.io_power_disable(offset, mask),
            Query::Status => {
                println!("{offset:#x}/{mask:#x}: {}", on_off(pmc.io_power_status(offset, mask)));
            }
        },
        Command::Update { offset, mask, value } => pmc.update(offset, mask, value),
        Command::HaltInFiq => println!("halt-in-fiq: {}", on_off(pmc.is_halt_in_fiq())),
    }

    for event in regs.trace() {
        match event {
            SimEvent::Write { offset, value } => {
                println!("write {:<24} {value:#010x}", register_name(offset));
            }
            SimEvent::Udelay(us) => println!("udelay {us}"),
            SimEvent::Msleep(ms) => println!("msleep {ms}"),
            _ => {}
        }
    }
    Ok(())
}

fn register_name(offset: u32) -> String {
    regs::REGISTERS
        .iter()
        .find(|(_, o)| *o == offset)
        .map_or_else(|| format!("{offset:#x}"), |(name, _)| (*name).to_string())
}

fn on_off(on: bool) -> &'static str {
    if on { "on" } else { "off" }
}
