//! Device tree lookup
//!
//! Bring-up needs very little from the device tree: the PMC node, whether it
//! is enabled, one boolean property and the first `reg` window. [`DeviceTree`]
//! and [`DtNode`] describe exactly that, and [`FdtTree`] implements them on a
//! flattened device tree blob.

use fdt::Fdt;
use fdt::node::FdtNode;
use thiserror::Error;

use crate::regs;

/// A physical register window taken from a node's `reg` property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegWindow {
    pub base: usize,
    pub size: usize,
}

pub trait DeviceTree {
    type Node<'n>: DtNode
    where
        Self: 'n;

    /// First node whose `compatible` list contains `compatible`.
    fn find_compatible(&self, compatible: &str) -> Option<Self::Node<'_>>;
}

pub trait DtNode {
    fn name(&self) -> &str;

    /// `false` when the node carries a `status` other than `okay`/`ok`.
    fn is_available(&self) -> bool;

    fn has_property(&self, name: &str) -> bool;

    fn reg_window(&self) -> Option<RegWindow>;
}

impl<T: DtNode + ?Sized> DtNode for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn has_property(&self, name: &str) -> bool {
        (**self).has_property(name)
    }

    fn reg_window(&self) -> Option<RegWindow> {
        (**self).reg_window()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DtError {
    #[error("DTB address is null")]
    Null,
    #[error("invalid DTB magic number {0:#x}")]
    BadMagic(u32),
    #[error("failed to parse DTB")]
    Malformed,
}

const FDT_MAGIC: u32 = 0xd00d_feed;

/// [`DeviceTree`] backed by the `fdt` crate.
pub struct FdtTree<'a> {
    fdt: Fdt<'a>,
}

impl<'a> FdtTree<'a> {
    /// # Errors
    /// Returns [`DtError::Malformed`] if the blob header or structure block
    /// does not parse.
    pub fn from_bytes(blob: &'a [u8]) -> Result<Self, DtError> {
        let fdt = Fdt::new(blob).map_err(|_| DtError::Malformed)?;
        Ok(Self { fdt })
    }

    /// Parse the blob the bootloader left at `dtb_addr`.
    ///
    /// # Safety
    /// `dtb_addr` must point to a device tree blob that stays mapped and
    /// unmodified for `'a`.
    ///
    /// # Errors
    /// Fails on a null address, a bad magic number, or a malformed blob.
    pub unsafe fn from_addr(dtb_addr: usize) -> Result<Self, DtError> {
        if dtb_addr == 0 {
            return Err(DtError::Null);
        }

        let dtb_ptr = dtb_addr as *const u8;

        // SAFETY: caller guarantees a readable blob at `dtb_addr`; the header
        // is at least 8 bytes long.
        let (magic, total_size) = unsafe {
            (
                u32::from_be(core::ptr::read_volatile(dtb_ptr.cast::<u32>())),
                u32::from_be(core::ptr::read_volatile(dtb_ptr.add(4).cast::<u32>())) as usize,
            )
        };
        if magic != FDT_MAGIC {
            return Err(DtError::BadMagic(magic));
        }

        // SAFETY: the header says the blob is `total_size` bytes long.
        let blob = unsafe { core::slice::from_raw_parts(dtb_ptr, total_size) };
        Self::from_bytes(blob)
    }
}

impl<'a> DeviceTree for FdtTree<'a> {
    type Node<'n>
        = FdtNodeRef<'n, 'a>
    where
        Self: 'n;

    fn find_compatible(&self, compatible: &str) -> Option<Self::Node<'_>> {
        self.fdt
            .find_compatible(&[compatible])
            .map(|node| FdtNodeRef { node })
    }
}

pub struct FdtNodeRef<'b, 'a> {
    node: FdtNode<'b, 'a>,
}

impl DtNode for FdtNodeRef<'_, '_> {
    fn name(&self) -> &str {
        self.node.name
    }

    fn is_available(&self) -> bool {
        match self.node.property("status").and_then(|p| p.as_str()) {
            None => true,
            Some(status) => status == "okay" || status == "ok",
        }
    }

    fn has_property(&self, name: &str) -> bool {
        self.node.property(name).is_some()
    }

    fn reg_window(&self) -> Option<RegWindow> {
        let region = self.node.reg()?.next()?;
        Some(RegWindow {
            base: region.starting_address as usize,
            size: region.size.unwrap_or(regs::WINDOW_SIZE),
        })
    }
}
