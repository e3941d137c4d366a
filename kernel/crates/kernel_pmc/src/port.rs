//! Raw register access
//!
//! The PMC core never dereferences device memory itself. Every load and store
//! goes through a [`RegisterPort`], so the same sequencing code drives the
//! mapped block on hardware and [`crate::sim::SimRegisters`] on a host.

use alloc::sync::Arc;
use core::ptr::NonNull;

use volatile::VolatilePtr;

/// Word-wide access to a register window.
///
/// Offsets are byte offsets from the start of the window and are not
/// validated. A port gives no ordering guarantee between callers; that is
/// the job of [`crate::Pmc`].
pub trait RegisterPort {
    fn read(&self, offset: u32) -> u32;

    fn write(&self, value: u32, offset: u32);
}

impl<T: RegisterPort + ?Sized> RegisterPort for &T {
    #[inline]
    fn read(&self, offset: u32) -> u32 {
        (**self).read(offset)
    }

    #[inline]
    fn write(&self, value: u32, offset: u32) {
        (**self).write(value, offset);
    }
}

impl<T: RegisterPort + ?Sized> RegisterPort for Arc<T> {
    #[inline]
    fn read(&self, offset: u32) -> u32 {
        (**self).read(offset)
    }

    #[inline]
    fn write(&self, value: u32, offset: u32) {
        (**self).write(value, offset);
    }
}

/// Register window backed by device memory.
///
/// All accesses are volatile so the compiler can neither merge nor reorder
/// them; the DPD and fuse sequences depend on every store reaching the
/// hardware in program order.
pub struct MmioPort {
    base: NonNull<u32>,
    size: usize,
}

impl MmioPort {
    /// Wrap an already mapped window.
    ///
    /// # Safety
    ///
    /// Caller must ensure:
    /// - `base` is the virtual address of a device-memory mapping that is
    ///   at least `size` bytes long and 4-byte aligned
    /// - the mapping outlives the port (the PMC is never unmapped)
    pub const unsafe fn new(base: NonNull<u32>, size: usize) -> Self {
        Self { base, size }
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline(always)]
    fn reg(&self, offset: u32) -> VolatilePtr<'_, u32> {
        debug_assert!(offset as usize + 4 <= self.size, "offset {offset:#x} out of window");
        // SAFETY: `new` guarantees the window is mapped and aligned; callers
        // of the port only pass register offsets inside it.
        unsafe { VolatilePtr::new(self.base.byte_add(offset as usize)) }
    }
}

impl RegisterPort for MmioPort {
    #[inline(always)]
    fn read(&self, offset: u32) -> u32 {
        self.reg(offset).read()
    }

    #[inline(always)]
    fn write(&self, value: u32, offset: u32) {
        self.reg(offset).write(value);
    }
}

// SAFETY: the port is a plain address; concurrent access is serialized by
// the access lock in `Pmc`, and single-word MMIO loads are coherent.
unsafe impl Send for MmioPort {}
// SAFETY: see above.
unsafe impl Sync for MmioPort {}
