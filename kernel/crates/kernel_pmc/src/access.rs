use spin::Mutex;

use crate::hal::Hal;
use crate::port::RegisterPort;

/// The PMC context.
///
/// Owns the mapped register window, the platform hooks and the access lock.
/// Every read-modify-write on the block, whatever register it targets, is
/// serialized by the one lock, so callers composing several operations see
/// them in a single global order.
///
/// There is exactly one PMC in the system; see [`crate::install`] for
/// keeping the context in a static.
pub struct Pmc<P, H> {
    port: P,
    hal: H,
    access_lock: Mutex<()>,
}

impl<P, H> Pmc<P, H>
where
    P: RegisterPort,
    H: Hal,
{
    pub const fn new(port: P, hal: H) -> Self {
        Self {
            port,
            hal,
            access_lock: Mutex::new(()),
        }
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn hal(&self) -> &H {
        &self.hal
    }

    #[inline(always)]
    pub(crate) fn readl(&self, offset: u32) -> u32 {
        self.port.read(offset)
    }

    #[inline(always)]
    pub(crate) fn writel(&self, value: u32, offset: u32) {
        self.port.write(value, offset);
    }

    /// Unlocked read-modify-write. Callers hold the access lock.
    #[inline]
    pub(crate) fn modify(&self, offset: u32, mask: u32, value: u32) {
        let reg = self.readl(offset);
        self.writel((reg & !mask) | (value & mask), offset);
    }

    /// Run `f` with the access lock held and local interrupts masked.
    ///
    /// Interrupts are masked before the lock is taken so an interrupt
    /// handler on this CPU cannot spin on a lock its own CPU holds.
    pub(crate) fn with_lock_irqsave<R>(&self, f: impl FnOnce() -> R) -> R {
        let were_enabled = self.hal.irq_save();
        let guard = self.access_lock.lock();
        let ret = f();
        drop(guard);
        self.hal.irq_restore(were_enabled);
        ret
    }

    /// Run `f` with the access lock held. Only for callers that never run in
    /// interrupt context.
    pub(crate) fn with_lock<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = self.access_lock.lock();
        f()
    }

    /// Replace the bits selected by `mask` in the register at `offset` with
    /// the corresponding bits of `value`.
    ///
    /// Safe from any context, including interrupt handlers.
    pub fn update(&self, offset: u32, mask: u32, value: u32) {
        self.with_lock_irqsave(|| self.modify(offset, mask, value));
    }

    /// Same as [`Pmc::update`] without masking interrupts.
    ///
    /// Mutually exclusive with `update` (same lock), but must not be called
    /// from interrupt context.
    pub fn update_in_task(&self, offset: u32, mask: u32, value: u32) {
        self.with_lock(|| self.modify(offset, mask, value));
    }

    /// Current raw value of the register at `offset`. Not locked; single
    /// register loads are coherent.
    pub fn get(&self, offset: u32) -> u32 {
        self.readl(offset)
    }
}
