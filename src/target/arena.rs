// Licensed under the Apache-2.0 license

//! Fixed-capacity arena of target instances.
//!
//! Ports drive several target-capable peripherals at once; instead of a
//! global instance table the embedder holds a [`TargetArena`] and addresses
//! each attached target through an explicit [`TargetHandle`]. Slots are
//! reused lowest-first after detach, and detaching always tears the target
//! down first so no slot is ever recycled with a session still open.

use crate::common::{Logger, NoOpLogger};
use crate::target::common::Error;
use crate::target::engine::I2cTarget;
use crate::target::traits::{Backend, EventHandler, NullHandler};

/// Default number of arena slots.
pub const MAX_TARGETS: usize = 4;

/// Index of an attached target. Only valid against the arena that issued it,
/// and only until the target is detached.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TargetHandle(usize);

impl TargetHandle {
    /// Raw slot index, e.g. for mapping to a peripheral interrupt number.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Slot storage for up to `N` target instances of a uniform backend and
/// handler type.
pub struct TargetArena<'b, B, H = NullHandler, L = NoOpLogger, const N: usize = MAX_TARGETS>
where
    B: Backend,
    H: EventHandler<B>,
    L: Logger,
{
    slots: [Option<I2cTarget<'b, B, H, L>>; N],
}

impl<'b, B, H, L, const N: usize> Default for TargetArena<'b, B, H, L, N>
where
    B: Backend,
    H: EventHandler<B>,
    L: Logger,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<'b, B, H, L, const N: usize> TargetArena<'b, B, H, L, N>
where
    B: Backend,
    H: EventHandler<B>,
    L: Logger,
{
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| None),
        }
    }

    /// Store `target` in the lowest free slot.
    ///
    /// # Errors
    ///
    /// `Error::NoFreeSlot` when every slot is attached.
    pub fn attach(&mut self, target: I2cTarget<'b, B, H, L>) -> Result<TargetHandle, Error> {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.is_none() {
                *slot = Some(target);
                return Ok(TargetHandle(index));
            }
        }
        Err(Error::NoFreeSlot)
    }

    /// Remove and return the target, tearing it down first so any open
    /// session produces its end event before the slot is freed.
    ///
    /// # Errors
    ///
    /// `Error::InvalidHandle` when the handle names no attached target.
    pub fn detach(&mut self, handle: TargetHandle) -> Result<I2cTarget<'b, B, H, L>, Error> {
        let slot = self.slots.get_mut(handle.0).ok_or(Error::InvalidHandle)?;
        let mut target = slot.take().ok_or(Error::InvalidHandle)?;
        target.deinit();
        Ok(target)
    }

    #[must_use]
    pub fn get(&self, handle: TargetHandle) -> Option<&I2cTarget<'b, B, H, L>> {
        self.slots.get(handle.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, handle: TargetHandle) -> Option<&mut I2cTarget<'b, B, H, L>> {
        self.slots.get_mut(handle.0).and_then(Option::as_mut)
    }

    #[must_use]
    pub fn is_attached(&self, handle: TargetHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Number of attached targets.
    #[must_use]
    pub fn attached(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Total slot count.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }
}
