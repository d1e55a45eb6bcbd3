// Licensed under the Apache-2.0 license

//! # I2C Target Hardware Abstraction Traits
//!
//! This module defines the seams between the portable protocol engine and
//! its collaborators. Each trait has a single responsibility and is injected
//! at construction, so the engine stays generic over any conforming
//! implementation:
//!
//! - [`Backend`]: the port-specific silicon driver (FIFO access, interrupt
//!   source configuration).
//! - [`EventHandler`]: user-level code notified about bus events.
//!
//! The backend calls *into* the engine with decoded bus events
//! (`on_address_match`, `on_read_request`, ...); the engine calls *out*
//! through `Backend` for byte transport and through `EventHandler` for
//! notification.

use crate::target::common::EventFlags;
use crate::target::irq::EventCtx;

/// Port-specific hardware driver for one target peripheral instance.
///
/// Implementations touch silicon registers; the engine never does. All three
/// operations are called from whatever context the hardware delivers events
/// in (normally ISR context) and must not block.
///
/// # Examples
///
/// ```rust,no_run
/// use i2c_target_engine::target::{Backend, EventFlags};
///
/// struct LoopbackBackend {
///     fifo: [u8; 4],
///     level: usize,
/// }
///
/// impl Backend for LoopbackBackend {
///     fn read_bytes(&mut self, buf: &mut [u8]) -> usize {
///         let n = buf.len().min(self.level);
///         buf[..n].copy_from_slice(&self.fifo[..n]);
///         self.level -= n;
///         n
///     }
///
///     fn write_bytes(&mut self, data: &[u8]) -> usize {
///         data.len().min(self.fifo.len())
///     }
///
///     fn irq_config(&mut self, _triggers: EventFlags) {}
/// }
/// ```
pub trait Backend {
    /// Drain up to `buf.len()` bytes from the hardware receive FIFO.
    ///
    /// Returns the number of bytes actually read, which may be zero.
    fn read_bytes(&mut self, buf: &mut [u8]) -> usize;

    /// Queue bytes into the hardware transmit FIFO.
    ///
    /// Returns the number of bytes actually accepted.
    fn write_bytes(&mut self, data: &[u8]) -> usize;

    /// Arm or disarm the peripheral's interrupt sources to match `triggers`.
    ///
    /// An empty mask disables event delivery entirely. The engine brackets
    /// IRQ reconfiguration between a disable and a re-enable call, so
    /// implementations must apply the mask synchronously.
    fn irq_config(&mut self, triggers: EventFlags);
}

/// User-level callback notified about matched bus events.
///
/// Whether `on_event` runs in immediate (ISR) or cooperative context is
/// decided by the [`IrqHandler`](crate::target::irq::IrqHandler) kind the
/// handler was installed with. In immediate context the usual ISR rules
/// apply: no blocking, no allocation.
///
/// A blanket implementation covers closures, so tests and simple embedders
/// can pass an `FnMut` directly.
pub trait EventHandler<B: Backend> {
    /// `flags` is the latched subset of the trigger mask that fired;
    /// `ctx` gives access to the FIFO and the last resolved memory address
    /// so callback-mode handlers can supply or consume bytes in time.
    fn on_event(&mut self, flags: EventFlags, ctx: &mut EventCtx<'_, B>);
}

impl<B, F> EventHandler<B> for F
where
    B: Backend,
    F: for<'a> FnMut(EventFlags, &mut EventCtx<'a, B>),
{
    fn on_event(&mut self, flags: EventFlags, ctx: &mut EventCtx<'_, B>) {
        self(flags, ctx);
    }
}

/// Handler that ignores every event.
///
/// Default handler type for memory-emulation targets that never install an
/// IRQ binding.
#[derive(Copy, Clone, Debug, Default)]
pub struct NullHandler;

impl<B: Backend> EventHandler<B> for NullHandler {
    fn on_event(&mut self, _flags: EventFlags, _ctx: &mut EventCtx<'_, B>) {}
}
