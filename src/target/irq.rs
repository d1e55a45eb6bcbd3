// Licensed under the Apache-2.0 license

//! IRQ binding layer: handler classification and latched event flags.
//!
//! A target optionally carries one IRQ binding: the trigger mask the
//! embedder asked for, the flags latched by the most recent dispatch, and
//! the handler itself. The handler kind is a type-level distinction:
//! [`IrqHandler::Immediate`] runs inline in the delivering (interrupt)
//! context, [`IrqHandler::Deferred`] has its matched flags queued and runs
//! later from cooperative context when the embedder drains the queue.

use heapless::Deque;

use crate::target::common::EventFlags;
use crate::target::traits::Backend;

/// Capacity of the per-target deferred event queue. Events past this depth
/// are dropped (and logged); the latched flags still update, so a late drain
/// observes the most recent cause.
pub const DEFERRED_QUEUE_DEPTH: usize = 8;

/// How a handler is allowed to run.
pub enum IrqHandler<H> {
    /// Invoked synchronously on the delivering context. The handler must not
    /// block, allocate, or reschedule arbitrarily; the hardware FIFO deadline
    /// is still open while it runs.
    Immediate(H),
    /// Matched flags are queued at dispatch time; the handler runs when the
    /// embedder calls [`process_pending`](crate::target::I2cTarget::process_pending)
    /// from normal program context.
    Deferred(H),
}

impl<H> IrqHandler<H> {
    pub(crate) fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred(_))
    }
}

/// One target's IRQ configuration and latched status.
pub(crate) struct IrqBinding<H> {
    /// Events the owner wants notified about.
    pub(crate) trigger: EventFlags,
    /// Events that most recently fired ("why was I called").
    pub(crate) latched: EventFlags,
    pub(crate) handler: IrqHandler<H>,
    /// Matched flags waiting for a cooperative drain. Unused for immediate
    /// handlers.
    pub(crate) pending: Deque<EventFlags, DEFERRED_QUEUE_DEPTH>,
}

impl<H> IrqBinding<H> {
    pub(crate) fn new(handler: IrqHandler<H>, trigger: EventFlags) -> Self {
        Self {
            trigger,
            latched: EventFlags::NONE,
            handler,
            pending: Deque::new(),
        }
    }
}

/// Context handed to an [`EventHandler`] invocation.
///
/// Borrows the backend so callback-mode handlers can move bytes through the
/// FIFO while the bus transaction is still open, and carries the last
/// resolved memory address for register-style handlers.
pub struct EventCtx<'a, B: Backend> {
    backend: &'a mut B,
    mem_addr_last: usize,
}

impl<'a, B: Backend> EventCtx<'a, B> {
    pub(crate) fn new(backend: &'a mut B, mem_addr_last: usize) -> Self {
        Self {
            backend,
            mem_addr_last,
        }
    }

    /// Queue response bytes for the controller. Returns the count accepted
    /// by the hardware FIFO.
    pub fn send(&mut self, data: &[u8]) -> usize {
        self.backend.write_bytes(data)
    }

    /// Drain received bytes from the hardware FIFO. Returns the count read.
    pub fn receive(&mut self, buf: &mut [u8]) -> usize {
        self.backend.read_bytes(buf)
    }

    /// The most recently resolved memory-emulation address.
    #[must_use]
    pub fn last_resolved_address(&self) -> usize {
        self.mem_addr_last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::test_util::MockBackend;

    #[test]
    fn binding_starts_with_clear_status() {
        let binding: IrqBinding<crate::target::NullHandler> =
            IrqBinding::new(IrqHandler::Immediate(crate::target::NullHandler), EventFlags::ALL);
        assert_eq!(binding.latched, EventFlags::NONE);
        assert!(binding.pending.is_empty());
        assert!(!binding.handler.is_deferred());
    }

    #[test]
    fn event_ctx_moves_bytes_through_backend() {
        let mut backend = MockBackend::new();
        backend.push_rx(&[0xaa, 0xbb]);

        let mut ctx = EventCtx::new(&mut backend, 7);
        assert_eq!(ctx.last_resolved_address(), 7);

        let mut buf = [0u8; 4];
        assert_eq!(ctx.receive(&mut buf), 2);
        assert_eq!(&buf[..2], &[0xaa, 0xbb]);

        assert_eq!(ctx.send(&[0x55]), 1);
        assert_eq!(backend.tx, vec![0x55]);
    }
}
