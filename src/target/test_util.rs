// Licensed under the Apache-2.0 license

//! Test doubles shared by the target engine's unit tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::target::common::EventFlags;
use crate::target::irq::EventCtx;
use crate::target::traits::{Backend, EventHandler};

/// In-memory stand-in for a port silicon driver: two byte queues for the
/// FIFOs plus a log of every IRQ mask the engine applied.
pub(crate) struct MockBackend {
    /// Bytes "received from the controller", waiting in the rx FIFO.
    pub rx: VecDeque<u8>,
    /// Bytes the engine queued for the controller.
    pub tx: Vec<u8>,
    /// Every mask passed to `irq_config`, in order.
    pub irq_log: Vec<EventFlags>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            rx: VecDeque::new(),
            tx: Vec::new(),
            irq_log: Vec::new(),
        }
    }

    /// Stage bytes as if the controller had written them onto the bus.
    pub fn push_rx(&mut self, data: &[u8]) {
        self.rx.extend(data.iter().copied());
    }
}

impl Backend for MockBackend {
    fn read_bytes(&mut self, buf: &mut [u8]) -> usize {
        let mut count = 0;
        for slot in buf.iter_mut() {
            match self.rx.pop_front() {
                Some(byte) => {
                    *slot = byte;
                    count += 1;
                }
                None => break,
            }
        }
        count
    }

    fn write_bytes(&mut self, data: &[u8]) -> usize {
        self.tx.extend_from_slice(data);
        data.len()
    }

    fn irq_config(&mut self, triggers: EventFlags) {
        self.irq_log.push(triggers);
    }
}

/// Handler that records every invocation as `(flags, last_resolved_address)`
/// and can optionally answer read requests with a fixed byte.
pub(crate) struct RecordingHandler {
    log: Rc<RefCell<Vec<(EventFlags, usize)>>>,
    read_response: Option<u8>,
}

impl RecordingHandler {
    pub fn new(log: Rc<RefCell<Vec<(EventFlags, usize)>>>) -> Self {
        Self {
            log,
            read_response: None,
        }
    }

    /// Answer every `READ_REQ` with `byte` through the event context.
    pub fn respond_on_read(mut self, byte: u8) -> Self {
        self.read_response = Some(byte);
        self
    }
}

impl EventHandler<MockBackend> for RecordingHandler {
    fn on_event(&mut self, flags: EventFlags, ctx: &mut EventCtx<'_, MockBackend>) {
        self.log
            .borrow_mut()
            .push((flags, ctx.last_resolved_address()));
        if flags.contains(EventFlags::READ_REQ) {
            if let Some(byte) = self.read_response {
                ctx.send(&[byte]);
            }
        }
    }
}

/// Just the event flags of a recording log, for order assertions.
pub(crate) fn events_of(log: &Rc<RefCell<Vec<(EventFlags, usize)>>>) -> Vec<EventFlags> {
    log.borrow().iter().map(|(flags, _)| *flags).collect()
}
