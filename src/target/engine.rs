// Licensed under the Apache-2.0 license

//! The target engine: event dispatch, session state machine and
//! memory-mapped register emulation.
//!
//! [`I2cTarget`] owns the port backend, one session record and the optional
//! IRQ binding. The backend's ISR decodes silicon status into the bus-event
//! entry points (`on_address_match`, `on_read_request`, `on_write_request`,
//! `on_stop`/`on_restart`); the engine runs its transition synchronously in
//! that context and never blocks.
//!
//! With a backing buffer attached the engine behaves like an I2C EEPROM or
//! sensor register file: a configurable address phase selects an offset,
//! data bytes stream from there with wraparound. Without a buffer every
//! byte movement is delegated to the IRQ handler, with a safe default (one
//! zero byte out, one byte discarded in) when no handler claims the event.

use embedded_hal::i2c::SevenBitAddress;

use crate::common::{Logger, NoOpLogger};
use crate::target::common::{Error, EventFlags, TargetConfig};
use crate::target::irq::{EventCtx, IrqBinding, IrqHandler};
use crate::target::session::{Session, State};
use crate::target::traits::{Backend, EventHandler, NullHandler};

/// Hardware FIFOs hand over at most this many bytes per write request.
const WRITE_SCRATCH: usize = 4;

/// One I2C target instance.
///
/// The backing buffer, when present, is borrowed for the engine's lifetime
/// and must not be mutated from outside the event-dispatch path while the
/// target is armed.
pub struct I2cTarget<'b, B, H = NullHandler, L = NoOpLogger>
where
    B: Backend,
    H: EventHandler<B>,
    L: Logger,
{
    backend: B,
    address: SevenBitAddress,
    session: Session,
    mem: Option<&'b mut [u8]>,
    irq: Option<IrqBinding<H>>,
    logger: L,
}

impl<'b, B, H> I2cTarget<'b, B, H, NoOpLogger>
where
    B: Backend,
    H: EventHandler<B>,
{
    /// Create an unarmed target.
    ///
    /// `mem` of `None` selects pure callback mode. The configured address
    /// width must be a whole number of bytes, at most four.
    ///
    /// # Errors
    ///
    /// `Error::InvalidAddressWidth` for a width outside {0, 8, 16, 24, 32};
    /// `Error::BackingBufferEmpty` for a present but zero-length buffer.
    pub fn new(
        backend: B,
        config: TargetConfig,
        mem: Option<&'b mut [u8]>,
    ) -> Result<Self, Error> {
        Self::with_logger(backend, config, mem, NoOpLogger)
    }
}

impl<'b, B, H, L> I2cTarget<'b, B, H, L>
where
    B: Backend,
    H: EventHandler<B>,
    L: Logger,
{
    /// Like [`I2cTarget::new`], with an explicit logger.
    ///
    /// # Errors
    ///
    /// Same as [`I2cTarget::new`].
    pub fn with_logger(
        backend: B,
        config: TargetConfig,
        mem: Option<&'b mut [u8]>,
        logger: L,
    ) -> Result<Self, Error> {
        if config.mem_addr_bits % 8 != 0 || config.mem_addr_bits > 32 {
            return Err(Error::InvalidAddressWidth);
        }
        if let Some(buf) = &mem {
            if buf.is_empty() {
                return Err(Error::BackingBufferEmpty);
            }
        }
        Ok(Self {
            backend,
            address: config.address,
            session: Session::new(config.mem_addr_bits / 8),
            mem,
            irq: None,
            logger,
        })
    }

    /// Move `Inactive -> Idle` and re-arm the backend trigger mask if an
    /// IRQ binding is installed. No effect while a session is live.
    pub fn arm(&mut self) {
        if self.session.state != State::Inactive {
            return;
        }
        self.session.state = State::Idle;
        if let Some(binding) = &self.irq {
            if !binding.trigger.is_empty() {
                self.backend.irq_config(binding.trigger);
            }
        }
        self.logger.debug("i2c-target: armed");
    }

    /// Tear the target down: synthesize the end event for any open session,
    /// park the state machine in `Inactive` and disarm backend delivery.
    /// Later bus events are silently dropped until [`arm`](Self::arm).
    pub fn deinit(&mut self) {
        if self.session.state == State::Inactive {
            return;
        }
        self.close_open_session();
        self.session.state = State::Inactive;
        self.backend.irq_config(EventFlags::NONE);
        self.logger.debug("i2c-target: deinitialized");
    }

    /// Install or clear the IRQ binding.
    ///
    /// Delivery is disabled at the backend before the binding is touched, so
    /// an in-flight event can never observe a half-updated trigger mask, and
    /// re-enabled only when a handler with a nonempty trigger is in place.
    ///
    /// # Errors
    ///
    /// `Error::HardTriggerRequired` when a [`IrqHandler::Deferred`] handler
    /// requests any of the [`EventFlags::HARD_ONLY`] events.
    pub fn set_irq(
        &mut self,
        handler: Option<IrqHandler<H>>,
        trigger: EventFlags,
    ) -> Result<(), Error> {
        if let Some(h) = &handler {
            if h.is_deferred() && trigger.intersects(EventFlags::HARD_ONLY) {
                return Err(Error::HardTriggerRequired);
            }
        }
        self.backend.irq_config(EventFlags::NONE);
        self.irq = handler.map(|h| IrqBinding::new(h, trigger));
        if self.irq.is_some() && !trigger.is_empty() {
            self.backend.irq_config(trigger);
        }
        Ok(())
    }

    /// Bus event: this target's address was selected, direction attached.
    ///
    /// Closes any session still open (a repeated start never issued a stop
    /// for the previous one) and opens the new one.
    pub fn on_address_match(&mut self, want_read: bool) {
        if self.session.state == State::Inactive {
            return;
        }
        self.close_open_session();
        if want_read {
            self.dispatch(EventFlags::ADDR_MATCH_READ);
            self.session.state = State::AddrMatchRead;
        } else {
            self.dispatch(EventFlags::ADDR_MATCH_WRITE);
            self.session.state = State::AddrMatchWrite;
        }
    }

    /// Bus event: the controller wants the next byte.
    ///
    /// In memory mode this supplies `mem[mem_addr]` and advances the pointer
    /// with wraparound. If no address phase ran for this session, reads
    /// continue from wherever the previous session left the pointer; this is
    /// the sequential-read behavior register devices exhibit and is kept
    /// deliberately.
    pub fn on_read_request(&mut self) {
        if self.session.state == State::Inactive {
            return;
        }
        let handled = self.dispatch(EventFlags::READ_REQ);

        let Some(len) = self.mem.as_ref().map(|m| m.len()) else {
            self.session.state = State::Reading;
            if !handled {
                // Nothing to say: keep the bus moving with a zero byte.
                self.backend.write_bytes(&[0]);
            }
            return;
        };

        if self.session.state == State::MemAddrSelect {
            // Address phase cut short by a direct read request; resolve with
            // whatever accumulated.
            self.session.resolve_address(len);
            self.dispatch(EventFlags::MEM_ADDR_MATCH);
        }
        self.session.state = State::Reading;

        let byte = self
            .mem
            .as_deref()
            .and_then(|m| m.get(self.session.mem_addr))
            .copied()
            .unwrap_or(0);
        self.session.advance(len);
        self.backend.write_bytes(&[byte]);
    }

    /// Bus event: the controller delivered bytes.
    ///
    /// In memory mode the first `mem_addr_bytes` bytes of a fresh write
    /// session select the register offset; the rest are stored with
    /// wraparound. A width of zero skips the address phase entirely and the
    /// first data byte lands at the current pointer.
    pub fn on_write_request(&mut self) {
        if self.session.state == State::Inactive {
            return;
        }
        let handled = self.dispatch(EventFlags::WRITE_REQ);

        let Some(len) = self.mem.as_ref().map(|m| m.len()) else {
            self.session.state = State::Writing;
            if !handled {
                // Nobody wants it: drain one byte so the FIFO cannot stall.
                let mut scratch = [0u8; 1];
                self.backend.read_bytes(&mut scratch);
            }
            return;
        };

        let mut scratch = [0u8; WRITE_SCRATCH];
        let count = self.backend.read_bytes(&mut scratch);
        for &byte in scratch.iter().take(count) {
            if self.session.state == State::AddrMatchWrite {
                if self.session.mem_addr_bytes == 0 {
                    // No address phase at width zero: data continues at the
                    // pointer left by the previous session, as on the read
                    // side.
                    self.session.state = State::Writing;
                } else {
                    self.session.begin_address_phase();
                }
            }
            if self.session.state == State::MemAddrSelect && self.session.mem_addr_remaining > 0 {
                if self.session.accumulate_address_byte(byte) {
                    self.session.resolve_address(len);
                    self.dispatch(EventFlags::MEM_ADDR_MATCH);
                }
            } else {
                if self.session.state == State::MemAddrSelect {
                    self.session.state = State::Writing;
                }
                if let Some(slot) = self
                    .mem
                    .as_deref_mut()
                    .and_then(|m| m.get_mut(self.session.mem_addr))
                {
                    *slot = byte;
                }
                self.session.advance(len);
            }
        }
    }

    /// Bus event: stop condition.
    pub fn on_stop(&mut self) {
        if self.session.state == State::Inactive {
            return;
        }
        self.close_open_session();
    }

    /// Bus event: restart without a stop. Session bookkeeping is identical
    /// to a stop; only the electrical sequence differs.
    pub fn on_restart(&mut self) {
        self.on_stop();
    }

    /// Drain the deferred event queue, invoking the handler once per queued
    /// dispatch in arrival order. Call from normal (cooperative) context.
    /// Draining is permitted after [`deinit`](Self::deinit) so that end
    /// events synthesized during teardown are still observed.
    pub fn process_pending(&mut self) {
        let Some(binding) = self.irq.as_mut() else {
            return;
        };
        while let Some(flags) = binding.pending.pop_front() {
            if let IrqHandler::Deferred(handler) = &mut binding.handler {
                let mut ctx = EventCtx::new(&mut self.backend, self.session.mem_addr_last);
                handler.on_event(flags, &mut ctx);
            }
        }
    }

    /// Drain received bytes from the hardware FIFO into `buf`.
    /// Callback-mode counterpart of the memory emulation's write path.
    pub fn read_into(&mut self, buf: &mut [u8]) -> usize {
        self.backend.read_bytes(buf)
    }

    /// Queue response bytes for the controller.
    /// Callback-mode counterpart of the memory emulation's read path.
    pub fn write(&mut self, data: &[u8]) -> usize {
        self.backend.write_bytes(data)
    }

    /// The most recently resolved memory-emulation address. Unlike the
    /// internal pointer it does not advance with data bytes.
    #[must_use]
    pub fn last_resolved_address(&self) -> usize {
        self.session.mem_addr_last
    }

    /// Latched flags of the most recent dispatch ("why was I called").
    #[must_use]
    pub fn irq_flags(&self) -> EventFlags {
        self.irq
            .as_ref()
            .map_or(EventFlags::NONE, |binding| binding.latched)
    }

    /// Current protocol state.
    #[must_use]
    pub fn state(&self) -> State {
        self.session.state
    }

    /// Configured bus address.
    #[must_use]
    pub fn address(&self) -> SevenBitAddress {
        self.address
    }

    /// Direct access to the backing buffer, if one is attached. Intended for
    /// the embedding layer while no transaction is in flight.
    pub fn memory_mut(&mut self) -> Option<&mut [u8]> {
        self.mem.as_deref_mut()
    }

    /// The port backend, for embedder-side housekeeping.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Dispatch `flags` against the IRQ binding.
    ///
    /// The only path that ever calls user code. Returns whether a handler
    /// claimed the event; callers fall back to default byte handling when it
    /// did not.
    fn dispatch(&mut self, flags: EventFlags) -> bool {
        if flags.contains(EventFlags::MEM_ADDR_MATCH) {
            self.session.mem_addr_last = self.session.mem_addr;
        }
        let Some(binding) = self.irq.as_mut() else {
            return false;
        };
        let matched = binding.trigger & flags;
        if matched.is_empty() {
            return false;
        }
        binding.latched = matched;
        match &mut binding.handler {
            IrqHandler::Immediate(handler) => {
                let mut ctx = EventCtx::new(&mut self.backend, self.session.mem_addr_last);
                handler.on_event(matched, &mut ctx);
            }
            IrqHandler::Deferred(_) => {
                if binding.pending.push_back(matched).is_err() {
                    self.logger.warn("i2c-target: deferred queue full, event dropped");
                }
            }
        }
        true
    }

    /// Pair any open session with its end event and return to `Idle`.
    ///
    /// Runs on address match, stop, restart and teardown alike, so every
    /// session that entered `Reading` or `Writing` closes exactly once even
    /// when the bus never issues an explicit stop.
    fn close_open_session(&mut self) {
        match self.session.state {
            State::Reading => {
                self.dispatch(EventFlags::END_READ);
            }
            State::AddrMatchWrite | State::Writing => {
                self.dispatch(EventFlags::END_WRITE);
            }
            _ => {}
        }
        self.session.state = State::Idle;
    }
}
