// Licensed under the Apache-2.0 license

//! Per-instance session state.
//!
//! [`Session`] is the mutable record behind one target instance: the
//! protocol state plus the memory-emulation address accumulator. It holds no
//! references to hardware or buffers; the engine owns those and drives the
//! session exclusively from bus events.

/// Protocol state of a target session.
///
/// `Inactive` is reached only before [`arm`](crate::target::I2cTarget::arm)
/// or through [`deinit`](crate::target::I2cTarget::deinit); every other
/// state loops back to `Idle` when the session closes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum State {
    /// Not armed; all bus events are dropped.
    Inactive,
    /// Armed, no transaction in flight.
    Idle,
    /// Addressed for a controller read, no byte moved yet.
    AddrMatchRead,
    /// Addressed for a controller write, no byte moved yet.
    AddrMatchWrite,
    /// Consuming memory-emulation address bytes.
    MemAddrSelect,
    /// Supplying data bytes to the controller.
    Reading,
    /// Accepting data bytes from the controller.
    Writing,
}

/// Mutable state of one target instance.
pub(crate) struct Session {
    pub(crate) state: State,
    /// Address bytes expected before the data phase (width / 8).
    pub(crate) mem_addr_bytes: u8,
    /// Address bytes still to consume in the current address phase.
    pub(crate) mem_addr_remaining: u8,
    /// Current offset into the backing buffer. In `[0, len)` once resolved;
    /// keeps advancing (with wraparound) after each access.
    pub(crate) mem_addr: usize,
    /// Most recently resolved address, exposed read-only upward. Unlike
    /// `mem_addr` it does not advance with data bytes.
    pub(crate) mem_addr_last: usize,
}

impl Session {
    pub(crate) fn new(mem_addr_bytes: u8) -> Self {
        Self {
            state: State::Inactive,
            mem_addr_bytes,
            mem_addr_remaining: 0,
            mem_addr: 0,
            mem_addr_last: 0,
        }
    }

    /// Start a fresh address phase. The accumulator restarts at zero even if
    /// the previous phase was cut short.
    pub(crate) fn begin_address_phase(&mut self) {
        self.state = State::MemAddrSelect;
        self.mem_addr = 0;
        self.mem_addr_remaining = self.mem_addr_bytes;
    }

    /// Fold one address byte into the accumulator. Returns `true` when this
    /// byte completed the phase; the caller then resolves against the buffer
    /// length. Must only be called while `mem_addr_remaining > 0`.
    pub(crate) fn accumulate_address_byte(&mut self, byte: u8) -> bool {
        self.mem_addr = (self.mem_addr << 8) | usize::from(byte);
        self.mem_addr_remaining -= 1;
        self.mem_addr_remaining == 0
    }

    /// Clamp the accumulated address into the buffer. The last resolved
    /// address is recorded by the dispatcher, not here.
    pub(crate) fn resolve_address(&mut self, len: usize) {
        self.mem_addr %= len;
    }

    /// Advance the data pointer by one, wrapping at the buffer length.
    pub(crate) fn advance(&mut self, len: usize) {
        self.mem_addr = (self.mem_addr + 1) % len;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_inactive() {
        let session = Session::new(2);
        assert_eq!(session.state, State::Inactive);
        assert_eq!(session.mem_addr_bytes, 2);
        assert_eq!(session.mem_addr, 0);
        assert_eq!(session.mem_addr_last, 0);
    }

    #[test]
    fn address_phase_accumulates_big_endian() {
        let mut session = Session::new(2);
        session.begin_address_phase();
        assert_eq!(session.state, State::MemAddrSelect);
        assert_eq!(session.mem_addr_remaining, 2);

        assert!(!session.accumulate_address_byte(0x12));
        assert!(session.accumulate_address_byte(0x34));
        assert_eq!(session.mem_addr, 0x1234);
    }

    #[test]
    fn begin_address_phase_discards_partial_accumulation() {
        let mut session = Session::new(2);
        session.begin_address_phase();
        session.accumulate_address_byte(0xff);

        session.begin_address_phase();
        assert_eq!(session.mem_addr, 0);
        assert_eq!(session.mem_addr_remaining, 2);
    }

    #[test]
    fn resolve_clamps_into_buffer() {
        let mut session = Session::new(1);
        session.begin_address_phase();
        session.accumulate_address_byte(0x15);
        session.resolve_address(16);
        assert_eq!(session.mem_addr, 0x15 % 16);
    }

    #[test]
    fn advance_wraps_at_len() {
        let mut session = Session::new(0);
        session.mem_addr = 15;
        session.advance(16);
        assert_eq!(session.mem_addr, 0);
        session.advance(16);
        assert_eq!(session.mem_addr, 1);
    }
}
