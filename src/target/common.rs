// Licensed under the Apache-2.0 license

//! Common types for the I2C target engine.
//!
//! This module provides shared definitions for bus-event flags, error
//! handling, and target configuration used across the engine.

use embedded_hal::i2c::SevenBitAddress;

/// Bitset of target bus events.
///
/// A mask of these flags selects which events an IRQ handler wants (the
/// trigger mask), and the same representation is latched so the handler can
/// learn why it was invoked.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct EventFlags(u32);

impl EventFlags {
    /// Empty set.
    pub const NONE: Self = Self(0);
    /// This target was addressed for a controller read.
    pub const ADDR_MATCH_READ: Self = Self(1 << 0);
    /// This target was addressed for a controller write.
    pub const ADDR_MATCH_WRITE: Self = Self(1 << 1);
    /// The controller wants the next byte.
    pub const READ_REQ: Self = Self(1 << 2);
    /// The controller delivered one or more bytes.
    pub const WRITE_REQ: Self = Self(1 << 3);
    /// A read session ended (stop, restart or teardown).
    pub const END_READ: Self = Self(1 << 4);
    /// A write session ended (stop, restart or teardown).
    pub const END_WRITE: Self = Self(1 << 5);
    /// The memory-emulation address phase resolved a register offset.
    pub const MEM_ADDR_MATCH: Self = Self(1 << 6);

    /// Events that must be handled in immediate (ISR) context: by the time a
    /// deferred handler ran, the FIFO deadline for supplying or consuming the
    /// next byte would already have passed.
    pub const HARD_ONLY: Self = Self(
        Self::ADDR_MATCH_READ.0 | Self::ADDR_MATCH_WRITE.0 | Self::READ_REQ.0 | Self::WRITE_REQ.0,
    );

    /// Every event kind.
    pub const ALL: Self = Self(
        Self::HARD_ONLY.0 | Self::END_READ.0 | Self::END_WRITE.0 | Self::MEM_ADDR_MATCH.0,
    );

    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn from_bits_truncate(bits: u32) -> Self {
        Self(bits & Self::ALL.0)
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True if every flag in `other` is also set in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// True if `self` and `other` share at least one flag.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl core::ops::BitOr for EventFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl core::ops::BitOrAssign for EventFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl core::ops::BitAnd for EventFlags {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

/// Errors raised at configuration time.
///
/// The event-dispatch path itself is infallible: bus-shape anomalies are
/// absorbed by the state machine's unconditional session close, never
/// surfaced as errors.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// Memory address width is not one of 0, 8, 16, 24 or 32 bits.
    InvalidAddressWidth,
    /// A backing buffer was supplied but has zero length.
    BackingBufferEmpty,
    /// A hard-only trigger was requested with a deferred handler.
    HardTriggerRequired,
    /// All arena slots are attached.
    NoFreeSlot,
    /// The handle does not name an attached target.
    InvalidHandle,
}

/// Static configuration of one target instance.
pub struct TargetConfig {
    /// Bus address this target answers to. Matching itself happens in the
    /// backend silicon; the engine only records the value.
    pub address: SevenBitAddress,
    /// Width of the memory-emulation address phase in bits.
    /// Must be a multiple of 8, at most 32. Zero skips the address phase.
    pub mem_addr_bits: u8,
}

pub struct TargetConfigBuilder {
    address: SevenBitAddress,
    mem_addr_bits: u8,
}

impl Default for TargetConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TargetConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            address: 0x50,
            mem_addr_bits: 8,
        }
    }

    #[must_use]
    pub fn address(mut self, address: SevenBitAddress) -> Self {
        self.address = address;
        self
    }

    #[must_use]
    pub fn mem_addr_bits(mut self, bits: u8) -> Self {
        self.mem_addr_bits = bits;
        self
    }

    #[must_use]
    pub fn build(self) -> TargetConfig {
        TargetConfig {
            address: self.address,
            mem_addr_bits: self.mem_addr_bits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_set_operations() {
        let mask = EventFlags::READ_REQ | EventFlags::END_READ;
        assert!(mask.contains(EventFlags::READ_REQ));
        assert!(!mask.contains(EventFlags::WRITE_REQ));
        assert!(mask.intersects(EventFlags::HARD_ONLY));
        assert_eq!(
            mask & EventFlags::HARD_ONLY,
            EventFlags::READ_REQ
        );
        assert!(EventFlags::NONE.is_empty());
    }

    #[test]
    fn hard_only_covers_address_and_request_events() {
        for flag in [
            EventFlags::ADDR_MATCH_READ,
            EventFlags::ADDR_MATCH_WRITE,
            EventFlags::READ_REQ,
            EventFlags::WRITE_REQ,
        ] {
            assert!(EventFlags::HARD_ONLY.contains(flag));
        }
        assert!(!EventFlags::HARD_ONLY.intersects(EventFlags::END_READ | EventFlags::END_WRITE));
    }

    #[test]
    fn from_bits_truncate_masks_unknown_bits() {
        let flags = EventFlags::from_bits_truncate(0xffff_ffff);
        assert_eq!(flags, EventFlags::ALL);
    }

    #[test]
    fn builder_defaults_and_overrides() {
        let config = TargetConfigBuilder::new().build();
        assert_eq!(config.address, 0x50);
        assert_eq!(config.mem_addr_bits, 8);

        let config = TargetConfigBuilder::new()
            .address(0x3a)
            .mem_addr_bits(16)
            .build();
        assert_eq!(config.address, 0x3a);
        assert_eq!(config.mem_addr_bits, 16);
    }
}
