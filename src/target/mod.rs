// Licensed under the Apache-2.0 license

//! I2C target (slave) protocol engine.
//!
//! This module implements the portable half of an I2C target: a session
//! state machine driven by bus events, an optional memory-mapped register
//! emulation over an externally-owned buffer, and an IRQ binding layer that
//! classifies callbacks as immediate (ISR context) or deferred (cooperative
//! context). All hardware access goes through the [`Backend`] trait, so the
//! engine works against any port-specific silicon driver.

pub mod arena;
pub mod common;
pub mod engine;
pub mod irq;
pub mod session;
pub mod traits;

#[cfg(test)]
pub(crate) mod test_util;

pub use arena::{TargetArena, TargetHandle};
pub use common::{Error, EventFlags, TargetConfig, TargetConfigBuilder};
pub use engine::I2cTarget;
pub use irq::{EventCtx, IrqHandler};
pub use session::State;
pub use traits::{Backend, EventHandler, NullHandler};
