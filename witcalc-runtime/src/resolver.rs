//! Signal resolution
//!
//! Translates a signal name into its offset in the main component's signal
//! table by handing the module the name's FNV-1a hash.

use crate::error::Result;
use crate::instance::CircuitInstance;
use crate::module::CircuitModule;
use tracing::debug;
use witcalc_spec::{SignalHash, MAIN_COMPONENT};

impl<M: CircuitModule> CircuitInstance<M> {
    /// Resolve `name` to a signal offset, using `cell` as the result slot
    pub fn resolve_signal(&mut self, cell: u32, name: &str) -> Result<u32> {
        let hash = SignalHash::of(name);
        self.signal_offset32(cell, MAIN_COMPONENT, hash)?;
        let offset = self.read_u32(cell)?;
        debug!(name, %hash, offset, "resolved signal");
        Ok(offset)
    }
}
