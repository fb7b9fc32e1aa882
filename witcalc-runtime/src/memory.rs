//! # Scratch Memory
//!
//! Bump allocation in the module's linear memory. The free pointer is the
//! little-endian u32 at byte 0; allocating advances it, and nothing is ever
//! freed individually. A computation saves a [`Checkpoint`] up front and
//! restores it at the end, reclaiming all of its scratch cells at once.

use crate::error::{Result, RuntimeError};
use crate::instance::CircuitInstance;
use crate::module::CircuitModule;
use witcalc_spec::{FieldParams, FREE_POINTER_OFFSET, INT_CELL_LEN};

/// Saved free-pointer value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(u32);

impl Checkpoint {
    pub fn offset(self) -> u32 {
        self.0
    }
}

impl<M: CircuitModule> CircuitInstance<M> {
    pub fn free_pos(&self) -> Result<u32> {
        self.read_u32(FREE_POINTER_OFFSET)
    }

    pub fn set_free_pos(&mut self, pos: u32) -> Result<()> {
        self.write_u32(FREE_POINTER_OFFSET, pos)
    }

    /// Reserve `len` bytes, returning their offset
    pub fn alloc(&mut self, len: u32) -> Result<u32> {
        let p = self.free_pos()?;
        let end = p.checked_add(len).ok_or(RuntimeError::OutOfBounds {
            offset: p as u64,
            len: len as usize,
        })?;
        // the reserved range must exist
        self.read_bytes(p, len as usize)?;
        self.set_free_pos(end)?;
        Ok(p)
    }

    /// Reserve an 8-byte integer cell
    pub fn alloc_int(&mut self) -> Result<u32> {
        self.alloc(INT_CELL_LEN)
    }

    /// Reserve one field-element frame (`8 + 4 * n32` bytes)
    pub fn alloc_field_element(&mut self, params: &FieldParams) -> Result<u32> {
        self.alloc(params.frame_len() as u32)
    }

    pub fn checkpoint(&self) -> Result<Checkpoint> {
        self.free_pos().map(Checkpoint)
    }

    pub fn restore(&mut self, checkpoint: Checkpoint) -> Result<()> {
        self.set_free_pos(checkpoint.0)
    }
}
