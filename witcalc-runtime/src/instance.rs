//! # Circuit Instance
//!
//! A loaded module paired with its export table. Exports are resolved once,
//! when the instance is created; every later call goes through the table.

use crate::error::{Result, RuntimeError};
use crate::module::CircuitModule;
use witcalc_spec::abi::exports;
use witcalc_spec::SignalHash;

/// The module's exports, resolved by name
#[derive(Debug, Clone, Copy)]
pub struct Exports<F> {
    pub get_fr_len: F,
    pub get_p_raw_prime: F,
    pub get_n_vars: F,
    pub init: F,
    pub get_signal_offset32: F,
    pub set_signal: F,
    pub get_p_witness: F,
    pub get_witness_buffer: F,
}

impl<F: Copy> Exports<F> {
    /// Resolve every export; fails on the first one missing
    pub fn resolve<M: CircuitModule<Func = F>>(module: &M) -> Result<Self> {
        let find = |name: &'static str| {
            module
                .export(name)
                .ok_or(RuntimeError::MissingExport { name })
        };

        Ok(Self {
            get_fr_len: find(exports::GET_FR_LEN)?,
            get_p_raw_prime: find(exports::GET_P_RAW_PRIME)?,
            get_n_vars: find(exports::GET_N_VARS)?,
            init: find(exports::INIT)?,
            get_signal_offset32: find(exports::GET_SIGNAL_OFFSET32)?,
            set_signal: find(exports::SET_SIGNAL)?,
            get_p_witness: find(exports::GET_P_WITNESS)?,
            get_witness_buffer: find(exports::GET_WITNESS_BUFFER)?,
        })
    }
}

/// A module with its resolved exports and typed wrappers over the ABI
pub struct CircuitInstance<M: CircuitModule> {
    module: M,
    exports: Exports<M::Func>,
    // set by the last `init`
    sanity_check: bool,
}

impl<M: CircuitModule> CircuitInstance<M> {
    pub fn new(module: M) -> Result<Self> {
        let exports = Exports::resolve(&module)?;
        Ok(Self {
            module,
            exports,
            sanity_check: false,
        })
    }

    pub fn module(&self) -> &M {
        &self.module
    }

    pub fn module_mut(&mut self) -> &mut M {
        &mut self.module
    }

    pub fn into_module(self) -> M {
        self.module
    }

    /// Whether the current evaluation was initialized with sanity checking
    pub fn sanity_check(&self) -> bool {
        self.sanity_check
    }

    // ========================================================================
    // Exports
    // ========================================================================

    fn call(&mut self, function: &'static str, func: M::Func, args: &[i32]) -> Result<Option<i32>> {
        let sanity_check = self.sanity_check;
        self.module
            .invoke(func, args)
            .map_err(|fault| RuntimeError::from_fault(function, fault, sanity_check))
    }

    fn call_i32(&mut self, function: &'static str, func: M::Func, args: &[i32]) -> Result<i32> {
        self.call(function, func, args)?
            .ok_or(RuntimeError::MissingResult { function })
    }

    /// `getFrLen`: frame length of one field element in bytes
    pub fn fr_len(&mut self) -> Result<i32> {
        self.call_i32(exports::GET_FR_LEN, self.exports.get_fr_len, &[])
    }

    /// `getPRawPrime`: memory offset of the raw prime magnitude
    pub fn raw_prime_ptr(&mut self) -> Result<u32> {
        let p = self.call_i32(exports::GET_P_RAW_PRIME, self.exports.get_p_raw_prime, &[])?;
        Ok(p as u32)
    }

    /// `getNVars`: number of witness variables
    pub fn n_vars(&mut self) -> Result<u32> {
        let n = self.call_i32(exports::GET_N_VARS, self.exports.get_n_vars, &[])?;
        u32::try_from(n).map_err(|_| RuntimeError::Call {
            function: exports::GET_N_VARS,
            reason: format!("negative variable count {n}"),
        })
    }

    /// `init`: reset the evaluation state
    pub fn init(&mut self, sanity_check: bool) -> Result<()> {
        self.sanity_check = sanity_check;
        self.call(exports::INIT, self.exports.init, &[sanity_check as i32])?;
        Ok(())
    }

    /// `getSignalOffset32`: resolve a hashed name; the offset lands in `p_result`
    pub fn signal_offset32(&mut self, p_result: u32, component: i32, hash: SignalHash) -> Result<()> {
        let (msb, lsb) = hash.as_args();
        let args = [p_result as i32, component, msb, lsb];
        self.call(exports::GET_SIGNAL_OFFSET32, self.exports.get_signal_offset32, &args)?;
        Ok(())
    }

    /// `setSignal`: assign the frame at `p_val` to one signal
    pub fn set_signal(&mut self, c_idx: i32, component: i32, signal: u32, p_val: u32) -> Result<()> {
        let args = [c_idx, component, signal as i32, p_val as i32];
        self.call(exports::SET_SIGNAL, self.exports.set_signal, &args)?;
        Ok(())
    }

    /// `getPWitness`: memory offset of witness slot `index`
    pub fn witness_ptr(&mut self, index: u32) -> Result<u32> {
        let p = self.call_i32(exports::GET_P_WITNESS, self.exports.get_p_witness, &[index as i32])?;
        Ok(p as u32)
    }

    /// `getWitnessBuffer`: memory offset of the contiguous witness buffer
    pub fn witness_buffer(&mut self) -> Result<u32> {
        let p = self.call_i32(exports::GET_WITNESS_BUFFER, self.exports.get_witness_buffer, &[])?;
        Ok(p as u32)
    }

    // ========================================================================
    // Memory
    // ========================================================================

    fn range(&self, offset: u32, len: usize) -> Result<std::ops::Range<usize>> {
        let start = offset as usize;
        start
            .checked_add(len)
            .filter(|end| *end <= self.module.memory().len())
            .map(|end| start..end)
            .ok_or(RuntimeError::OutOfBounds {
                offset: offset as u64,
                len,
            })
    }

    pub fn read_bytes(&self, offset: u32, len: usize) -> Result<&[u8]> {
        let range = self.range(offset, len)?;
        Ok(&self.module.memory()[range])
    }

    pub fn bytes_mut(&mut self, offset: u32, len: usize) -> Result<&mut [u8]> {
        let range = self.range(offset, len)?;
        Ok(&mut self.module.memory_mut()[range])
    }

    pub fn write_bytes(&mut self, offset: u32, bytes: &[u8]) -> Result<()> {
        self.bytes_mut(offset, bytes.len())?.copy_from_slice(bytes);
        Ok(())
    }

    pub fn read_u32(&self, offset: u32) -> Result<u32> {
        let mut word = [0u8; 4];
        word.copy_from_slice(self.read_bytes(offset, 4)?);
        Ok(u32::from_le_bytes(word))
    }

    pub fn write_u32(&mut self, offset: u32, value: u32) -> Result<()> {
        self.write_bytes(offset, &value.to_le_bytes())
    }
}
