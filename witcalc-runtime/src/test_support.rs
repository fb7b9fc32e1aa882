//! In-process fixture circuit for tests
//!
//! [`SquareCircuit`] implements the module ABI over a plain byte vector for
//! the circuit `out <== a*a`, generalized to a sum of squares over every
//! declared input signal. Signal 0 is the constant one, the declared inputs
//! follow in order, and `out` is the last signal. Derived values are stored
//! in Montgomery long form; input frames are stored exactly as received.

use crate::module::{CallFault, CircuitModule, ErrorReport};
use num_bigint::BigUint;
use num_traits::Zero;
use witcalc_spec::{abi::exports, codec, FieldParams, SignalHash};
use witcalc_spec::{FRAME_HEADER_LEN, LONG_FLAG, MONTGOMERY_FLAG};

pub const BN254_PRIME: &str =
    "21888242871839275222246405745257275088548364400416034343698204186575808495617";

const MEMORY_LEN: usize = 1 << 16;
const RAW_PRIME_PTR: u32 = 0x40;
const WITNESS_PTR: u32 = 0x100;
const HEAP_START: u32 = 0x8000;
const N32: usize = 32;
const FR_LEN: usize = FRAME_HEADER_LEN + N32;

/// Error codes the fixture reports through its error channel
pub const ERR_SIGNAL_NOT_FOUND: i32 = 1;
pub const ERR_SIGNAL_ALREADY_SET: i32 = 3;
pub const ERR_ASSERT_FAILED: i32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Export {
    GetFrLen,
    GetPRawPrime,
    GetNVars,
    Init,
    GetSignalOffset32,
    SetSignal,
    GetPWitness,
    GetWitnessBuffer,
}

impl Export {
    fn name(self) -> &'static str {
        match self {
            Export::GetFrLen => exports::GET_FR_LEN,
            Export::GetPRawPrime => exports::GET_P_RAW_PRIME,
            Export::GetNVars => exports::GET_N_VARS,
            Export::Init => exports::INIT,
            Export::GetSignalOffset32 => exports::GET_SIGNAL_OFFSET32,
            Export::SetSignal => exports::SET_SIGNAL,
            Export::GetPWitness => exports::GET_P_WITNESS,
            Export::GetWitnessBuffer => exports::GET_WITNESS_BUFFER,
        }
    }

    fn arity(self) -> usize {
        match self {
            Export::Init | Export::GetPWitness => 1,
            Export::GetSignalOffset32 | Export::SetSignal => 4,
            _ => 0,
        }
    }

    const ALL: [Export; 8] = [
        Export::GetFrLen,
        Export::GetPRawPrime,
        Export::GetNVars,
        Export::Init,
        Export::GetSignalOffset32,
        Export::SetSignal,
        Export::GetPWitness,
        Export::GetWitnessBuffer,
    ];
}

struct InputSignal {
    hash: SignalHash,
    offset: u32,
    len: u32,
}

pub struct SquareCircuit {
    memory: Vec<u8>,
    params: FieldParams,
    inputs: Vec<InputSignal>,
    assigned: Vec<bool>,
    sanity_check: bool,
    hidden: Vec<&'static str>,
    trap_on: Option<Export>,
    input_limit: Option<BigUint>,
    overrides: Vec<(Export, i32)>,
    set_calls: usize,
}

impl SquareCircuit {
    /// `out <== a*a`: witness layout `[one, a, out]`
    pub fn new() -> Self {
        Self::with_inputs(&[("a", 1)])
    }

    /// Declare input signals as `(name, length)`, laid out consecutively
    pub fn with_inputs(inputs: &[(&str, u32)]) -> Self {
        let params = Self::params();
        let mut memory = vec![0u8; MEMORY_LEN];
        memory[..4].copy_from_slice(&HEAP_START.to_le_bytes());
        let prime_at = RAW_PRIME_PTR as usize;
        codec::store_raw(&mut memory[prime_at..prime_at + N32], params.prime())
            .expect("prime fits its payload");

        let mut offset = 1;
        let inputs: Vec<InputSignal> = inputs
            .iter()
            .map(|(name, len)| {
                let signal = InputSignal {
                    hash: SignalHash::of(name),
                    offset,
                    len: *len,
                };
                offset += len;
                signal
            })
            .collect();
        let n_vars = offset as usize + 1;

        Self {
            memory,
            params,
            inputs,
            assigned: vec![false; n_vars],
            sanity_check: false,
            hidden: Vec::new(),
            trap_on: None,
            input_limit: None,
            overrides: Vec::new(),
            set_calls: 0,
        }
    }

    /// BN254 scalar field with 32-byte payloads
    pub fn params() -> FieldParams {
        let prime = BigUint::parse_bytes(BN254_PRIME.as_bytes(), 10).expect("decimal literal");
        FieldParams::new(prime, N32).expect("BN254 parameters")
    }

    /// Pretend the named export does not exist
    pub fn hide_export(&mut self, name: &'static str) {
        self.hidden.push(name);
    }

    /// Make every call to `export` trap
    pub fn trap_on(&mut self, export: Export) {
        self.trap_on = Some(export);
    }

    /// Under sanity checking, reject input values at or above `limit`
    pub fn reject_inputs_from(&mut self, limit: u64) {
        self.input_limit = Some(BigUint::from(limit));
    }

    /// Report `value` from `export` instead of the real answer
    ///
    /// For `getSignalOffset32` the value lands in the result cell.
    pub fn override_result(&mut self, export: Export, value: i32) {
        self.overrides.push((export, value));
    }

    pub fn n_vars(&self) -> u32 {
        self.assigned.len() as u32
    }

    /// Number of `setSignal` calls since creation
    pub fn set_calls(&self) -> usize {
        self.set_calls
    }

    pub fn free_pos(&self) -> u32 {
        u32::from_le_bytes([self.memory[0], self.memory[1], self.memory[2], self.memory[3]])
    }

    fn overridden(&self, export: Export) -> Option<i32> {
        self.overrides
            .iter()
            .rev()
            .find(|(e, _)| *e == export)
            .map(|(_, value)| *value)
    }

    fn span(&self, at: i32, len: usize) -> Result<&[u8], CallFault> {
        let start = at as u32 as usize;
        start
            .checked_add(len)
            .and_then(|end| self.memory.get(start..end))
            .ok_or_else(|| CallFault::Trap(format!("memory access out of bounds at {start:#x}")))
    }

    fn span_mut(&mut self, at: i32, len: usize) -> Result<&mut [u8], CallFault> {
        let start = at as u32 as usize;
        start
            .checked_add(len)
            .and_then(|end| self.memory.get_mut(start..end))
            .ok_or_else(|| CallFault::Trap(format!("memory access out of bounds at {start:#x}")))
    }

    fn slot(&self, signal: u32) -> usize {
        WITNESS_PTR as usize + signal as usize * FR_LEN
    }

    fn write_short(&mut self, signal: u32, value: u32) {
        let at = self.slot(signal);
        self.memory[at..at + 4].copy_from_slice(&value.to_le_bytes());
        self.memory[at + 4..at + 8].fill(0);
    }

    fn write_montgomery(&mut self, signal: u32, value: &BigUint) -> Result<(), CallFault> {
        let at = self.slot(signal);
        let mont = self.params.to_montgomery(value);
        self.memory[at..at + 4].fill(0);
        self.memory[at + 4..at + 8].copy_from_slice(&(LONG_FLAG | MONTGOMERY_FLAG).to_le_bytes());
        codec::store_raw(&mut self.memory[at + 8..at + FR_LEN], &mont)
            .map_err(|err| CallFault::Trap(err.to_string()))
    }

    fn read_slot(&self, signal: u32) -> Result<BigUint, CallFault> {
        let at = self.slot(signal);
        codec::decode(&self.params, &self.memory[at..at + FR_LEN])
            .map_err(|err| CallFault::Trap(err.to_string()))
    }

    fn abort(code: i32, message: &str, params: [i32; 4]) -> CallFault {
        CallFault::Abort(ErrorReport {
            code,
            message: message.to_string(),
            params,
        })
    }

    fn init(&mut self, sanity_check: i32) {
        let witness_end = self.slot(self.n_vars());
        self.memory[WITNESS_PTR as usize..witness_end].fill(0);
        self.assigned.fill(false);
        self.sanity_check = sanity_check != 0;
        self.write_short(0, 1);
        self.assigned[0] = true;
    }

    fn signal_offset(&mut self, args: &[i32]) -> Result<(), CallFault> {
        let hash = SignalHash {
            msb: args[2] as u32,
            lsb: args[3] as u32,
        };
        let offset = match self.overridden(Export::GetSignalOffset32) {
            Some(value) => value as u32,
            None => self
                .inputs
                .iter()
                .find(|input| input.hash == hash)
                .map(|input| input.offset)
                .ok_or_else(|| {
                    Self::abort(ERR_SIGNAL_NOT_FOUND, "Signal not found", [args[2], args[3], 0, 0])
                })?,
        };
        self.span_mut(args[0], 4)?
            .copy_from_slice(&offset.to_le_bytes());
        Ok(())
    }

    fn set_signal(&mut self, args: &[i32]) -> Result<(), CallFault> {
        self.set_calls += 1;
        let signal = args[2] as u32;

        let is_input = self
            .inputs
            .iter()
            .any(|input| signal >= input.offset && signal - input.offset < input.len);
        if !is_input {
            return Err(Self::abort(ERR_SIGNAL_NOT_FOUND, "Signal not found", [args[2], 0, 0, 0]));
        }
        if self.sanity_check && self.assigned[signal as usize] {
            return Err(Self::abort(ERR_SIGNAL_ALREADY_SET, "Signal already set", [args[2], 0, 0, 0]));
        }

        let frame = self.span(args[3], FR_LEN)?.to_vec();
        let value = codec::decode(&self.params, &frame).map_err(|err| CallFault::Trap(err.to_string()))?;
        if let (true, Some(limit)) = (self.sanity_check, &self.input_limit) {
            if &value >= limit {
                return Err(Self::abort(ERR_ASSERT_FAILED, "Assert Failed", [args[2], 0, 0, 0]));
            }
        }

        let at = self.slot(signal);
        self.memory[at..at + FR_LEN].copy_from_slice(&frame);
        self.assigned[signal as usize] = true;

        let out = self.n_vars() - 1;
        if self.assigned[1..out as usize].iter().all(|set| *set) {
            let mut sum = BigUint::zero();
            for input in 1..out {
                let v = self.read_slot(input)?;
                sum += &v * &v;
            }
            let sum = sum % self.params.prime();
            self.write_montgomery(out, &sum)?;
            self.assigned[out as usize] = true;
        }
        Ok(())
    }
}

impl Default for SquareCircuit {
    fn default() -> Self {
        Self::new()
    }
}

impl CircuitModule for SquareCircuit {
    type Func = Export;

    fn export(&self, name: &str) -> Option<Export> {
        if self.hidden.iter().any(|hidden| *hidden == name) {
            return None;
        }
        Export::ALL.into_iter().find(|export| export.name() == name)
    }

    fn invoke(&mut self, func: Export, args: &[i32]) -> Result<Option<i32>, CallFault> {
        if self.trap_on == Some(func) {
            return Err(CallFault::Trap(format!("{} trapped", func.name())));
        }
        if func.arity() != args.len() {
            return Err(CallFault::Trap(format!(
                "{} expects {} arguments, got {}",
                func.name(),
                func.arity(),
                args.len()
            )));
        }

        let result = match func {
            Export::GetFrLen => Some(FR_LEN as i32),
            Export::GetPRawPrime => Some(RAW_PRIME_PTR as i32),
            Export::GetNVars => Some(self.n_vars() as i32),
            Export::Init => {
                self.init(args[0]);
                None
            }
            Export::GetSignalOffset32 => {
                self.signal_offset(args)?;
                None
            }
            Export::SetSignal => {
                self.set_signal(args)?;
                None
            }
            Export::GetPWitness => {
                let index = args[0] as u32;
                if index >= self.n_vars() {
                    return Err(CallFault::Trap(format!("witness index {index} out of range")));
                }
                Some(self.slot(index) as i32)
            }
            Export::GetWitnessBuffer => Some(WITNESS_PTR as i32),
        };

        Ok(result.map(|value| self.overridden(func).unwrap_or(value)))
    }

    fn memory(&self) -> &[u8] {
        &self.memory
    }

    fn memory_mut(&mut self) -> &mut [u8] {
        &mut self.memory
    }
}
