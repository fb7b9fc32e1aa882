//! # Module ABI
//!
//! Names of the functions a compiled circuit exports, and of the diagnostic
//! callbacks it imports from the host.

/// Functions the circuit module must export
pub mod exports {
    /// `() -> i32`: frame length of one field element in bytes
    pub const GET_FR_LEN: &str = "getFrLen";
    /// `() -> i32`: memory offset of the raw prime magnitude
    pub const GET_P_RAW_PRIME: &str = "getPRawPrime";
    /// `() -> i32`: number of witness variables
    pub const GET_N_VARS: &str = "getNVars";
    /// `(sanityCheck: i32)`: reset the evaluation state
    pub const INIT: &str = "init";
    /// `(pResult, component, hashMSB, hashLSB)`: resolve a hashed signal name
    pub const GET_SIGNAL_OFFSET32: &str = "getSignalOffset32";
    /// `(cIdx, component, signal, pVal)`: assign one signal
    pub const SET_SIGNAL: &str = "setSignal";
    /// `(varIdx) -> i32`: memory offset of one witness slot
    pub const GET_P_WITNESS: &str = "getPWitness";
    /// `() -> i32`: memory offset of the contiguous witness buffer
    pub const GET_WITNESS_BUFFER: &str = "getWitnessBuffer";

    /// Every export the driver resolves, in resolution order
    pub const ALL: [&str; 8] = [
        GET_FR_LEN,
        GET_P_RAW_PRIME,
        GET_N_VARS,
        INIT,
        GET_SIGNAL_OFFSET32,
        SET_SIGNAL,
        GET_P_WITNESS,
        GET_WITNESS_BUFFER,
    ];
}

/// Host functions the circuit module imports
pub mod imports {
    /// Import namespace for the diagnostic callbacks
    pub const MODULE: &str = "runtime";
    /// `(code, pStr, a, b, c, d)`
    pub const ERROR: &str = "error";
    /// `(signal, pVal)`
    pub const LOG_SET_SIGNAL: &str = "logSetSignal";
    /// `(signal, pVal)`
    pub const LOG_GET_SIGNAL: &str = "logGetSignal";
    /// `(cIdx)`
    pub const LOG_START_COMPONENT: &str = "logStartComponent";
    /// `(cIdx)`
    pub const LOG_FINISH_COMPONENT: &str = "logFinishComponent";
    /// `(code)`
    pub const LOG: &str = "log";

    /// Namespace of the host-provided linear memory
    pub const MEMORY_MODULE: &str = "env";
    pub const MEMORY: &str = "memory";
}
