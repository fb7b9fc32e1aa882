//! Runtime error types for the witness calculator

use crate::module::{CallFault, ErrorReport};
use thiserror::Error;
use witcalc_spec::WitcalcError;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Spec error: {0}")]
    SpecError(#[from] WitcalcError),

    #[error("Module does not export '{name}'")]
    MissingExport { name: &'static str },

    #[error("Failed to load module: {0}")]
    Load(String),

    #[error("Call to '{function}' failed: {reason}")]
    Call {
        function: &'static str,
        reason: String,
    },

    #[error("Sanity check failed in '{function}': {report}")]
    SanityCheck {
        function: &'static str,
        report: ErrorReport,
    },

    #[error("Module error in '{function}': {report}")]
    Module {
        function: &'static str,
        report: ErrorReport,
    },

    #[error("'{function}' returned no value")]
    MissingResult { function: &'static str },

    #[error("Memory out of bounds: offset {offset:#x}, length {len}")]
    OutOfBounds { offset: u64, len: usize },

    #[error("Calculator is poisoned by an earlier failure; reload the module")]
    Poisoned,
}

impl RuntimeError {
    /// Map a failed module call to the matching error kind
    ///
    /// A module-reported error counts as a sanity check failure only when
    /// the evaluation was initialized with sanity checking on.
    pub fn from_fault(function: &'static str, fault: CallFault, sanity_check: bool) -> Self {
        match fault {
            CallFault::Trap(reason) => RuntimeError::Call { function, reason },
            CallFault::Abort(report) if sanity_check => {
                RuntimeError::SanityCheck { function, report }
            }
            CallFault::Abort(report) => RuntimeError::Module { function, report },
        }
    }

    /// Whether the module rejected the circuit state or inputs under sanity checking
    pub fn is_sanity_check(&self) -> bool {
        matches!(self, RuntimeError::SanityCheck { .. })
    }

    /// The module's own error report, if it raised one
    pub fn report(&self) -> Option<&ErrorReport> {
        match self {
            RuntimeError::SanityCheck { report, .. } | RuntimeError::Module { report, .. } => {
                Some(report)
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
