//! # Circuit Module Interface
//!
//! The driver talks to a compiled circuit only through [`CircuitModule`]:
//! look up an export, call it with i32 arguments, and read or write the
//! module's linear memory. The interpreter behind it is interchangeable.

use std::fmt;

/// Error raised by the module through its `error` callback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    /// Module-defined error code
    pub code: i32,
    /// NUL-terminated message read from `pStr`
    pub message: String,
    /// Raw `a, b, c, d` arguments
    pub params: [i32; 4],
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.params;
        write!(f, "code {}: {} ({a}, {b}, {c}, {d})", self.code, self.message)
    }
}

/// Why a call into the module did not complete
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallFault {
    /// The interpreter trapped or rejected the call
    Trap(String),
    /// The module reported an error through its `error` callback
    Abort(ErrorReport),
}

impl fmt::Display for CallFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallFault::Trap(reason) => write!(f, "trap: {reason}"),
            CallFault::Abort(report) => write!(f, "module error {report}"),
        }
    }
}

/// A loaded circuit module
///
/// Not synchronized: one computation per instance at a time. Share an
/// instance across threads only behind a lock.
pub trait CircuitModule {
    /// Handle to a resolved export
    type Func: Copy;

    /// Look up an exported function by name
    fn export(&self, name: &str) -> Option<Self::Func>;

    /// Call an export; returns its i32 result, if it has one
    fn invoke(&mut self, func: Self::Func, args: &[i32]) -> Result<Option<i32>, CallFault>;

    /// The module's linear memory
    fn memory(&self) -> &[u8];

    /// The module's linear memory, mutably
    fn memory_mut(&mut self) -> &mut [u8];
}
