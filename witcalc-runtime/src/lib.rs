//! # Witcalc Runtime
//!
//! Compute the witness of a circom circuit compiled to WebAssembly.
//!
//! The runtime drives a loaded circuit module through its fixed ABI:
//! it derives the field parameters, writes each named input into module
//! memory through the frame codec, and reads the full witness back.
//!
//! ## Features
//!
//! - **Interpreter-agnostic**: anything implementing [`CircuitModule`] can be driven
//! - **wasmi backend**: [`WasmModule`] loads `.wasm` bytes and provides the host callbacks
//! - **Scratch memory**: bump allocation restored after every computation, success or not
//! - **Two read-back paths**: per-variable `getPWitness` or the bulk witness buffer
//!
//! ## Example
//!
//! ```rust,no_run
//! use witcalc_runtime::{CalculatorConfig, WasmConfig, WasmModule, WitnessCalculator};
//! use witcalc_spec::parse_inputs;
//!
//! let wasm = std::fs::read("circuit.wasm").unwrap();
//! let module = WasmModule::load(&wasm, &WasmConfig::default()).unwrap();
//! let mut calc = WitnessCalculator::new(module, CalculatorConfig::default()).unwrap();
//! let inputs = parse_inputs(r#"{"a": "5"}"#).unwrap();
//! let witness = calc.compute_witness(&inputs, false).unwrap();
//! println!("{}", serde_json::to_string(&witness).unwrap());
//! ```

pub mod calculator;
pub mod error;
pub mod instance;
pub mod memory;
pub mod module;
pub mod resolver;
pub mod wasm;

#[cfg(any(test, feature = "test-support"))]
#[doc(hidden)]
pub mod test_support;

pub use calculator::{CalculatorConfig, WitnessCalculator, WitnessRead};
pub use error::RuntimeError;
pub use instance::{CircuitInstance, Exports};
pub use memory::Checkpoint;
pub use module::{CallFault, CircuitModule, ErrorReport};
pub use wasm::{WasmConfig, WasmModule};

/// Load a module from bytes and compute one witness
pub fn calculate_witness(
    wasm: &[u8],
    inputs: &witcalc_spec::Inputs,
    sanity_check: bool,
) -> Result<witcalc_spec::Witness, RuntimeError> {
    let module = WasmModule::load(wasm, &WasmConfig::default())?;
    let mut calc = WitnessCalculator::new(module, CalculatorConfig::default())?;
    calc.compute_witness(inputs, sanity_check)
}
