//! # Witness Calculator
//!
//! Drives a circuit module through one witness computation:
//!
//! 1. save the scratch free pointer
//! 2. `init(sanityCheck)`
//! 3. allocate a scratch integer cell and a scratch field-element frame
//! 4. for every named input: resolve its signal offset, flatten its value
//!    tree, and `setSignal` each element at consecutive offsets
//! 5. read every witness slot back through the frame codec
//! 6. restore the free pointer
//!
//! Step 6 runs on failure too. A failed computation poisons the calculator,
//! since the module's evaluation state cannot be trusted afterwards.

use crate::error::{Result, RuntimeError};
use crate::instance::CircuitInstance;
use crate::module::CircuitModule;
use num_bigint::BigUint;
use tracing::{debug, trace, warn};
use witcalc_spec::abi::exports;
use witcalc_spec::{codec, FieldParams, Inputs, Witness, MAIN_COMPONENT};

/// How the witness vector is read back from the module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WitnessRead {
    /// One `getPWitness(i)` call per variable
    #[default]
    PerVariable,
    /// One `getWitnessBuffer()` call, then consecutive frames of `getFrLen()` bytes
    Buffer,
}

/// Calculator configuration
#[derive(Debug, Clone, Default)]
pub struct CalculatorConfig {
    /// Witness read-back path
    pub witness_read: WitnessRead,
}

/// Witness calculator bound to one module instance
pub struct WitnessCalculator<M: CircuitModule> {
    instance: CircuitInstance<M>,
    params: FieldParams,
    n_vars: u32,
    config: CalculatorConfig,
    poisoned: bool,
}

impl<M: CircuitModule> WitnessCalculator<M> {
    /// Resolve the module's exports and derive the field parameters
    pub fn new(module: M, config: CalculatorConfig) -> Result<Self> {
        let mut instance = CircuitInstance::new(module)?;

        let fr_len = instance.fr_len()?;
        let n32 = FieldParams::n32_from_frame_len(fr_len)?;

        // bare magnitude, no frame header
        let p_raw_prime = instance.raw_prime_ptr()?;
        let prime = codec::load_raw(instance.read_bytes(p_raw_prime, n32)?);
        let params = FieldParams::new(prime, n32)?;

        let n_vars = instance.n_vars()?;

        debug!(
            n32,
            n64 = params.n64(),
            n_vars,
            prime = %params.prime(),
            "witness calculator ready"
        );

        Ok(Self {
            instance,
            params,
            n_vars,
            config,
            poisoned: false,
        })
    }

    pub fn params(&self) -> &FieldParams {
        &self.params
    }

    pub fn n_vars(&self) -> u32 {
        self.n_vars
    }

    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    /// Whether an earlier computation failed
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    pub fn instance(&self) -> &CircuitInstance<M> {
        &self.instance
    }

    pub fn into_module(self) -> M {
        self.instance.into_module()
    }

    /// Compute the full witness for `inputs`
    pub fn compute_witness(&mut self, inputs: &Inputs, sanity_check: bool) -> Result<Witness> {
        if self.poisoned {
            return Err(RuntimeError::Poisoned);
        }

        let checkpoint = self.instance.checkpoint()?;
        let result = self.run(inputs, sanity_check);
        let restored = self.instance.restore(checkpoint);

        match (result, restored) {
            (Ok(witness), Ok(())) => Ok(witness),
            (Ok(_), Err(err)) => {
                self.poisoned = true;
                Err(err)
            }
            (Err(err), restored) => {
                self.poisoned = true;
                if let Err(restore_err) = restored {
                    warn!(%restore_err, "could not restore scratch memory");
                }
                Err(err)
            }
        }
    }

    fn run(&mut self, inputs: &Inputs, sanity_check: bool) -> Result<Witness> {
        self.instance.init(sanity_check)?;

        let p_sig_offset = self.instance.alloc_int()?;
        let p_fr = self.instance.alloc_field_element(&self.params)?;
        debug!(p_sig_offset, p_fr, "scratch cells");

        for (name, value) in inputs {
            let offset = self.instance.resolve_signal(p_sig_offset, name)?;
            let elements = value.flatten();
            // the whole signal range must be addressable before any write
            u32::try_from(elements.len())
                .ok()
                .and_then(|len| offset.checked_add(len))
                .ok_or_else(|| RuntimeError::Call {
                    function: exports::GET_SIGNAL_OFFSET32,
                    reason: format!(
                        "offset {offset} of '{name}' cannot hold {} elements",
                        elements.len()
                    ),
                })?;

            for (i, element) in elements.iter().enumerate() {
                let residue = self.params.reduce(element);
                self.write_fr(p_fr, &residue)?;

                let signal = offset + i as u32;
                trace!(name = name.as_str(), signal, value = %residue, "setSignal");
                self.instance
                    .set_signal(MAIN_COMPONENT, MAIN_COMPONENT, signal, p_fr)?;
            }
        }

        self.read_witness()
    }

    fn read_witness(&mut self) -> Result<Witness> {
        // a module can't hold more frames than fit in its memory
        let max_frames = self.instance.module().memory().len() / self.params.element_len();
        let mut values = Vec::with_capacity((self.n_vars as usize).min(max_frames));
        match self.config.witness_read {
            WitnessRead::PerVariable => {
                for i in 0..self.n_vars {
                    let p = self.instance.witness_ptr(i)?;
                    values.push(self.read_fr(p)?);
                }
            }
            WitnessRead::Buffer => {
                let base = self.instance.witness_buffer()?;
                let stride = self.params.element_len() as u32;
                for i in 0..self.n_vars {
                    let p = i
                        .checked_mul(stride)
                        .and_then(|delta| base.checked_add(delta))
                        .ok_or(RuntimeError::OutOfBounds {
                            offset: base as u64 + i as u64 * stride as u64,
                            len: self.params.element_len(),
                        })?;
                    values.push(self.read_fr(p)?);
                }
            }
        }
        Ok(Witness::new(values))
    }

    fn write_fr(&mut self, p: u32, value: &BigUint) -> Result<()> {
        let frame = self.instance.bytes_mut(p, self.params.frame_len())?;
        codec::encode(&self.params, frame, value)?;
        Ok(())
    }

    fn read_fr(&self, p: u32) -> Result<BigUint> {
        let frame = self.instance.read_bytes(p, self.params.element_len())?;
        Ok(codec::decode(&self.params, frame)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Export, SquareCircuit};
    use witcalc_spec::{InputValue, WitcalcError};

    fn inputs(entries: &[(&str, InputValue)]) -> Inputs {
        entries
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    fn calculator(circuit: SquareCircuit) -> WitnessCalculator<SquareCircuit> {
        WitnessCalculator::new(circuit, CalculatorConfig::default()).unwrap()
    }

    #[test]
    fn test_construct_derives_params() {
        let calc = calculator(SquareCircuit::new());
        assert_eq!(calc.params(), &SquareCircuit::params());
        assert_eq!(calc.n_vars(), 3);
        assert!(!calc.is_poisoned());
    }

    #[test]
    fn test_square() {
        let mut calc = calculator(SquareCircuit::new());
        let witness = calc
            .compute_witness(&inputs(&[("a", InputValue::from(5i64))]), false)
            .unwrap();
        assert_eq!(witness.to_decimal_strings(), vec!["1", "5", "25"]);
    }

    #[test]
    fn test_negative_input_reduced() {
        let mut calc = calculator(SquareCircuit::new());
        let witness = calc
            .compute_witness(&inputs(&[("a", InputValue::from(-3i64))]), false)
            .unwrap();
        let p = calc.params().prime().clone();
        assert_eq!(witness[1], &p - BigUint::from(3u32));
        assert_eq!(witness[2], BigUint::from(9u32));
    }

    #[test]
    fn test_array_input_consecutive_offsets() {
        let circuit = SquareCircuit::with_inputs(&[("a", 1), ("xs", 3)]);
        let mut calc = calculator(circuit);
        let witness = calc
            .compute_witness(
                &inputs(&[
                    ("a", InputValue::from(1i64)),
                    ("xs", InputValue::from(vec![vec![2i64], vec![3, 4]])),
                ]),
                true,
            )
            .unwrap();
        assert_eq!(
            witness.to_decimal_strings(),
            vec!["1", "1", "2", "3", "4", "30"]
        );
    }

    #[test]
    fn test_buffer_read_matches_per_variable() {
        let entries = inputs(&[("a", InputValue::from(1u64 << 40))]);

        let mut per_var = calculator(SquareCircuit::new());
        let config = CalculatorConfig {
            witness_read: WitnessRead::Buffer,
        };
        let mut buffered = WitnessCalculator::new(SquareCircuit::new(), config).unwrap();

        assert_eq!(
            per_var.compute_witness(&entries, false).unwrap(),
            buffered.compute_witness(&entries, false).unwrap()
        );
    }

    #[test]
    fn test_free_pointer_restored() {
        let mut calc = calculator(SquareCircuit::new());
        let before = calc.instance().free_pos().unwrap();
        calc.compute_witness(&inputs(&[("a", InputValue::from(2i64))]), false)
            .unwrap();
        assert_eq!(calc.instance().free_pos().unwrap(), before);
    }

    #[test]
    fn test_repeated_computations() {
        let mut calc = calculator(SquareCircuit::new());
        for a in [3i64, 4, 5] {
            let witness = calc
                .compute_witness(&inputs(&[("a", InputValue::from(a))]), true)
                .unwrap();
            assert_eq!(witness[2], BigUint::from((a * a) as u64));
        }
    }

    #[test]
    fn test_unknown_input_fails_and_poisons() {
        let mut calc = calculator(SquareCircuit::new());
        let before = calc.instance().free_pos().unwrap();

        let err = calc
            .compute_witness(&inputs(&[("b", InputValue::from(1i64))]), false)
            .unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Module {
                function: "getSignalOffset32",
                ..
            }
        ));
        assert!(calc.is_poisoned());
        assert_eq!(calc.instance().free_pos().unwrap(), before);

        let err = calc
            .compute_witness(&inputs(&[("a", InputValue::from(1i64))]), false)
            .unwrap_err();
        assert!(matches!(err, RuntimeError::Poisoned));
    }

    #[test]
    fn test_sanity_check_violation() {
        let mut circuit = SquareCircuit::new();
        circuit.reject_inputs_from(100);
        let mut calc = calculator(circuit);

        let err = calc
            .compute_witness(&inputs(&[("a", InputValue::from(100i64))]), true)
            .unwrap_err();
        assert!(err.is_sanity_check());
    }

    #[test]
    fn test_sanity_check_disabled_skips_asserts() {
        let mut circuit = SquareCircuit::new();
        circuit.reject_inputs_from(100);
        let mut calc = calculator(circuit);

        let witness = calc
            .compute_witness(&inputs(&[("a", InputValue::from(100i64))]), false)
            .unwrap();
        assert_eq!(witness[2], BigUint::from(10_000u32));
    }

    #[test]
    fn test_init_trap_is_call_error() {
        let mut circuit = SquareCircuit::new();
        circuit.trap_on(Export::Init);
        let mut calc = calculator(circuit);

        let err = calc.compute_witness(&Inputs::new(), false).unwrap_err();
        assert!(matches!(err, RuntimeError::Call { function: "init", .. }));
    }

    #[test]
    fn test_construct_fails_on_query_trap() {
        let mut circuit = SquareCircuit::new();
        circuit.trap_on(Export::GetNVars);
        let err = WitnessCalculator::new(circuit, CalculatorConfig::default())
            .err()
            .unwrap();
        assert!(matches!(
            err,
            RuntimeError::Call {
                function: "getNVars",
                ..
            }
        ));
    }

    #[test]
    fn test_too_many_elements_rejected_by_module() {
        let mut calc = calculator(SquareCircuit::new());
        let err = calc
            .compute_witness(&inputs(&[("a", InputValue::from(vec![1i64, 2]))]), false)
            .unwrap_err();
        assert!(!err.is_sanity_check());
        assert!(matches!(
            err,
            RuntimeError::Module {
                function: "setSignal",
                ..
            }
        ));
    }

    #[test]
    fn test_module_error_under_sanity_check() {
        let mut calc = calculator(SquareCircuit::new());
        let err = calc
            .compute_witness(&inputs(&[("a", InputValue::from(vec![1i64, 2]))]), true)
            .unwrap_err();
        assert!(err.is_sanity_check());
        assert_eq!(err.report().map(|r| r.code), Some(crate::test_support::ERR_SIGNAL_NOT_FOUND));
    }

    #[test]
    fn test_signal_offset_overflow_rejected() {
        let mut circuit = SquareCircuit::new();
        circuit.override_result(Export::GetSignalOffset32, -1);
        let mut calc = calculator(circuit);
        let before = calc.instance().free_pos().unwrap();

        let err = calc
            .compute_witness(&inputs(&[("a", InputValue::from(vec![1i64, 2]))]), false)
            .unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Call {
                function: "getSignalOffset32",
                ..
            }
        ));
        assert_eq!(calc.instance().module().set_calls(), 0);
        assert_eq!(calc.instance().free_pos().unwrap(), before);
    }

    #[test]
    fn test_witness_buffer_overflow_rejected() {
        let mut circuit = SquareCircuit::new();
        circuit.override_result(Export::GetWitnessBuffer, -8);
        let config = CalculatorConfig {
            witness_read: WitnessRead::Buffer,
        };
        let mut calc = WitnessCalculator::new(circuit, config).unwrap();

        let err = calc
            .compute_witness(&inputs(&[("a", InputValue::from(3i64))]), false)
            .unwrap_err();
        assert!(matches!(err, RuntimeError::OutOfBounds { .. }));
    }

    #[test]
    fn test_huge_variable_count_fails_cleanly() {
        let mut circuit = SquareCircuit::new();
        circuit.override_result(Export::GetNVars, i32::MAX);
        let mut calc = calculator(circuit);
        assert_eq!(calc.n_vars(), i32::MAX as u32);

        let err = calc
            .compute_witness(&inputs(&[("a", InputValue::from(3i64))]), false)
            .unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Call {
                function: "getPWitness",
                ..
            }
        ));
    }

    #[test]
    fn test_spec_errors_propagate() {
        let err: RuntimeError = WitcalcError::InvalidFrameLen(4).into();
        assert!(matches!(err, RuntimeError::SpecError(_)));
    }
}
