//! # wasmi Backend
//!
//! Loads a circom-compiled `.wasm` module into the `wasmi` interpreter.
//!
//! The host provides the `runtime.*` diagnostic imports and an `env.memory`
//! for modules that import their linear memory. Diagnostics are forwarded
//! to `tracing`; the `error` callback records an [`ErrorReport`] and traps,
//! so the failing call surfaces as [`CallFault::Abort`].

use crate::error::{Result, RuntimeError};
use crate::module::{CallFault, CircuitModule, ErrorReport};
use std::fmt;
use tracing::trace;
use wasmi::{Caller, Engine, Func, Instance, Linker, Memory, MemoryType, Module, Store, Val};
use witcalc_spec::abi::imports;

/// Pages given to a module that imports its memory; 64 KiB each
pub const DEFAULT_MEMORY_PAGES: u32 = 2000;

/// Longest message read back from an `error` callback
const MAX_MESSAGE_LEN: usize = 1024;

/// Backend configuration
#[derive(Debug, Clone)]
pub struct WasmConfig {
    /// Initial size of the host-provided `env.memory`, in 64 KiB pages
    pub memory_pages: u32,
}

impl Default for WasmConfig {
    fn default() -> Self {
        Self {
            memory_pages: DEFAULT_MEMORY_PAGES,
        }
    }
}

#[derive(Default)]
struct HostState {
    memory: Option<Memory>,
    report: Option<ErrorReport>,
}

/// A circuit module running in `wasmi`
pub struct WasmModule {
    store: Store<HostState>,
    instance: Instance,
    memory: Memory,
}

fn load_err<E: fmt::Display>(err: E) -> RuntimeError {
    RuntimeError::Load(err.to_string())
}

impl WasmModule {
    /// Compile, link, and start a module
    pub fn load(wasm: &[u8], config: &WasmConfig) -> Result<Self> {
        let engine = Engine::default();
        let module = Module::new(&engine, wasm).map_err(load_err)?;
        let mut store = Store::new(&engine, HostState::default());
        let mut linker = <Linker<HostState>>::new(&engine);

        let memory_type = MemoryType::new(config.memory_pages, None).map_err(load_err)?;
        let env_memory = Memory::new(&mut store, memory_type).map_err(load_err)?;
        linker
            .define(imports::MEMORY_MODULE, imports::MEMORY, env_memory)
            .map_err(load_err)?;
        link_runtime(&mut linker)?;

        let instance = linker
            .instantiate(&mut store, &module)
            .map_err(load_err)?
            .start(&mut store)
            .map_err(load_err)?;

        let memory = instance
            .get_memory(&store, imports::MEMORY)
            .unwrap_or(env_memory);
        store.data_mut().memory = Some(memory);

        Ok(Self {
            store,
            instance,
            memory,
        })
    }
}

fn link_runtime(linker: &mut Linker<HostState>) -> Result<()> {
    linker
        .func_wrap(
            imports::MODULE,
            imports::ERROR,
            |mut caller: Caller<'_, HostState>,
             code: i32,
             p_str: i32,
             a: i32,
             b: i32,
             c: i32,
             d: i32|
             -> std::result::Result<(), wasmi::Error> {
                let message = caller
                    .data()
                    .memory
                    .map(|memory| read_c_string(memory.data(&caller), p_str as u32))
                    .unwrap_or_default();
                let report = ErrorReport {
                    code,
                    message,
                    params: [a, b, c, d],
                };
                let trap = wasmi::Error::new(report.to_string());
                caller.data_mut().report = Some(report);
                Err(trap)
            },
        )
        .map_err(load_err)?;

    linker
        .func_wrap(
            imports::MODULE,
            imports::LOG_SET_SIGNAL,
            |_caller: Caller<'_, HostState>, signal: i32, p_val: i32| {
                trace!(signal, p_val, "logSetSignal");
            },
        )
        .map_err(load_err)?;

    linker
        .func_wrap(
            imports::MODULE,
            imports::LOG_GET_SIGNAL,
            |_caller: Caller<'_, HostState>, signal: i32, p_val: i32| {
                trace!(signal, p_val, "logGetSignal");
            },
        )
        .map_err(load_err)?;

    linker
        .func_wrap(
            imports::MODULE,
            imports::LOG_START_COMPONENT,
            |_caller: Caller<'_, HostState>, c_idx: i32| {
                trace!(c_idx, "logStartComponent");
            },
        )
        .map_err(load_err)?;

    linker
        .func_wrap(
            imports::MODULE,
            imports::LOG_FINISH_COMPONENT,
            |_caller: Caller<'_, HostState>, c_idx: i32| {
                trace!(c_idx, "logFinishComponent");
            },
        )
        .map_err(load_err)?;

    linker
        .func_wrap(
            imports::MODULE,
            imports::LOG,
            |_caller: Caller<'_, HostState>, code: i32| {
                trace!(code, "log");
            },
        )
        .map_err(load_err)?;

    Ok(())
}

/// Read a NUL-terminated string, lossily decoded and capped in length
fn read_c_string(memory: &[u8], at: u32) -> String {
    let start = (at as usize).min(memory.len());
    let tail = &memory[start..];
    let end = tail
        .iter()
        .take(MAX_MESSAGE_LEN)
        .position(|b| *b == 0)
        .unwrap_or_else(|| tail.len().min(MAX_MESSAGE_LEN));
    String::from_utf8_lossy(&tail[..end]).into_owned()
}

impl CircuitModule for WasmModule {
    type Func = Func;

    fn export(&self, name: &str) -> Option<Func> {
        self.instance.get_func(&self.store, name)
    }

    fn invoke(&mut self, func: Func, args: &[i32]) -> std::result::Result<Option<i32>, CallFault> {
        self.store.data_mut().report = None;

        let params: Vec<Val> = args.iter().map(|arg| Val::I32(*arg)).collect();
        let n_results = func.ty(&self.store).results().len();
        let mut results = vec![Val::I32(0); n_results];

        match func.call(&mut self.store, &params, &mut results) {
            Ok(()) => Ok(results.first().and_then(|val| val.i32())),
            Err(err) => Err(match self.store.data_mut().report.take() {
                Some(report) => CallFault::Abort(report),
                None => CallFault::Trap(err.to_string()),
            }),
        }
    }

    fn memory(&self) -> &[u8] {
        self.memory.data(&self.store)
    }

    fn memory_mut(&mut self) -> &mut [u8] {
        self.memory.data_mut(&mut self.store)
    }
}
