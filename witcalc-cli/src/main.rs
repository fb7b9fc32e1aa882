use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use tracing::info;
use tracing_subscriber::EnvFilter;
use witcalc_runtime::{CalculatorConfig, WasmConfig, WasmModule, WitnessCalculator, WitnessRead};
use witcalc_spec::parse_inputs;

mod args;

use args::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.default_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let wasm = fs::read(&cli.wasm)
        .with_context(|| format!("failed to read circuit {}", cli.wasm.display()))?;
    let document = fs::read_to_string(&cli.input)
        .with_context(|| format!("failed to read inputs {}", cli.input.display()))?;
    let inputs = parse_inputs(&document)
        .with_context(|| format!("invalid inputs in {}", cli.input.display()))?;

    let wasm_config = WasmConfig {
        memory_pages: cli.memory_pages,
    };
    let module = WasmModule::load(&wasm, &wasm_config)
        .with_context(|| format!("failed to load circuit {}", cli.wasm.display()))?;

    let config = CalculatorConfig {
        witness_read: if cli.buffer_read {
            WitnessRead::Buffer
        } else {
            WitnessRead::PerVariable
        },
    };
    let mut calc = WitnessCalculator::new(module, config)?;
    info!(
        n_vars = calc.n_vars(),
        n32 = calc.params().n32(),
        inputs = inputs.len(),
        "circuit loaded"
    );

    let witness = calc
        .compute_witness(&inputs, cli.sanity_check)
        .context("witness computation failed")?;
    let json = serde_json::to_string_pretty(&witness)?;

    match &cli.output {
        Some(path) => {
            fs::write(path, json + "\n")
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), len = witness.len(), "witness written");
        }
        None => println!("{json}"),
    }

    Ok(())
}
