use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "witcalc")]
#[command(about = "Compute the witness of a circom WASM circuit", long_about = None)]
pub struct Cli {
    /// Compiled circuit (.wasm)
    pub wasm: PathBuf,
    /// Input document (.json object of signal names to values)
    pub input: PathBuf,
    /// Write the witness JSON here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Run the circuit's runtime assertions
    #[arg(long)]
    pub sanity_check: bool,
    /// Read the witness through the bulk buffer instead of per variable
    #[arg(long)]
    pub buffer_read: bool,
    /// Pages of host memory for circuits that import it
    #[arg(long, default_value_t = witcalc_runtime::wasm::DEFAULT_MEMORY_PAGES)]
    pub memory_pages: u32,
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Log filter used when `RUST_LOG` is unset
    pub fn default_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }
}
