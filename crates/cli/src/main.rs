//! `wasm-dag` CLI entry-point.
//!
//! Available sub-commands:
//! - `run`:      execute a graph and print the resulting state.
//! - `validate`: load and resolve a graph, printing its execution order.

mod logging;
mod report;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use engine::{loader, validate_dag, GraphRunner};
use nodes::{WasmExecutor, WasmExecutorConfig};

use crate::report::Format;

#[derive(Parser)]
#[command(
    name = "wasm-dag",
    about = "Run a DAG of sandboxed WebAssembly compute units",
    version
)]
struct Cli {
    /// Exported function invoked in every module.
    #[arg(long, global = true, env = "WASM_DAG_ENTRY", default_value = nodes::wasm::DEFAULT_ENTRY_POINT)]
    entry: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Execute a graph and print every node's input and output.
    Run {
        /// Path to the graph JSON file.
        path: PathBuf,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Validate a graph definition JSON file.
    Validate {
        /// Path to the graph JSON file.
        path: PathBuf,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run { path, format } => {
            info!("Running graph {}", path.display());
            let executor = WasmExecutor::new(WasmExecutorConfig::default().with_entry_point(cli.entry));
            let runner = GraphRunner::with_executor(Arc::new(executor));

            let state = runner
                .run(&path)
                .await
                .with_context(|| format!("graph run failed: {}", path.display()))?;

            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            format.reporter().render(&state, &mut out)?;
            out.flush()?;
        }
        Command::Validate { path } => {
            let graph = loader::load(&path)
                .await
                .with_context(|| format!("cannot load graph {}", path.display()))?;

            let order = validate_dag(&graph).context("validation failed")?;
            println!("✅ Graph is valid. Execution order: {}", order.join(" -> "));
        }
    }

    Ok(())
}
