//! Diagnostic tracing for the CLI.
//!
//! Logs go to stderr so stdout carries only the report.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset: run and node progress from our own
/// crates, warnings from everything else (wasmtime, cranelift).
const DEFAULT_DIRECTIVES: &str = "warn,wasm_dag=info,engine=info,nodes=info";

fn filter_from_env() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Initialize the tracing subscriber.
///
/// # Example
/// ```bash
/// RUST_LOG=engine=debug,nodes=debug wasm-dag run graph.json
/// ```
pub fn init() {
    tracing_subscriber::registry()
        .with(filter_from_env())
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}
