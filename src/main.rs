use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use statics::compiler::{compile, compile_table, CompileOptions};
use statics::config::{Cli, Commands, CompileArgs, ServerConfig};
use statics::server::{serve, shutdown_signal, ServerState};
use statics::AssetRegistry;

fn init_logging(verbose: bool) {
    let fallback = if verbose { "statics=debug" } else { "statics=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_compile(args: &CompileArgs) -> Result<()> {
    compile(
        &args.input_dir,
        &args.output_artifact,
        &args.options(),
        args.gate.as_deref(),
    )
    .with_context(|| format!("compiling {}", args.input_dir.display()))?;
    Ok(())
}

#[tokio::main]
async fn run_server(config: ServerConfig) -> Result<()> {
    let mut registry = AssetRegistry::new();
    if let Some(dir) = &config.asset_dir {
        let options = CompileOptions::with_prefix(&config.url_prefix);
        let table = compile_table(dir, &options)
            .with_context(|| format!("loading assets from {}", dir.display()))?;
        registry.set_active_table(table);
    }
    // Table is final from here on.
    let registry = registry.freeze();

    let listener = TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("binding {}", config.addr))?;
    info!(
        "Serving {} assets on http://{}",
        registry.active_table().len(),
        listener.local_addr()?
    );

    let state = Arc::new(ServerState::new(config, registry));
    serve(listener, state, shutdown_signal()).await;
    info!("Server shutdown complete");
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match &cli.command {
        Commands::Compile(args) => run_compile(args),
        Commands::Serve(args) => run_server(ServerConfig::from(args)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
