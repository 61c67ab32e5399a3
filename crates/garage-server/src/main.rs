//! Garage: service manual retrieval server.

use std::path::PathBuf;
use std::sync::Arc;

use garage_chat::LLMConfig;
use garage_core::{GarageConfig, IndexPaths};
use garage_server::{build_router, AppState};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config = GarageConfig::from_env();

    if args.len() > 1 {
        match args[1].as_str() {
            "--check" | "check" => {
                let paths = match args.get(2) {
                    Some(dir) => IndexPaths::new(PathBuf::from(dir)),
                    None => config.index_paths.clone(),
                };
                std::process::exit(check(&paths));
            }
            "--help" | "-h" | "help" => {
                println!("Garage: service manual retrieval server");
                println!();
                println!("Usage: garage [command]");
                println!();
                println!("Commands:");
                println!("  (none)                Start the server");
                println!("  check [index-dir]     Load the indexes once and print their counts");
                println!("  help                  Show this help message");
                println!();
                println!("Environment: PORT, GARAGE_INDEX_DIR, GARAGE_LLM_TIMEOUT_SECS,");
                println!("  GARAGE_LLM_PROVIDER, OPENAI_API_KEY, ANTHROPIC_API_KEY, GROQ_API_KEY");
                println!("  GARAGE_OPENAI_URL, GARAGE_ANTHROPIC_URL, GARAGE_GROQ_URL");
                return Ok(());
            }
            _ => {
                eprintln!("Unknown command: {}. Use 'garage help' for usage.", args[1]);
                std::process::exit(1);
            }
        }
    }

    info!("Index directory: {}", config.index_paths.root.display());
    let port = config.port;
    let state = Arc::new(AppState::new(config, LLMConfig::from_env()));

    if let Err(e) = state.reload().await {
        warn!("Indexes not loaded ({}); retrieval requests will return 503", e);
    }

    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Garage server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Load once and print counts; the process exit code.
fn check(paths: &IndexPaths) -> i32 {
    match garage_index::load(paths) {
        Ok(state) => match serde_json::to_string_pretty(&state.counts()) {
            Ok(counts) => {
                println!("{}", counts);
                0
            }
            Err(e) => {
                eprintln!("Failed to render counts: {}", e);
                1
            }
        },
        Err(e) => {
            eprintln!("{}", e);
            1
        }
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!("Could not listen for Ctrl-C ({}); running until killed", e);
            std::future::pending::<()>().await;
        }
    }
}
