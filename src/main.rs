use std::sync::Arc;

use todo_assist::annotator::Annotator;
use todo_assist::api::{AppState, api_routes};
use todo_assist::config::{AppConfig, load_system_prompt};
use todo_assist::llm::{LlmBackend, LlmConfig, create_provider};
use todo_assist::store::{LibSqlBackend, TodoStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    eprintln!("📝 Todo Assist v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Deployment: {}", config.deployment_id);
    eprintln!("   API: http://0.0.0.0:{}/api/todos", config.port);

    // ── Database ─────────────────────────────────────────────────────────
    let store: Arc<dyn TodoStore> = Arc::new(
        LibSqlBackend::new_local(&config.db_path, &config.deployment_id)
            .await
            .unwrap_or_else(|e| {
                eprintln!(
                    "Error: Failed to open database at {}: {}",
                    config.db_path.display(),
                    e
                );
                std::process::exit(1);
            }),
    );
    eprintln!("   Database: {}", config.db_path.display());

    // ── Annotator ────────────────────────────────────────────────────────
    let annotator = match llm_config_from_env() {
        Some(llm_config) => {
            let llm = create_provider(&llm_config)?;
            let prompt = load_system_prompt(&config.prompt_path);
            eprintln!("   Annotator: enabled (model: {})", llm_config.model);
            Some(Arc::new(Annotator::new(llm, prompt)))
        }
        None => {
            eprintln!("   Annotator: disabled (no OPENAI_API_KEY or ANTHROPIC_API_KEY)");
            None
        }
    };

    // ── Server ──────────────────────────────────────────────────────────
    let state = AppState {
        store,
        annotator,
        runtime: config.runtime.clone(),
        deployment_id: config.deployment_id.clone(),
    };
    let app = api_routes(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!(port = config.port, "Server started");
    axum::serve(listener, app).await?;

    Ok(())
}

/// Read annotator credentials from the environment, OpenAI first (the
/// original deployment used it), then Anthropic. None disables `/api/chat`.
fn llm_config_from_env() -> Option<LlmConfig> {
    let model_override = std::env::var("TODO_MODEL").ok();

    if let Ok(api_key) = std::env::var("OPENAI_API_KEY") {
        return Some(LlmConfig {
            backend: LlmBackend::OpenAi,
            api_key: secrecy::SecretString::from(api_key),
            model: model_override.unwrap_or_else(|| "gpt-4".to_string()),
        });
    }
    if let Ok(api_key) = std::env::var("ANTHROPIC_API_KEY") {
        return Some(LlmConfig {
            backend: LlmBackend::Anthropic,
            api_key: secrecy::SecretString::from(api_key),
            model: model_override.unwrap_or_else(|| "claude-sonnet-4-20250514".to_string()),
        });
    }
    None
}
