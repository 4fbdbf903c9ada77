use std::sync::Arc;

use career_coach::config::CoachConfig;
use career_coach::error::ConfigError;
use career_coach::extract::PlainTextExtractor;
use career_coach::llm::{LlmBackend, LlmConfig, create_provider};
use career_coach::protocol::{Coach, CoachRouteState, session_routes};
use tower_http::cors::CorsLayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let backend = match std::env::var("CAREER_COACH_BACKEND").as_deref() {
        Ok("openai") => LlmBackend::OpenAi,
        _ => LlmBackend::Anthropic,
    };

    // Missing credentials are a fatal precondition for invoking the coach
    // at all; report once and exit.
    let key_var = match backend {
        LlmBackend::Anthropic => "ANTHROPIC_API_KEY",
        LlmBackend::OpenAi => "OPENAI_API_KEY",
    };
    let api_key = match std::env::var(key_var) {
        Ok(key) => key,
        Err(_) => {
            eprintln!("  export {key_var}=...");
            return Err(ConfigError::MissingEnvVar(key_var.to_string()).into());
        }
    };

    let model = std::env::var("CAREER_COACH_MODEL").unwrap_or_else(|_| match backend {
        LlmBackend::Anthropic => "claude-sonnet-4-20250514".to_string(),
        LlmBackend::OpenAi => "gpt-4o".to_string(),
    });

    let port: u16 = std::env::var("CAREER_COACH_PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .unwrap_or(8080);

    let mut config = CoachConfig::default();
    if let Ok(raw) = std::env::var("CAREER_COACH_MENU_PAIRS") {
        config.menu_unlock_pairs = raw.parse().map_err(|e| ConfigError::InvalidValue {
            key: "CAREER_COACH_MENU_PAIRS".to_string(),
            message: format!("{e}"),
        })?;
    }
    if let Ok(raw) = std::env::var("CAREER_COACH_MIN_SALARY") {
        config.min_monthly_salary = raw.parse().map_err(|e| ConfigError::InvalidValue {
            key: "CAREER_COACH_MIN_SALARY".to_string(),
            message: format!("{e}"),
        })?;
    }

    eprintln!("🎯 Career Coach v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", model);
    eprintln!("   Session API: http://0.0.0.0:{}/api/session", port);
    eprintln!(
        "   Menu unlocks after {} exchange pairs\n",
        config.menu_unlock_pairs
    );

    let llm = create_provider(&LlmConfig {
        backend,
        api_key: secrecy::SecretString::from(api_key),
        model,
    })?;

    let coach = Arc::new(Coach::new(llm, config));
    let app = session_routes(CoachRouteState {
        coach,
        extractor: Arc::new(PlainTextExtractor),
    })
    .layer(tower::ServiceBuilder::new().layer(CorsLayer::permissive()));

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    tracing::info!(port, "Session server started");
    axum::serve(listener, app).await?;

    Ok(())
}
