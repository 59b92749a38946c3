use async_openai::{config::OpenAIConfig, Client};
use replylens_backend::infrastructure::config::{AiProvider, Config, LogFormat};
use replylens_backend::infrastructure::db::{apply_schema, check_connection, create_pool};
use replylens_backend::infrastructure::http::{build_app, start_http_server};
use replylens_backend::infrastructure::repositories::{
    AssistantRepository, GeminiAssistantRepository, OpenAiAssistantRepository,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        "Starting ReplyLens Backend on {}:{}",
        config.host,
        config.port
    );

    // Create database connection pool
    let pool = create_pool(&config.database_url).await?;
    tracing::info!("Database connection pool created");

    // Verify database connection
    check_connection(&pool).await?;
    apply_schema(&pool).await?;
    tracing::info!("Database schema ready");

    let assistant = create_assistant(&config)?;
    tracing::info!(
        provider = assistant.name(),
        interstitial_seconds = config.interstitial_seconds,
        "AI provider initialized"
    );

    let pool = Arc::new(pool);
    let config = Arc::new(config);

    let app = build_app(config.clone(), pool, assistant);

    start_http_server(config, app).await?;

    Ok(())
}

fn create_assistant(config: &Config) -> Result<Arc<dyn AssistantRepository>, String> {
    match config.ai_provider {
        AiProvider::Gemini => {
            let api_key = config
                .gemini_api_key
                .clone()
                .ok_or("API key not found: set GEMINI_API_KEY or API_KEY")?;
            Ok(Arc::new(GeminiAssistantRepository::new(
                api_key,
                config.gemini_vision_model.clone(),
                config.gemini_text_model.clone(),
            )))
        }
        AiProvider::OpenAi => {
            let api_key = config
                .openai_api_key
                .clone()
                .ok_or("API key not found: set OPENAI_API_KEY")?;
            let client = Client::with_config(OpenAIConfig::new().with_api_key(api_key));
            Ok(Arc::new(OpenAiAssistantRepository::new(
                Arc::new(client),
                config.openai_model.clone(),
            )))
        }
    }
}

fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "replylens_backend=debug,tower_http=debug".into());

    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
