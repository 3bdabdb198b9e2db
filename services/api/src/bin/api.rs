//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{ClaudeAdapter, DbAdapter, GeminiAdapter, LocalStorageAdapter, OpenAiGptAdapter},
    config::Config,
    error::ApiError,
    web::{
        self,
        rest::ApiDoc,
        state::{AppState, AuthSettings, LlmProviders},
    },
};
use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use axum::Router;
use didactic_core::auth_events::AuthEventHub;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool.clone()));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Initialize Service Adapters ---
    // Missing API keys are reported per request, not here.
    for (name, key) in [
        ("ANTHROPIC_API_KEY", &config.anthropic_api_key),
        ("OPENAI_API_KEY", &config.openai_api_key),
        ("GOOGLE_API_KEY", &config.google_api_key),
    ] {
        if key.is_none() {
            warn!("{} is not set; requests to that provider will fail", name);
        }
    }

    let http = reqwest::Client::new();
    let lesson_generator = Arc::new(ClaudeAdapter::new(
        http.clone(),
        config.anthropic_api_key.clone(),
        config.lesson_model.clone(),
        config.lesson_max_tokens,
    ));
    let llm = LlmProviders {
        claude: Arc::new(ClaudeAdapter::new(
            http.clone(),
            config.anthropic_api_key.clone(),
            config.claude_model.clone(),
            config.claude_max_tokens,
        )),
        gpt: Arc::new(OpenAiGptAdapter::new(
            config.openai_api_key.as_deref(),
            config.gpt_model.clone(),
        )),
        gemini: Arc::new(GeminiAdapter::new(
            http,
            config.google_api_key.clone(),
            config.gemini_model.clone(),
        )),
    };
    let storage = Arc::new(LocalStorageAdapter::new(config.storage_root.clone()));

    // --- 4. Build the Shared AppState ---
    let auth_events = Arc::new(AuthEventHub::new());
    let audit_log = auth_events.subscribe(|event| {
        info!(
            "Auth state change: {:?} for user {}",
            event.kind, event.user.user_id
        );
    });

    let app_state = Arc::new(AppState {
        db: db_adapter,
        storage,
        auth_events,
        auth_settings: AuthSettings::from(config.as_ref()),
        lesson_generator,
        llm,
    });

    // --- 5. Create the Web Router ---
    let origin = config.cors_origin.parse::<HeaderValue>().map_err(|e| {
        ApiError::Internal(format!("Invalid CORS_ORIGIN '{}': {}", config.cors_origin, e))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    let app = Router::new()
        .merge(web::router(app_state).layer(cors))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    audit_log.unsubscribe();
    info!("Server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received.");
}
