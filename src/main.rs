use axum::{
    routing::{get, post, put},
    Router,
};
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use profile_progress_api::config::Config;
use profile_progress_api::draft_store::DraftStore;
use profile_progress_api::handlers::{self, AppState};
use profile_progress_api::profile_client::ProfileApiClient;

/// Main entry point for the application.
///
/// This function initializes the application, including:
/// - Logging and tracing.
/// - Configuration loading.
/// - Profile and draft caches.
/// - Upstream profile API client.
/// - HTTP routes and middleware (CORS, Rate Limiting).
///
/// It then starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "profile_progress_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Short-TTL cache of raw upstream profile payloads, so repeated progress
    // and completion reads for the same user share one fetch
    let profile_cache = Cache::builder()
        .time_to_live(Duration::from_secs(config.profile_cache_ttl_secs))
        .max_capacity(10_000)
        .build();
    tracing::info!(
        "Profile cache initialized ({}s TTL, 10k capacity)",
        config.profile_cache_ttl_secs
    );

    // Per-user draft storage, checksum sealed
    let draft_store = DraftStore::new(config.draft_ttl_secs, 50_000);
    tracing::info!(
        "Draft store initialized ({}s TTL, 50k capacity)",
        config.draft_ttl_secs
    );

    // Initialize upstream profile API client
    let profile_client = ProfileApiClient::new(
        config.profile_api_base_url.clone(),
        config.profile_api_token.clone(),
    )
    .map_err(|e| anyhow::anyhow!("Failed to initialize profile API client: {}", e))?;
    tracing::info!(
        "Profile API client initialized: {}",
        config.profile_api_base_url
    );

    // Build application state
    let app_state = Arc::new(AppState {
        config: config.clone(),
        profile_client,
        profile_cache,
        draft_store,
    });

    // Configure rate limiter: 10 requests/second per IP, burst of 20
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .unwrap(),
    );

    // Build protected routes with security layers
    let protected_routes = Router::new()
        .route(
            "/api/v1/users/:user_id/progress",
            get(handlers::get_progress),
        )
        .route(
            "/api/v1/users/:user_id/completion",
            get(handlers::get_completion),
        )
        .route(
            "/api/v1/progress/preview",
            post(handlers::preview_progress),
        )
        .route(
            "/api/v1/users/:user_id/draft",
            put(handlers::save_draft).delete(handlers::delete_draft),
        )
        .layer(
            ServiceBuilder::new()
                // Request size limit: 1MB max payload (drafts are small)
                .layer(RequestBodyLimitLayer::new(1024 * 1024))
                // Rate limiting: 10 req/sec per IP, burst of 20
                .layer(GovernorLayer {
                    config: governor_conf,
                }),
        );

    // Build final app with health check (bypasses rate limiting)
    let app = Router::new()
        .route("/health", get(handlers::health))
        .merge(protected_routes)
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
