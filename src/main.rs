// Citypage weather API
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Router};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod db;
mod errors;
mod helpers;
mod icons;
mod routes;
mod services;

use config::AppConfig;
use icons::IconTable;
use services::cache::TtlCache;
use services::ec::EcClient;
use services::forecast::AppContext;
use services::geo::GeoIndex;

/// Maximum number of connections in the database pool.
const DB_POOL_MAX_CONNECTIONS: u32 = 5;
/// Minimum number of connections kept alive in the database pool.
const DB_POOL_MIN_CONNECTIONS: u32 = 2;

/// Citypage weather API — OpenAPI specification.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Citypage Weather API",
        version = "0.1.0",
        description = "Weather forecast API backed by Environment Canada citypage XML \
            bulletins. Resolves arbitrary coordinates to the nearest weather station's \
            nearest city, fetches and normalizes that city's bulletin, and caches the \
            result for a short TTL.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Forecasts", description = "Forecast retrieval by city or coordinates"),
        (name = "Cities", description = "City name search"),
    ),
    paths(
        routes::health::health_check,
        routes::forecasts::get_forecast_by_city,
        routes::forecasts::get_forecast_by_coordinates,
        routes::cities::search_cities,
    ),
    components(
        schemas(
            routes::health::HealthResponse,
            services::forecast::CitySummary,
            services::forecast::ForecastResponse,
            db::models::Language,
            db::models::Province,
            errors::ErrorResponse,
        )
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "citypage_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();

    // Set up database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(DB_POOL_MAX_CONNECTIONS)
        .min_connections(DB_POOL_MIN_CONNECTIONS)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    // Run migrations
    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Station/city snapshot for geo resolution. The catalogue is written by
    // the offline seeding scripts; an empty one still serves (every point
    // lookup 404s) so only a query failure is fatal.
    let geo = GeoIndex::load(&pool)
        .await
        .expect("Failed to load station/city catalogue");

    let ctx = Arc::new(AppContext {
        pool,
        ec_client: EcClient::new(&config.ec_base_url, &config.ec_user_agent),
        icons: IconTable::new(),
        geo,
        forecast_cache: TtlCache::new(config.forecast_ttl),
        search_cache: TtlCache::new(config.search_ttl),
        search_radius_deg: config.search_radius_deg,
    });

    // CORS — read-only API, restrict methods to GET
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET])
        .allow_headers(Any);

    let app = Router::new()
        .route("/api/v1/health", get(routes::health::health_check))
        .route(
            "/api/v1/forecast/city/:city_id",
            get(routes::forecasts::get_forecast_by_city),
        )
        .route(
            "/api/v1/forecast/coordinates",
            get(routes::forecasts::get_forecast_by_coordinates),
        )
        .route(
            "/api/v1/cities/search/:prefix",
            get(routes::cities::search_cities),
        )
        .with_state(ctx)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("API server listening on {}", addr);
    tracing::info!(
        "Swagger UI available at http://localhost:{}/swagger-ui/",
        config.port
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind TCP listener");
    axum::serve(listener, app)
        .await
        .expect("Server terminated unexpectedly");
}
