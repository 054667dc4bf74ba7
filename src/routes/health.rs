use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::db::queries;
use crate::services::forecast::AppContext;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status ("ok" when healthy, "degraded" when DB is unreachable)
    pub status: String,
    /// API version
    pub version: String,
    /// Whether the database is reachable
    pub database: bool,
    /// Stations in the catalogue, 0 when the DB is unreachable
    pub stations: i64,
    /// Cities in the catalogue, 0 when the DB is unreachable
    pub cities: i64,
}

/// Health check endpoint.
///
/// Verifies database connectivity and reports catalogue row counts.
/// Returns status "degraded" (still 200) if the DB is unreachable, so
/// load balancers can distinguish partial failures.
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_check(State(ctx): State<Arc<AppContext>>) -> Json<HealthResponse> {
    let counts = queries::entity_counts(&ctx.pool).await;
    let db_ok = counts.is_ok();
    let (stations, cities) = counts.unwrap_or((0, 0));

    Json(HealthResponse {
        status: if db_ok {
            "ok".to_string()
        } else {
            "degraded".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: db_ok,
        stations,
        cities,
    })
}
