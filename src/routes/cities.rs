//! City search endpoint.
//!
//! - GET /api/v1/cities/search/:prefix?lang=en|fr

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;

use crate::errors::AppError;
use crate::routes::forecasts::LanguageQuery;
use crate::services::forecast::{self, AppContext, CitySummary};

/// Accent- and case-insensitive city-name prefix search.
///
/// At most five matches, alphabetical. Prefixes shorter than two
/// characters are rejected.
#[utoipa::path(
    get,
    path = "/api/v1/cities/search/{prefix}",
    tag = "Cities",
    params(
        ("prefix" = String, Path, description = "City name prefix, two characters minimum"),
        LanguageQuery,
    ),
    responses(
        (status = 200, description = "Matching cities", body = [CitySummary]),
        (status = 400, description = "Prefix too short", body = crate::errors::ErrorResponse),
    )
)]
pub async fn search_cities(
    State(ctx): State<Arc<AppContext>>,
    Path(prefix): Path<String>,
    Query(query): Query<LanguageQuery>,
) -> Result<Json<Vec<CitySummary>>, AppError> {
    let results = forecast::search_cities(&ctx, &prefix, query.lang).await?;
    Ok(Json(results.as_ref().clone()))
}
