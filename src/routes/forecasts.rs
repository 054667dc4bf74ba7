//! Forecast HTTP endpoints.
//!
//! - GET /api/v1/forecast/city/:city_id?lang=en|fr
//! - GET /api/v1/forecast/coordinates?lat=..&lon=..&lang=en|fr

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::db::models::Language;
use crate::errors::AppError;
use crate::services::forecast::{self, AppContext, ForecastResponse};

#[derive(Debug, Deserialize, IntoParams)]
pub struct LanguageQuery {
    /// Bulletin and display language, "en" (default) or "fr"
    #[serde(default)]
    pub lang: Language,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct CoordinatesQuery {
    /// Latitude in decimal degrees, [-90, 90]
    pub lat: f64,
    /// Longitude in decimal degrees, [-180, 180]
    pub lon: f64,
    /// Bulletin and display language, "en" (default) or "fr"
    #[serde(default)]
    pub lang: Language,
}

/// Forecast for a known city.
#[utoipa::path(
    get,
    path = "/api/v1/forecast/city/{city_id}",
    tag = "Forecasts",
    params(
        ("city_id" = i64, Path, description = "City identifier"),
        LanguageQuery,
    ),
    responses(
        (status = 200, description = "Forecast for the city", body = ForecastResponse),
        (status = 404, description = "Unknown city", body = crate::errors::ErrorResponse),
        (status = 502, description = "Bulletin unavailable or malformed", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_forecast_by_city(
    State(ctx): State<Arc<AppContext>>,
    Path(city_id): Path<i64>,
    Query(query): Query<LanguageQuery>,
) -> Result<Json<ForecastResponse>, AppError> {
    let response = forecast::forecast_for_city(&ctx, city_id, query.lang).await?;
    Ok(Json(response.as_ref().clone()))
}

/// Forecast for an arbitrary point: the nearest station's nearest city.
#[utoipa::path(
    get,
    path = "/api/v1/forecast/coordinates",
    tag = "Forecasts",
    params(CoordinatesQuery),
    responses(
        (status = 200, description = "Forecast for the resolved city", body = ForecastResponse),
        (status = 400, description = "Coordinates out of range", body = crate::errors::ErrorResponse),
        (status = 404, description = "No station near the point", body = crate::errors::ErrorResponse),
        (status = 502, description = "Bulletin unavailable or malformed", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_forecast_by_coordinates(
    State(ctx): State<Arc<AppContext>>,
    Query(query): Query<CoordinatesQuery>,
) -> Result<Json<ForecastResponse>, AppError> {
    validate_coordinates(query.lat, query.lon)?;
    let response = forecast::forecast_for_point(&ctx, query.lat, query.lon, query.lang).await?;
    Ok(Json(response.as_ref().clone()))
}

fn validate_coordinates(lat: f64, lon: f64) -> Result<(), AppError> {
    if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
        return Err(AppError::BadRequest(format!(
            "Latitude {} out of range [-90, 90]",
            lat
        )));
    }
    if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
        return Err(AppError::BadRequest(format!(
            "Longitude {} out of range [-180, 180]",
            lon
        )));
    }
    Ok(())
}
