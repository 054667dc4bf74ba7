//! Request orchestration: resolve a city, fetch its bulletin, parse it,
//! assemble the response, cache the result.
//!
//! Everything a handler needs lives in `AppContext`; there is no global
//! state. Responses are cached behind `Arc` so cache hits clone a pointer,
//! not a parsed forecast.

use std::sync::Arc;

use serde::Serialize;
use sqlx::PgPool;
use utoipa::ToSchema;

use crate::db::models::{City, Language};
use crate::db::queries;
use crate::errors::AppError;
use crate::helpers::remove_accents;
use crate::icons::IconTable;
use crate::services::bulletin::{self, Forecast};
use crate::services::cache::{Fingerprint, TtlCache};
use crate::services::ec::EcClient;
use crate::services::geo::GeoIndex;

/// Maximum number of rows returned by a name search.
const SEARCH_RESULT_LIMIT: i64 = 5;
/// Minimum prefix length accepted by a name search.
pub const SEARCH_MIN_PREFIX_LEN: usize = 2;

/// Shared per-process application state.
pub struct AppContext {
    pub pool: PgPool,
    pub ec_client: EcClient,
    pub icons: IconTable,
    pub geo: GeoIndex,
    pub forecast_cache: TtlCache<Arc<ForecastResponse>>,
    pub search_cache: TtlCache<Arc<Vec<CitySummary>>>,
    pub search_radius_deg: f64,
}

/// City identity in the requested display language.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CitySummary {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub province: String,
    pub province_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub time_zone: String,
}

impl CitySummary {
    pub fn from_city(city: &City, language: Language) -> Self {
        Self {
            id: city.id,
            code: city.code.clone(),
            name: city.name(language).to_string(),
            province: city.province.code().to_string(),
            province_name: city.province.full_name(language).to_string(),
            latitude: city.latitude,
            longitude: city.longitude,
            time_zone: city.time_zone.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForecastResponse {
    pub city: CitySummary,
    pub station_name: Option<String>,
    /// Query-point-to-station distance. Only set for coordinate lookups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub station_distance_km: Option<f64>,
    /// Normalized bulletin content (see `services::bulletin::Forecast`).
    #[schema(value_type = Object)]
    pub forecast: Forecast,
}

async fn fetch_and_parse(
    ctx: &AppContext,
    city: &City,
    language: Language,
) -> Result<Forecast, AppError> {
    let xml = ctx
        .ec_client
        .fetch_bulletin(city.province, &city.code, language)
        .await?;
    Ok(bulletin::parse(&xml, &ctx.icons)?)
}

/// Forecast for a known city id. Geometry is not involved; an unknown id
/// is a 404.
pub async fn forecast_for_city(
    ctx: &AppContext,
    city_id: i64,
    language: Language,
) -> Result<Arc<ForecastResponse>, AppError> {
    let key = Fingerprint::city(city_id, language).render();
    if let Some(hit) = ctx.forecast_cache.get(&key) {
        tracing::debug!("Cache hit for {}", key);
        return Ok(hit);
    }

    let city = queries::get_city(&ctx.pool, city_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No city with id {}", city_id)))?;

    let forecast = fetch_and_parse(ctx, &city, language).await?;
    let station_name = ctx
        .geo
        .station_by_id(city.station_id)
        .map(|s| s.name(language).to_string());

    let response = Arc::new(ForecastResponse {
        city: CitySummary::from_city(&city, language),
        station_name,
        station_distance_km: None,
        forecast,
    });
    ctx.forecast_cache.put(key, response.clone());
    Ok(response)
}

/// Forecast for an arbitrary point: nearest station, then that station's
/// nearest city, then that city's bulletin.
pub async fn forecast_for_point(
    ctx: &AppContext,
    latitude: f64,
    longitude: f64,
    language: Language,
) -> Result<Arc<ForecastResponse>, AppError> {
    let key = Fingerprint::coordinates(latitude, longitude, language).render();
    if let Some(hit) = ctx.forecast_cache.get(&key) {
        tracing::debug!("Cache hit for {}", key);
        return Ok(hit);
    }

    let resolution = ctx
        .geo
        .resolve_by_point(latitude, longitude, ctx.search_radius_deg)?;
    let city = resolution.city.clone();
    let station_name = Some(resolution.station.name(language).to_string());
    let distance_km = resolution.distance_km;

    let forecast = fetch_and_parse(ctx, &city, language).await?;

    let response = Arc::new(ForecastResponse {
        city: CitySummary::from_city(&city, language),
        station_name,
        station_distance_km: Some(distance_km),
        forecast,
    });
    ctx.forecast_cache.put(key, response.clone());
    Ok(response)
}

/// Accent-insensitive city-name prefix search, capped at
/// `SEARCH_RESULT_LIMIT` rows.
pub async fn search_cities(
    ctx: &AppContext,
    raw_prefix: &str,
    language: Language,
) -> Result<Arc<Vec<CitySummary>>, AppError> {
    let prefix = remove_accents(raw_prefix.trim()).to_lowercase();
    if prefix.chars().count() < SEARCH_MIN_PREFIX_LEN {
        return Err(AppError::BadRequest(format!(
            "Search prefix must be at least {} characters",
            SEARCH_MIN_PREFIX_LEN
        )));
    }

    let key = Fingerprint::search(&prefix, language).render();
    if let Some(hit) = ctx.search_cache.get(&key) {
        return Ok(hit);
    }

    let cities =
        queries::search_cities_by_prefix(&ctx.pool, &prefix, language, SEARCH_RESULT_LIMIT)
            .await?;
    let summaries: Vec<CitySummary> = cities
        .iter()
        .map(|c| CitySummary::from_city(c, language))
        .collect();

    let response = Arc::new(summaries);
    ctx.search_cache.put(key, response.clone());
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::Province;

    fn sample_city() -> City {
        City {
            id: 42,
            code: "s0000635".to_string(),
            province: Province::Qc,
            name_en: "Montréal".to_string(),
            name_fr: "Montréal".to_string(),
            name_en_unaccented: "Montreal".to_string(),
            name_fr_unaccented: "Montreal".to_string(),
            station_id: 7,
            latitude: 45.5088,
            longitude: -73.554,
            time_zone: "America/Montreal".to_string(),
            authoritative: true,
        }
    }

    #[test]
    fn test_city_summary_follows_language() {
        let city = sample_city();

        let en = CitySummary::from_city(&city, Language::En);
        assert_eq!(en.name, "Montréal");
        assert_eq!(en.province, "QC");
        assert_eq!(en.province_name, "Québec");

        let fr = CitySummary::from_city(&city, Language::Fr);
        assert_eq!(fr.province_name, "Québec");
        assert_eq!(fr.time_zone, "America/Montreal");
    }

    #[test]
    fn test_forecast_response_omits_distance_when_absent() {
        let response = ForecastResponse {
            city: CitySummary::from_city(&sample_city(), Language::En),
            station_name: None,
            station_distance_km: None,
            forecast: Forecast::default(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("stationDistanceKm").is_none());
    }
}
