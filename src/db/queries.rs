//! Read-only entity-store queries.
//!
//! Stations and cities are written by the offline seeding scripts; at serve
//! time this module only reads. The full station/city catalogue is loaded
//! once into `GeoIndex` at startup, so the per-request queries here are the
//! direct city lookup and the name prefix search.

use sqlx::PgPool;

use super::models::{City, Station};
use crate::db::models::Language;

const CITY_COLUMNS: &str = "id, code, province, name_en, name_fr, \
     name_en_unaccented, name_fr_unaccented, station_id, \
     latitude, longitude, time_zone, authoritative";

/// Direct city lookup by identifier. No geometry involved.
pub async fn get_city(pool: &PgPool, id: i64) -> Result<Option<City>, sqlx::Error> {
    sqlx::query_as::<_, City>(&format!("SELECT {} FROM cities WHERE id = $1", CITY_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// All stations, for the in-memory geo snapshot.
pub async fn all_stations(pool: &PgPool) -> Result<Vec<Station>, sqlx::Error> {
    sqlx::query_as::<_, Station>(
        "SELECT id, name_en, name_fr, latitude, longitude FROM stations ORDER BY id",
    )
    .fetch_all(pool)
    .await
}

/// All cities, for the in-memory geo snapshot.
pub async fn all_cities(pool: &PgPool) -> Result<Vec<City>, sqlx::Error> {
    sqlx::query_as::<_, City>(&format!("SELECT {} FROM cities ORDER BY id", CITY_COLUMNS))
        .fetch_all(pool)
        .await
}

/// Accent-insensitive city-name prefix search.
///
/// `prefix` must already be accent-folded (see `helpers::remove_accents`);
/// it is matched against the unaccented name column for the requested
/// language. Results are ordered by the same column so that prefix ties are
/// alphabetical.
pub async fn search_cities_by_prefix(
    pool: &PgPool,
    prefix: &str,
    language: Language,
    limit: i64,
) -> Result<Vec<City>, sqlx::Error> {
    let column = match language {
        Language::En => "name_en_unaccented",
        Language::Fr => "name_fr_unaccented",
    };

    // `prefix` goes through a bind parameter; only the validated column name
    // is interpolated.
    let sql = format!(
        "SELECT {} FROM cities WHERE {} ILIKE $1 || '%' ORDER BY {} LIMIT $2",
        CITY_COLUMNS, column, column
    );

    sqlx::query_as::<_, City>(&sql)
        .bind(prefix)
        .bind(limit)
        .fetch_all(pool)
        .await
}

/// Station/city row counts, used by the health endpoint.
pub async fn entity_counts(pool: &PgPool) -> Result<(i64, i64), sqlx::Error> {
    let stations = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM stations")
        .fetch_one(pool)
        .await?;
    let cities = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM cities")
        .fetch_one(pool)
        .await?;
    Ok((stations, cities))
}
