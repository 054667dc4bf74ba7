//! Two-stage nearest-neighbor resolution over the station/city catalogue.
//!
//! The full catalogue is loaded into memory at startup (a few thousand rows)
//! and is immutable while serving, so resolution is pure computation: a
//! cheap bounding-box prefilter over stations, exact great-circle ranking of
//! the survivors, then the nearest city among those attached to the winning
//! station.

use sqlx::PgPool;
use thiserror::Error;

use crate::db::models::{City, Station};
use crate::db::queries;

const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Error, PartialEq)]
pub enum GeoError {
    #[error("no weather station within {radius_deg} degrees of ({latitude}, {longitude})")]
    NoStationNearby {
        latitude: f64,
        longitude: f64,
        radius_deg: f64,
    },

    #[error("station {station_id} has no city attached")]
    NoCityNearby { station_id: i64 },
}

/// Great-circle distance in kilometres.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Outcome of one point resolution.
#[derive(Debug, Clone, Copy)]
pub struct Resolution<'a> {
    pub station: &'a Station,
    pub city: &'a City,
    /// Distance from the query point to the station, in km.
    pub distance_km: f64,
}

/// Immutable station/city snapshot.
pub struct GeoIndex {
    stations: Vec<Station>,
    cities: Vec<City>,
}

impl GeoIndex {
    pub fn new(stations: Vec<Station>, cities: Vec<City>) -> Self {
        Self { stations, cities }
    }

    /// Load the snapshot from the entity store.
    pub async fn load(pool: &PgPool) -> Result<Self, sqlx::Error> {
        let stations = queries::all_stations(pool).await?;
        let cities = queries::all_cities(pool).await?;
        tracing::info!(
            "Loaded geo snapshot: {} stations, {} cities",
            stations.len(),
            cities.len()
        );
        Ok(Self::new(stations, cities))
    }

    pub fn station_by_id(&self, id: i64) -> Option<&Station> {
        self.stations.iter().find(|s| s.id == id)
    }

    /// Resolve a query point to its nearest station's nearest city.
    ///
    /// `radius_deg` bounds the prefilter box, not the reported distance: a
    /// station in the box corner can be further away in km than one just
    /// outside an edge, and still wins. Equidistant candidates resolve to
    /// the first one in catalogue order.
    pub fn resolve_by_point(
        &self,
        latitude: f64,
        longitude: f64,
        radius_deg: f64,
    ) -> Result<Resolution<'_>, GeoError> {
        let mut nearest_station: Option<(&Station, f64)> = None;
        for station in &self.stations {
            if (station.latitude - latitude).abs() > radius_deg
                || (station.longitude - longitude).abs() > radius_deg
            {
                continue;
            }
            let d = haversine_km(latitude, longitude, station.latitude, station.longitude);
            // Strictly less, so ties keep the earlier candidate.
            if nearest_station.map_or(true, |(_, best)| d < best) {
                nearest_station = Some((station, d));
            }
        }

        let (station, distance_km) =
            nearest_station.ok_or(GeoError::NoStationNearby {
                latitude,
                longitude,
                radius_deg,
            })?;

        let mut nearest_city: Option<(&City, f64)> = None;
        for city in self.cities.iter().filter(|c| c.station_id == station.id) {
            let d = haversine_km(latitude, longitude, city.latitude, city.longitude);
            if nearest_city.map_or(true, |(_, best)| d < best) {
                nearest_city = Some((city, d));
            }
        }

        let (city, _) = nearest_city.ok_or(GeoError::NoCityNearby {
            station_id: station.id,
        })?;

        Ok(Resolution {
            station,
            city,
            distance_km,
        })
    }
}
