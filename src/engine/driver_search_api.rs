use super::Engine;

use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::{Pool, Postgres, Row};

use crate::{
    api::DriverSearchAPI,
    entities::{Coordinates, DriverMatch},
    error::{invalid_input_error, Error},
    matching::{latitude_band_deg, rank_drivers, DriverLocator},
};

/// Looks drivers up by their last reported location.
///
/// Only drivers inside the latitude band around the origin are read; exact
/// distances and ordering are computed here.
pub struct PgDriverLocator {
    pool: Pool<Postgres>,
}

impl PgDriverLocator {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DriverLocator for PgDriverLocator {
    #[tracing::instrument(skip(self))]
    async fn find_nearby_drivers(
        &self,
        origin: Coordinates,
        radius_km: f64,
    ) -> Result<Vec<DriverMatch>, Error> {
        let band = latitude_band_deg(radius_km);

        let query = "
            SELECT id, COALESCE(name, '') AS name, last_lat, last_long
            FROM users
            WHERE role = 'driver' AND last_lat BETWEEN $1 AND $2
        ";

        let mut rows = sqlx::query(query)
            .bind(origin.lat - band)
            .bind(origin.lat + band)
            .fetch(&self.pool);

        let mut candidates = Vec::new();
        while let Some(row) = rows.try_next().await? {
            candidates.push(DriverMatch {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                lat: row.try_get("last_lat")?,
                long: row.try_get("last_long")?,
                distance: 0.0,
            });
        }

        let scanned = candidates.len();
        let matches = rank_drivers(candidates, origin, radius_km);

        tracing::debug!(scanned, matched = matches.len(), "driver search done");

        Ok(matches)
    }
}

#[async_trait]
impl DriverSearchAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn find_nearby_drivers(
        &self,
        origin: Coordinates,
        radius_km: f64,
    ) -> Result<Vec<DriverMatch>, Error> {
        if !origin.is_valid() || !radius_km.is_finite() || radius_km <= 0.0 {
            return Err(invalid_input_error());
        }

        self.locator.find_nearby_drivers(origin, radius_km).await
    }
}
