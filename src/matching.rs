use async_trait::async_trait;
use geo_types::Point;

use crate::entities::{Coordinates, DriverMatch};
use crate::error::Error;

pub const EARTH_RADIUS_KM: f64 = 6371.0;
pub const MAX_MATCHES: usize = 20;
pub const DEFAULT_RADIUS_KM: f64 = 5.0;

/// Finds drivers around a point, nearest first.
#[async_trait]
pub trait DriverLocator: Send + Sync {
    async fn find_nearby_drivers(
        &self,
        origin: Coordinates,
        radius_km: f64,
    ) -> Result<Vec<DriverMatch>, Error>;
}

/// Great-circle distance in kilometres (spherical law of cosines).
pub fn distance_km(a: Coordinates, b: Coordinates) -> f64 {
    let a: Point<f64> = a.into();
    let b: Point<f64> = b.into();

    let (lat1, lat2) = (a.y().to_radians(), b.y().to_radians());
    let delta_long = (b.x() - a.x()).to_radians();

    let cosine = lat1.cos() * lat2.cos() * delta_long.cos() + lat1.sin() * lat2.sin();

    // rounding can push the cosine of a zero angle just past 1
    EARTH_RADIUS_KM * cosine.clamp(-1.0, 1.0).acos()
}

/// Latitude half-width in degrees of the band that contains every point
/// within `radius_km` of a given latitude.
pub fn latitude_band_deg(radius_km: f64) -> f64 {
    (radius_km / EARTH_RADIUS_KM).to_degrees()
}

/// Keeps candidates strictly inside the radius, nearest first, at most
/// `MAX_MATCHES`. Candidate `distance` fields are overwritten.
pub fn rank_drivers<I>(candidates: I, origin: Coordinates, radius_km: f64) -> Vec<DriverMatch>
where
    I: IntoIterator<Item = DriverMatch>,
{
    let mut matches: Vec<DriverMatch> = candidates
        .into_iter()
        .filter_map(|mut candidate| {
            candidate.distance = distance_km(origin, candidate.coordinates());
            (candidate.distance < radius_km).then(|| candidate)
        })
        .collect();

    matches.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    matches.truncate(MAX_MATCHES);

    matches
}
