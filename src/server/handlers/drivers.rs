use axum::extract::{rejection::QueryRejection, Extension, Json, Query};
use serde::Deserialize;

use crate::api::DynAPI;
use crate::entities::{Coordinates, DriverMatch};
use crate::error::Error;
use crate::matching::DEFAULT_RADIUS_KM;

#[derive(Debug, Deserialize)]
pub struct NearbyParams {
    lat: f64,
    long: f64,
}

/// The radius is fixed; clients cannot widen the search.
pub async fn nearby(
    Extension(api): Extension<DynAPI>,
    query: Result<Query<NearbyParams>, QueryRejection>,
) -> Result<Json<Vec<DriverMatch>>, Error> {
    let Query(params) = query?;
    let origin = Coordinates::new(params.lat, params.long);

    let drivers = api.find_nearby_drivers(origin, DEFAULT_RADIUS_KM).await?;

    Ok(drivers.into())
}
