use axum::extract::{rejection::JsonRejection, Extension, Json};

use crate::api::DynAPI;
use crate::entities::{NewRide, Ride};
use crate::error::Error;

pub async fn create(
    Extension(api): Extension<DynAPI>,
    payload: Result<Json<NewRide>, JsonRejection>,
) -> Result<Json<Ride>, Error> {
    let Json(params) = payload?;
    let ride = api.create_ride(params).await?;

    Ok(ride.into())
}
