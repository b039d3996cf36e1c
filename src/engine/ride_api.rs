use super::helpers::{ensure_amount, ensure_present, ride_from_row, RIDE_COLUMNS};
use super::Engine;

use async_trait::async_trait;
use sqlx::Executor;

use crate::{
    api::RideAPI,
    dispatch::DispatchOutcome,
    entities::{NewRide, Ride, RideStatus},
    error::{invalid_input_error, Error},
    matching::DEFAULT_RADIUS_KM,
};

#[async_trait]
impl RideAPI for Engine {
    #[tracing::instrument(skip(self, params), fields(rider_id = params.rider_id))]
    async fn create_ride(&self, params: NewRide) -> Result<Ride, Error> {
        ensure_present(&params.pickup_address)?;
        ensure_present(&params.dropoff_address)?;
        ensure_amount(params.price)?;

        if !params.pickup().is_valid() || !params.dropoff().is_valid() {
            return Err(invalid_input_error());
        }

        let query = format!(
            "INSERT INTO rides (
                rider_id, pickup_address, dropoff_address,
                pickup_lat, pickup_long, dropoff_lat, dropoff_long,
                vehicle_type, status, price
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10::FLOAT8::NUMERIC(10, 2))
            RETURNING {}",
            RIDE_COLUMNS
        );

        let row = self
            .pool
            .fetch_one(
                sqlx::query(&query)
                    .bind(params.rider_id)
                    .bind(&params.pickup_address)
                    .bind(&params.dropoff_address)
                    .bind(params.pickup_lat)
                    .bind(params.pickup_long)
                    .bind(params.dropoff_lat)
                    .bind(params.dropoff_long)
                    .bind(&params.vehicle_type)
                    .bind(RideStatus::Requested.name())
                    .bind(params.price),
            )
            .await?;

        let ride = ride_from_row(&row)?;

        tracing::info!(ride_id = ride.id, "ride created");

        match self.dispatcher.dispatch(&ride, DEFAULT_RADIUS_KM).await {
            Ok(DispatchOutcome::Targeted(drivers)) => {
                tracing::info!(ride_id = ride.id, drivers = drivers.len(), "ride offered")
            }
            Ok(DispatchOutcome::Broadcast) => {
                tracing::info!(ride_id = ride.id, "ride broadcast")
            }
            Err(err) => tracing::error!(ride_id = ride.id, error = %err, "dispatch failed"),
        }

        Ok(ride)
    }
}
