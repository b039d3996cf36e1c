use super::helpers::{bid_from_row, ensure_amount, BID_COLUMNS};
use super::Engine;

use async_trait::async_trait;
use sqlx::Executor;

use crate::{
    api::BidAPI,
    entities::{Bid, BidStatus, NewBid},
    error::Error,
};

#[async_trait]
impl BidAPI for Engine {
    #[tracing::instrument(skip(self, params), fields(ride_id = params.ride_id, driver_id = params.driver_id))]
    async fn create_bid(&self, params: NewBid) -> Result<Bid, Error> {
        ensure_amount(params.amount)?;

        let query = format!(
            "INSERT INTO bids (ride_id, driver_id, amount, status)
             VALUES ($1, $2, $3::FLOAT8::NUMERIC(10, 2), $4)
             RETURNING {}",
            BID_COLUMNS
        );

        let row = self
            .pool
            .fetch_one(
                sqlx::query(&query)
                    .bind(params.ride_id)
                    .bind(params.driver_id)
                    .bind(params.amount)
                    .bind(BidStatus::Pending.name()),
            )
            .await?;

        let bid = bid_from_row(&row)?;

        tracing::info!(bid_id = bid.id, "bid placed");

        if let Err(err) = self.notifier.notify(&bid).await {
            tracing::warn!(bid_id = bid.id, error = %err, "bid notification failed");
        }

        Ok(bid)
    }
}
