use std::sync::Arc;

use futures::future::join_all;

use crate::{
    bus::{driver_requests_topic, MessageBus, BIDS_GLOBAL, RIDE_REQUESTS_GLOBAL},
    entities::{Bid, Ride},
    error::Error,
    matching::DriverLocator,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// One offer per listed driver, nearest first.
    Targeted(Vec<i32>),
    /// Nobody in range; a single offer went to the global topic.
    Broadcast,
}

/// Offers a freshly created ride to nearby drivers, falling back to the
/// global topic when none are in range. The radius is never widened.
pub struct Dispatcher {
    locator: Arc<dyn DriverLocator>,
    bus: Arc<dyn MessageBus>,
}

impl Dispatcher {
    pub fn new(locator: Arc<dyn DriverLocator>, bus: Arc<dyn MessageBus>) -> Self {
        Self { locator, bus }
    }

    /// Publishing is fire-and-forget: failed publishes are logged, never
    /// returned. Only an unserializable ride is an error.
    #[tracing::instrument(skip(self, ride), fields(ride_id = ride.id))]
    pub async fn dispatch(&self, ride: &Ride, radius_km: f64) -> Result<DispatchOutcome, Error> {
        let payload = serde_json::to_vec(ride)?;

        let matches = match self
            .locator
            .find_nearby_drivers(ride.pickup(), radius_km)
            .await
        {
            Ok(matches) => matches,
            Err(err) => {
                tracing::warn!(error = %err, "driver lookup failed, treating as no drivers in range");
                Vec::new()
            }
        };

        if matches.is_empty() {
            tracing::info!(radius_km, "no drivers in range, broadcasting ride");

            if let Err(err) = self.bus.publish(RIDE_REQUESTS_GLOBAL, payload).await {
                tracing::warn!(error = %err, topic = RIDE_REQUESTS_GLOBAL, "publish failed");
            }

            return Ok(DispatchOutcome::Broadcast);
        }

        let driver_ids: Vec<i32> = matches.iter().map(|m| m.id).collect();
        tracing::info!(drivers = driver_ids.len(), "offering ride to nearby drivers");

        let publishes = driver_ids.iter().map(|&driver_id| {
            let topic = driver_requests_topic(driver_id);
            let payload = payload.clone();
            async move {
                if let Err(err) = self.bus.publish(&topic, payload).await {
                    tracing::warn!(error = %err, %topic, "publish failed");
                }
            }
        });
        join_all(publishes).await;

        Ok(DispatchOutcome::Targeted(driver_ids))
    }
}

/// Every bid goes to the one global bid topic, whatever ride or driver it is
/// for.
pub struct BidNotifier {
    bus: Arc<dyn MessageBus>,
}

impl BidNotifier {
    pub fn new(bus: Arc<dyn MessageBus>) -> Self {
        Self { bus }
    }

    #[tracing::instrument(skip(self, bid), fields(bid_id = bid.id, ride_id = bid.ride_id))]
    pub async fn notify(&self, bid: &Bid) -> Result<(), Error> {
        let payload = serde_json::to_vec(bid)?;
        self.bus.publish(BIDS_GLOBAL, payload).await
    }
}
