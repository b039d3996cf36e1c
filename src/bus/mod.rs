mod broker;

pub use broker::{Broker, Message};

use async_trait::async_trait;

use crate::error::Error;

/// Fallback topic for ride offers when nobody is in range.
pub const RIDE_REQUESTS_GLOBAL: &str = "rides/request/global";
/// Every bid in the system is published here.
pub const BIDS_GLOBAL: &str = "rides/bids/global";

/// Targeted ride offers for a single driver.
pub fn driver_requests_topic(driver_id: i32) -> String {
    format!("driver/{}/requests", driver_id)
}

/// Publish/subscribe transport. Delivery is at-most-once to whoever is
/// subscribed at the time of the call; nothing is persisted and there is no
/// acknowledgement.
#[async_trait]
pub trait MessageBus: Send + Sync {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), Error>;
}
