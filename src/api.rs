use std::sync::Arc;

use async_channel::Receiver;
use async_trait::async_trait;

use crate::bus::Message;
use crate::entities::{Bid, Coordinates, DriverMatch, NewBid, NewRide, NewUser, Ride, User};
use crate::error::Error;

#[async_trait]
pub trait UserAPI {
    async fn create_user(&self, params: NewUser) -> Result<User, Error>;
}

#[async_trait]
pub trait RideAPI {
    /// Persists the ride, then offers it to drivers. Offering never fails
    /// the call once the ride is stored.
    async fn create_ride(&self, params: NewRide) -> Result<Ride, Error>;
}

#[async_trait]
pub trait BidAPI {
    async fn create_bid(&self, params: NewBid) -> Result<Bid, Error>;
}

#[async_trait]
pub trait DriverSearchAPI {
    async fn find_nearby_drivers(
        &self,
        origin: Coordinates,
        radius_km: f64,
    ) -> Result<Vec<DriverMatch>, Error>;
}

#[async_trait]
pub trait AuthAPI {
    /// Returns the issued code; SMS delivery is best effort.
    async fn send_otp(&self, phone: &str) -> Result<String, Error>;
    async fn verify_otp(&self, phone: &str, code: &str) -> Result<(), Error>;
}

#[async_trait]
pub trait SubscriptionAPI {
    async fn subscribe(&self, topic: &str) -> Result<Receiver<Message>, Error>;
    /// Releases subscribers of `topic` whose receivers have been dropped.
    async fn unsubscribe(&self, topic: &str) -> Result<(), Error>;
}

pub trait API: UserAPI + RideAPI + BidAPI + DriverSearchAPI + AuthAPI + SubscriptionAPI {}

pub type DynAPI = Arc<dyn API + Send + Sync>;
