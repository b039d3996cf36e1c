pub mod auth;
pub mod bids;
pub mod drivers;
pub mod rides;
pub mod subscriptions;
pub mod users;
