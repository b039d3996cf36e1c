mod bid;
mod location;
mod ride;
mod user;

pub use bid::{Bid, NewBid, Status as BidStatus};
pub use location::{Coordinates, DriverMatch};
pub use ride::{NewRide, Ride, Status as RideStatus};
pub use user::{NewUser, Role, User};
