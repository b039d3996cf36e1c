use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::Coordinates;
use crate::error::{unexpected_error, Error};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Ride {
    pub id: i32,
    pub rider_id: i32,
    pub pickup_address: String,
    pub dropoff_address: String,
    pub pickup_lat: f64,
    pub pickup_long: f64,
    pub dropoff_lat: f64,
    pub dropoff_long: f64,
    pub vehicle_type: String,
    pub status: Status,
    pub price: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewRide {
    pub rider_id: i32,
    pub pickup_address: String,
    pub dropoff_address: String,
    #[serde(default)]
    pub pickup_lat: f64,
    #[serde(default)]
    pub pickup_long: f64,
    #[serde(default)]
    pub dropoff_lat: f64,
    #[serde(default)]
    pub dropoff_long: f64,
    #[serde(default)]
    pub vehicle_type: String,
    pub price: f64,
}

impl NewRide {
    pub fn pickup(&self) -> Coordinates {
        Coordinates::new(self.pickup_lat, self.pickup_long)
    }

    pub fn dropoff(&self) -> Coordinates {
        Coordinates::new(self.dropoff_lat, self.dropoff_long)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Requested,
}

impl Status {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Requested => "requested",
        }
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "requested" => Ok(Self::Requested),
            _ => Err(unexpected_error()),
        }
    }
}

impl Ride {
    pub fn pickup(&self) -> Coordinates {
        Coordinates::new(self.pickup_lat, self.pickup_long)
    }
}
