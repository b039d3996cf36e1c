use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{unexpected_error, Error};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Bid {
    pub id: i32,
    pub ride_id: i32,
    pub driver_id: i32,
    pub amount: f64,
    pub status: Status,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewBid {
    pub ride_id: i32,
    pub driver_id: i32,
    pub amount: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pending,
}

impl Status {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
        }
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            _ => Err(unexpected_error()),
        }
    }
}
