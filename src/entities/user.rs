use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{unexpected_error, Error};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub phone: String,
    pub name: String,
    pub role: Role,
    pub last_lat: f64,
    pub last_long: f64,
    pub created_at: DateTime<Utc>,
}

/// Fields accepted when registering a user; location defaults to (0, 0).
#[derive(Clone, Debug, Deserialize)]
pub struct NewUser {
    pub phone: String,
    #[serde(default)]
    pub name: String,
    pub role: Role,
    #[serde(default)]
    pub last_lat: f64,
    #[serde(default)]
    pub last_long: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Rider,
    Driver,
}

impl Role {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Rider => "rider",
            Self::Driver => "driver",
        }
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rider" => Ok(Self::Rider),
            "driver" => Ok(Self::Driver),
            _ => Err(unexpected_error()),
        }
    }
}
