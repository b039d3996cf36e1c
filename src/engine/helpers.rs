use sqlx::{postgres::PgRow, Row};

use crate::{
    entities::{Bid, Ride, User},
    error::{invalid_input_error, Error},
};

pub const USER_COLUMNS: &str = "id, phone, name, role, last_lat, last_long, created_at";

pub const RIDE_COLUMNS: &str = "id, rider_id, pickup_address, dropoff_address, pickup_lat, \
     pickup_long, dropoff_lat, dropoff_long, vehicle_type, status, \
     price::FLOAT8 AS price, created_at";

pub const BID_COLUMNS: &str =
    "id, ride_id, driver_id, amount::FLOAT8 AS amount, status, created_at";

pub fn user_from_row(row: &PgRow) -> Result<User, Error> {
    let role: String = row.try_get("role")?;
    let name: Option<String> = row.try_get("name")?;

    Ok(User {
        id: row.try_get("id")?,
        phone: row.try_get("phone")?,
        name: name.unwrap_or_default(),
        role: role.parse()?,
        last_lat: row.try_get("last_lat")?,
        last_long: row.try_get("last_long")?,
        created_at: row.try_get("created_at")?,
    })
}

pub fn ride_from_row(row: &PgRow) -> Result<Ride, Error> {
    let status: String = row.try_get("status")?;
    let vehicle_type: Option<String> = row.try_get("vehicle_type")?;
    let price: Option<f64> = row.try_get("price")?;

    Ok(Ride {
        id: row.try_get("id")?,
        rider_id: row.try_get("rider_id")?,
        pickup_address: row.try_get("pickup_address")?,
        dropoff_address: row.try_get("dropoff_address")?,
        pickup_lat: row.try_get("pickup_lat")?,
        pickup_long: row.try_get("pickup_long")?,
        dropoff_lat: row.try_get("dropoff_lat")?,
        dropoff_long: row.try_get("dropoff_long")?,
        vehicle_type: vehicle_type.unwrap_or_default(),
        status: status.parse()?,
        price: price.unwrap_or_default(),
        created_at: row.try_get("created_at")?,
    })
}

pub fn bid_from_row(row: &PgRow) -> Result<Bid, Error> {
    let status: String = row.try_get("status")?;

    Ok(Bid {
        id: row.try_get("id")?,
        ride_id: row.try_get("ride_id")?,
        driver_id: row.try_get("driver_id")?,
        amount: row.try_get("amount")?,
        status: status.parse()?,
        created_at: row.try_get("created_at")?,
    })
}

/// Money columns hold two decimals and up to eight integer digits.
pub fn ensure_amount(value: f64) -> Result<(), Error> {
    if value.is_finite() && (0.0..100_000_000.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid_input_error())
    }
}

pub fn ensure_present(value: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        Err(invalid_input_error())
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_must_fit_the_money_column() {
        assert!(ensure_amount(0.0).is_ok());
        assert!(ensure_amount(150.25).is_ok());
        assert!(ensure_amount(-1.0).is_err());
        assert!(ensure_amount(f64::NAN).is_err());
        assert!(ensure_amount(1e9).is_err());
    }

    #[test]
    fn blank_strings_are_missing() {
        assert!(ensure_present("+231770000001").is_ok());
        assert!(ensure_present("   ").is_err());
        assert!(ensure_present("").is_err());
    }
}
