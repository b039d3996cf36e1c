use geo_types::Point;
use serde::{Deserialize, Serialize};

/// Latitude/longitude in decimal degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub long: f64,
}

impl Coordinates {
    pub fn new(lat: f64, long: f64) -> Self {
        Self { lat, long }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.long.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.long)
    }
}

impl From<Coordinates> for Point<f64> {
    fn from(coordinates: Coordinates) -> Self {
        Point::new(coordinates.long, coordinates.lat)
    }
}

impl From<Point<f64>> for Coordinates {
    fn from(point: Point<f64>) -> Self {
        Self {
            lat: point.y(),
            long: point.x(),
        }
    }
}

/// A driver found near a query point. Built per query, never stored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DriverMatch {
    pub id: i32,
    pub name: String,
    pub lat: f64,
    pub long: f64,
    /// Kilometres from the query point.
    pub distance: f64,
}

impl DriverMatch {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.long)
    }
}
