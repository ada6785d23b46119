//! Domain values exchanged with callers

use serde::{Deserialize, Serialize};

/// A point location to be written as one document
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndexableLocation {
    /// Document key; re-indexing the same id replaces the prior document
    pub id: i64,
    pub latitude: f64,
    pub longitude: f64,
}

impl IndexableLocation {
    pub fn new(id: i64, latitude: f64, longitude: f64) -> Self {
        Self {
            id,
            latitude,
            longitude,
        }
    }
}

/// Half-open bounding box: minimums inclusive, maximums exclusive
///
/// Ordering of min/max is not checked. An inverted axis is sent as-is and
/// matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBoxQuery {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

impl BoundingBoxQuery {
    pub fn new(
        min_latitude: f64,
        max_latitude: f64,
        min_longitude: f64,
        max_longitude: f64,
    ) -> Self {
        Self {
            min_latitude,
            max_latitude,
            min_longitude,
            max_longitude,
        }
    }

    /// True when either axis has min > max
    pub fn is_inverted(&self) -> bool {
        self.min_latitude > self.max_latitude || self.min_longitude > self.max_longitude
    }

    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        latitude >= self.min_latitude
            && latitude < self.max_latitude
            && longitude >= self.min_longitude
            && longitude < self.max_longitude
    }
}

/// One matching document, in engine order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Candidate {
    pub id: i64,
}
