//! Coordinate validation.
//!
//! Invalid input is an expected outcome here, never an error: both checks
//! return `bool` and have no side effects.

use crate::{Coordinate, GeocodingBatch};
use core::ops::RangeInclusive;

pub const LATITUDE_RANGE: RangeInclusive<f64> = -90.0..=90.0;
pub const LONGITUDE_RANGE: RangeInclusive<f64> = -180.0..=180.0;

/// Returns `true` iff both strings parse as decimals inside the geographic
/// range (latitude in `[-90, 90]`, longitude in `[-180, 180]`).
pub fn is_coordinate_pair_valid(latitude: &str, longitude: &str) -> bool {
    parse_pair(latitude, longitude).is_some()
}

pub fn is_coordinate_valid(coordinate: &Coordinate) -> bool {
    is_coordinate_pair_valid(&coordinate.latitude, &coordinate.longitude)
}

/// Returns `true` iff every record passes [`is_coordinate_pair_valid`].
///
/// An empty batch is vacuously valid.
pub fn is_batch_valid(batch: &GeocodingBatch) -> bool {
    batch
        .iter()
        .all(|record| is_coordinate_pair_valid(&record.latitude, &record.longitude))
}

/// Parses a validated pair into `(latitude, longitude)`, `None` if the pair
/// fails [`is_coordinate_pair_valid`].
pub(crate) fn parse_pair(latitude: &str, longitude: &str) -> Option<(f64, f64)> {
    Some((
        parse_component(latitude, &LATITUDE_RANGE)?,
        parse_component(longitude, &LONGITUDE_RANGE)?,
    ))
}

fn parse_component(raw: &str, range: &RangeInclusive<f64>) -> Option<f64> {
    // `f64::from_str` also accepts "inf" and "NaN"; NaN fails `contains`.
    raw.parse::<f64>().ok().filter(|value| range.contains(value))
}
