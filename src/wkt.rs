//! Well-Known-Text codec for the single-point locations stored on specialists.
//!
//! Every literal produced here is ordered longitude first, latitude second. Proximity
//! queries in the catalog read the column with `ST_GeogFromText`, which expects the same
//! order, so callers must never swap the arguments.

use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors raised while decoding WKT point literals.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WktError {
    /// Input did not match `POINT(<num> <num>)`.
    #[error("Malformed WKT point: {0:?}")]
    Malformed(String),
    /// A captured coordinate could not be represented as a float.
    #[error("Invalid WKT coordinate: {0:?}")]
    InvalidCoordinate(String),
}

fn point_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^POINT\(([-+]?[0-9]*\.?[0-9]+) ([-+]?[0-9]*\.?[0-9]+)\)$")
            .expect("WKT point pattern compiles")
    })
}

/// Encode a coordinate pair as `POINT(<lon> <lat>)`.
///
/// Coordinates use the shortest decimal form that round-trips, without exponent notation
/// or trailing zeros (`48.0` renders as `48`).
pub fn encode_point(longitude: f64, latitude: f64) -> String {
    format!("POINT({longitude} {latitude})")
}

/// Decode a `POINT(<lon> <lat>)` literal into its literal coordinate substrings.
///
/// The substrings are returned untouched so the source precision survives exactly.
pub fn decode_point(wkt: &str) -> Result<(String, String), WktError> {
    let captures = point_pattern()
        .captures(wkt)
        .ok_or_else(|| WktError::Malformed(wkt.to_string()))?;

    match (captures.get(1), captures.get(2)) {
        (Some(longitude), Some(latitude)) => {
            Ok((longitude.as_str().to_string(), latitude.as_str().to_string()))
        }
        _ => Err(WktError::Malformed(wkt.to_string())),
    }
}

/// Parsed point location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Latitude in decimal degrees.
    pub latitude: f64,
}

impl GeoPoint {
    /// Build a point from longitude and latitude.
    pub const fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Render the point as a WKT literal.
    pub fn to_wkt(&self) -> String {
        encode_point(self.longitude, self.latitude)
    }
}

impl FromStr for GeoPoint {
    type Err = WktError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (longitude, latitude) = decode_point(s)?;
        let parse = |value: &str| {
            value
                .parse::<f64>()
                .map_err(|_| WktError::InvalidCoordinate(value.to_string()))
        };
        Ok(Self::new(parse(&longitude)?, parse(&latitude)?))
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wkt())
    }
}
