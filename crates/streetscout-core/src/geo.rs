use serde::{Deserialize, Serialize};

/// Errors raised when building geographic primitives from raw numbers.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("non-finite {axis} limit in bounding box")]
    NonFinite { axis: &'static str },

    #[error("inverted {axis} range: min {min} > max {max}")]
    Inverted {
        axis: &'static str,
        min: f64,
        max: f64,
    },

    #[error("{axis} range [{min}, {max}] is outside the valid interval [{lo}, {hi}]")]
    OutOfRange {
        axis: &'static str,
        min: f64,
        max: f64,
        lo: f64,
        hi: f64,
    },
}

/// A WGS84 latitude/longitude pair in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Render as `lat,lng` with 5 fractional digits (~1 m), sign preserved.
    ///
    /// This is the key used for output filenames and provider queries.
    pub fn to_fixed5(&self) -> String {
        format!("{:.5},{:.5}", self.lat, self.lng)
    }
}

/// Axis-aligned latitude/longitude rectangle, limits inclusive.
///
/// Construct through [`BoundingBox::new`] or [`BoundingBox::around`] to get
/// validated limits; the fields stay public for serde and pattern matching.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lng_min: f64,
    pub lng_max: f64,
}

impl BoundingBox {
    pub fn new(lat_min: f64, lat_max: f64, lng_min: f64, lng_max: f64) -> Result<Self, GeometryError> {
        let bbox = Self {
            lat_min,
            lat_max,
            lng_min,
            lng_max,
        };
        bbox.validate()?;
        Ok(bbox)
    }

    /// Square box of `half_extent_deg` around `center`, clipped to valid
    /// latitude/longitude limits.
    pub fn around(center: Coordinate, half_extent_deg: f64) -> Result<Self, GeometryError> {
        let half = half_extent_deg.abs();
        Self::new(
            (center.lat - half).max(-90.0),
            (center.lat + half).min(90.0),
            (center.lng - half).max(-180.0),
            (center.lng + half).min(180.0),
        )
    }

    /// Check finiteness, ordering and WGS84 limits.
    pub fn validate(&self) -> Result<(), GeometryError> {
        check_axis("latitude", self.lat_min, self.lat_max, -90.0, 90.0)?;
        check_axis("longitude", self.lng_min, self.lng_max, -180.0, 180.0)
    }

    #[inline]
    pub fn contains(&self, c: Coordinate) -> bool {
        (self.lat_min..=self.lat_max).contains(&c.lat)
            && (self.lng_min..=self.lng_max).contains(&c.lng)
    }

    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            0.5 * (self.lat_min + self.lat_max),
            0.5 * (self.lng_min + self.lng_max),
        )
    }
}

fn check_axis(axis: &'static str, min: f64, max: f64, lo: f64, hi: f64) -> Result<(), GeometryError> {
    if !min.is_finite() || !max.is_finite() {
        return Err(GeometryError::NonFinite { axis });
    }
    if min > max {
        return Err(GeometryError::Inverted { axis, min, max });
    }
    if min < lo || max > hi {
        return Err(GeometryError::OutOfRange {
            axis,
            min,
            max,
            lo,
            hi,
        });
    }
    Ok(())
}

/// A named sampling area: a world region label, the city it is
/// represented by, and the box coordinates are drawn from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub name: String,
    pub city: String,
    pub bbox: BoundingBox,
}

impl Region {
    pub fn new(name: impl Into<String>, city: impl Into<String>, bbox: BoundingBox) -> Self {
        Self {
            name: name.into(),
            city: city.into(),
            bbox,
        }
    }
}
