//! Built-in world regions, one representative city each.

use streetscout_core::{BoundingBox, Coordinate, Region};

/// Half-extent in degrees of the box drawn around each catalog city
/// (about 5.5 km north-south).
pub const CITY_HALF_EXTENT_DEG: f64 = 0.05;

const CITIES: [(&str, &str, f64, f64); 9] = [
    ("North America", "Chicago", 41.8781, -87.6298),
    ("South America", "Bogota", 4.7110, -74.0721),
    ("Western Europe", "London", 51.5074, -0.1278),
    ("Southern Europe", "Rome", 41.9028, 12.4964),
    ("Middle East", "Dubai", 25.276987, 55.296249),
    ("Sub-Saharan Africa", "Lagos", 6.5244, 3.3792),
    ("South Asia", "Delhi", 28.6139, 77.2090),
    ("East Asia", "Tokyo", 35.6762, 139.6503),
    ("Southeast Asia", "Hanoi", 21.0285, 105.8542),
];

/// The default catalog, in a fixed order.
pub fn default_regions() -> Vec<Region> {
    CITIES
        .iter()
        .filter_map(|&(name, city, lat, lng)| {
            BoundingBox::around(Coordinate::new(lat, lng), CITY_HALF_EXTENT_DEG)
                .ok()
                .map(|bbox| Region::new(name, city, bbox))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_boxes_are_valid_and_centred() {
        let regions = default_regions();
        assert_eq!(regions.len(), 9);
        for (region, &(name, city, lat, lng)) in regions.iter().zip(CITIES.iter()) {
            assert_eq!(region.name, name);
            assert_eq!(region.city, city);
            region.bbox.validate().expect("valid box");
            let c = region.bbox.center();
            assert!((c.lat - lat).abs() < 1e-9);
            assert!((c.lng - lng).abs() < 1e-9);
        }
    }

    #[test]
    fn catalog_matches_around_constructor() {
        for (region, &(_, _, lat, lng)) in default_regions().iter().zip(CITIES.iter()) {
            let expected =
                BoundingBox::around(Coordinate::new(lat, lng), CITY_HALF_EXTENT_DEG).expect("around");
            assert_eq!(region.bbox, expected);
        }
    }
}
