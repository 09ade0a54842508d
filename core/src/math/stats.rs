use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Axis-aligned bounding box in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl GeoBounds {
    pub const WORLD: GeoBounds = GeoBounds {
        min_lat: -90.0,
        max_lat: 90.0,
        min_lon: -180.0,
        max_lon: 180.0,
    };

    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn lon_span(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    /// Grows the box by `fraction` of its span on every side, with a floor so
    /// single-point tracks still get a visible area.
    pub fn padded(&self, fraction: f64, min_pad_deg: f64) -> Self {
        let lat_pad = (self.lat_span() * fraction).max(min_pad_deg);
        let lon_pad = (self.lon_span() * fraction).max(min_pad_deg);
        Self {
            min_lat: (self.min_lat - lat_pad).max(-90.0),
            max_lat: (self.max_lat + lat_pad).min(90.0),
            min_lon: (self.min_lon - lon_pad).max(-180.0),
            max_lon: (self.max_lon + lon_pad).min(180.0),
        }
    }
}

pub struct StatsHelper;

impl StatsHelper {
    pub fn mean(values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }

    /// Arithmetic mean of latitudes and longitudes.
    pub fn centroid(points: &[GeoPoint]) -> Option<GeoPoint> {
        let lats: Vec<f64> = points.iter().map(|p| p.lat).collect();
        let lons: Vec<f64> = points.iter().map(|p| p.lon).collect();
        Some(GeoPoint::new(Self::mean(&lats)?, Self::mean(&lons)?))
    }

    pub fn bounds(points: &[GeoPoint]) -> Option<GeoBounds> {
        let first = points.first()?;
        let initial = GeoBounds {
            min_lat: first.lat,
            max_lat: first.lat,
            min_lon: first.lon,
            max_lon: first.lon,
        };
        Some(points.iter().fold(initial, |acc, p| GeoBounds {
            min_lat: acc.min_lat.min(p.lat),
            max_lat: acc.max_lat.max(p.lat),
            min_lon: acc.min_lon.min(p.lon),
            max_lon: acc.max_lon.max(p.lon),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_empty_is_none() {
        assert_eq!(StatsHelper::mean(&[]), None);
        assert_eq!(StatsHelper::centroid(&[]), None);
    }

    #[test]
    fn centroid_averages_each_axis() {
        let points = [GeoPoint::new(70.0, -20.0), GeoPoint::new(72.0, -24.0)];
        assert_eq!(
            StatsHelper::centroid(&points),
            Some(GeoPoint::new(71.0, -22.0))
        );
    }

    #[test]
    fn bounds_cover_all_points() {
        let points = [
            GeoPoint::new(1.0, 5.0),
            GeoPoint::new(-3.0, 7.0),
            GeoPoint::new(2.0, -1.0),
        ];
        let bounds = StatsHelper::bounds(&points).unwrap();
        assert_eq!(bounds.min_lat, -3.0);
        assert_eq!(bounds.max_lat, 2.0);
        assert_eq!(bounds.min_lon, -1.0);
        assert_eq!(bounds.max_lon, 7.0);
    }

    #[test]
    fn padding_stays_inside_the_globe() {
        let bounds = GeoBounds {
            min_lat: 89.5,
            max_lat: 89.9,
            min_lon: 179.0,
            max_lon: 179.5,
        };
        let padded = bounds.padded(0.1, 1.0);
        assert_eq!(padded.max_lat, 90.0);
        assert_eq!(padded.max_lon, 180.0);
        assert!(padded.min_lat < bounds.min_lat);
    }
}
