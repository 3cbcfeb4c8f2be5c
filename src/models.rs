//! Data models for the two GeoJSON feeds.
//!
//! The earthquake structures match the USGS summary feed format. Plate
//! boundaries follow the PB2002 dataset layout: a plain `FeatureCollection`
//! of `LineString` (occasionally `MultiLineString`) features.

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

use crate::errors::QuakemapError;

/// GeoJSON collection type tag.
const FEATURE_COLLECTION: &str = "FeatureCollection";

/// Top-level GeoJSON response from USGS feeds.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureCollection {
    /// Always "FeatureCollection"
    #[serde(rename = "type")]
    pub type_: String,

    /// Feed metadata
    #[serde(default)]
    pub metadata: Option<Metadata>,

    /// Earthquake events
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    /// Validate the response structure.
    pub fn validate(&self) -> Result<(), QuakemapError> {
        check_collection_type(&self.type_)
    }

    /// Derive one record per feature, preserving feed order.
    #[must_use]
    pub fn records(&self) -> Vec<EarthquakeRecord> {
        self.features.iter().map(EarthquakeRecord::from).collect()
    }
}

/// Metadata about the feed response.
#[derive(Debug, Clone, Deserialize)]
pub struct Metadata {
    /// Human-readable title
    pub title: String,

    /// Number of events in response
    pub count: usize,
}

/// A single earthquake event.
#[derive(Debug, Clone, Deserialize)]
pub struct Feature {
    /// Geographic location
    pub geometry: Geometry,

    /// Event properties
    pub properties: Properties,
}

impl Feature {
    /// Get longitude (degrees).
    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.geometry.coordinates.first().copied().unwrap_or(0.0)
    }

    /// Get latitude (degrees).
    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.geometry.coordinates.get(1).copied().unwrap_or(0.0)
    }

    /// Get depth in kilometers (positive down), if the feed gives one.
    #[must_use]
    pub fn depth_km(&self) -> Option<f64> {
        self.geometry.coordinates.get(2).copied()
    }
}

/// Point geometry for an event.
#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    /// Coordinates: [longitude, latitude, depth_km]
    pub coordinates: Vec<f64>,
}

/// Event properties used by the map.
#[derive(Debug, Clone, Deserialize)]
pub struct Properties {
    /// Magnitude value (null for some automatic solutions)
    pub mag: Option<f64>,

    /// Human-readable place description
    pub place: Option<String>,

    /// Event time (ms since epoch)
    pub time: i64,
}

/// One earthquake as the map sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct EarthquakeRecord {
    pub magnitude: Option<f64>,
    pub depth_km: Option<f64>,
    pub place: Option<String>,
    pub time_millis: i64,
    pub longitude: f64,
    pub latitude: f64,
}

impl EarthquakeRecord {
    /// Event time as a `DateTime<Utc>`, if the timestamp is representable.
    #[must_use]
    pub fn time(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.time_millis).single()
    }
}

impl From<&Feature> for EarthquakeRecord {
    fn from(f: &Feature) -> Self {
        Self {
            magnitude: f.properties.mag,
            depth_km: f.depth_km(),
            place: f.properties.place.clone(),
            time_millis: f.properties.time,
            longitude: f.longitude(),
            latitude: f.latitude(),
        }
    }
}

/// Top-level plate boundary collection.
#[derive(Debug, Clone, Deserialize)]
pub struct PlateCollection {
    #[serde(rename = "type")]
    pub type_: String,

    pub features: Vec<PlateFeature>,
}

impl PlateCollection {
    /// Validate the response structure.
    pub fn validate(&self) -> Result<(), QuakemapError> {
        check_collection_type(&self.type_)
    }

    /// Flatten all line geometries into boundary segments.
    ///
    /// A `MultiLineString` contributes one segment per line; features without
    /// line geometry are skipped.
    #[must_use]
    pub fn segments(&self) -> Vec<PlateBoundarySegment> {
        let mut segments = Vec::with_capacity(self.features.len());

        for feature in &self.features {
            let name = feature.properties.as_ref().and_then(|p| p.name.clone());
            match &feature.geometry {
                Some(LineGeometry::LineString { coordinates }) => {
                    segments.push(PlateBoundarySegment::new(name, coordinates));
                }
                Some(LineGeometry::MultiLineString { coordinates }) => {
                    for line in coordinates {
                        segments.push(PlateBoundarySegment::new(name.clone(), line));
                    }
                }
                Some(LineGeometry::Unsupported) | None => {}
            }
        }

        segments
    }
}

/// One feature of the plate boundary dataset.
#[derive(Debug, Clone, Deserialize)]
pub struct PlateFeature {
    #[serde(default)]
    pub properties: Option<PlateProperties>,

    #[serde(default)]
    pub geometry: Option<LineGeometry>,
}

/// Descriptive properties of a boundary (PB2002 naming).
#[derive(Debug, Clone, Deserialize)]
pub struct PlateProperties {
    /// Boundary name, e.g. "AF-AN"
    #[serde(rename = "Name")]
    pub name: Option<String>,
}

/// Line geometry of a boundary feature.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum LineGeometry {
    LineString { coordinates: Vec<Vec<f64>> },
    MultiLineString { coordinates: Vec<Vec<Vec<f64>>> },
    #[serde(other)]
    Unsupported,
}

/// An ordered run of (longitude, latitude) vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct PlateBoundarySegment {
    pub name: Option<String>,
    pub vertices: Vec<(f64, f64)>,
}

impl PlateBoundarySegment {
    fn new(name: Option<String>, positions: &[Vec<f64>]) -> Self {
        let vertices = positions
            .iter()
            .filter_map(|p| match p.as_slice() {
                [lon, lat, ..] => Some((*lon, *lat)),
                _ => None,
            })
            .collect();
        Self { name, vertices }
    }
}

fn check_collection_type(type_: &str) -> Result<(), QuakemapError> {
    if type_ != FEATURE_COLLECTION {
        return Err(QuakemapError::InvalidResponse(format!(
            "expected type '{FEATURE_COLLECTION}', got '{type_}'"
        )));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const SAMPLE_FEED: &str = r#"{
        "type": "FeatureCollection",
        "metadata": {
            "generated": 1700000100000,
            "url": "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_week.geojson",
            "title": "USGS All Earthquakes, Past Week",
            "status": 200,
            "api": "1.10.3",
            "count": 2
        },
        "features": [
            {
                "type": "Feature",
                "id": "ci40000001",
                "properties": {
                    "mag": 5,
                    "place": "10km SW of Example",
                    "time": 1700000000000,
                    "updated": 1700000050000,
                    "url": "https://earthquake.usgs.gov/earthquakes/eventpage/ci40000001",
                    "status": "reviewed",
                    "type": "earthquake"
                },
                "geometry": { "type": "Point", "coordinates": [-117.5, 35.2, 20] }
            },
            {
                "type": "Feature",
                "id": "ak0000002",
                "properties": {
                    "mag": null,
                    "place": null,
                    "time": 1699990000000
                },
                "geometry": { "type": "Point", "coordinates": [-150.1, 61.3] }
            }
        ]
    }"#;

    pub(crate) const SAMPLE_PLATES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "LAYER": "plate", "Name": "AF-AN", "PlateA": "AF", "PlateB": "AN" },
                "geometry": {
                    "type": "LineString",
                    "coordinates": [[-0.4379, -54.8518], [-0.0388, -54.6772], [0.0568, -54.6328]]
                }
            },
            {
                "type": "Feature",
                "properties": { "Name": "NA-PA" },
                "geometry": {
                    "type": "MultiLineString",
                    "coordinates": [
                        [[-124.0, 40.3], [-125.0, 40.4]],
                        [[-126.0, 41.0], [-127.0, 41.5], [128.0]]
                    ]
                }
            },
            {
                "type": "Feature",
                "properties": { "Name": "marker" },
                "geometry": { "type": "Point", "coordinates": [10.0, 10.0] }
            }
        ]
    }"#;

    #[test]
    fn test_parse_sample_feed() {
        let feed: FeatureCollection =
            serde_json::from_str(SAMPLE_FEED).expect("failed to parse sample feed");

        feed.validate().expect("invalid feed");
        assert_eq!(feed.features.len(), 2);
        assert_eq!(feed.metadata.as_ref().map(|m| m.count), Some(2));
        assert_eq!(feed.features[0].properties.time, 1_700_000_000_000);
    }

    #[test]
    fn test_records_preserve_order_and_coordinates() {
        let feed: FeatureCollection = serde_json::from_str(SAMPLE_FEED).unwrap();
        let records = feed.records();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].magnitude, Some(5.0));
        assert_eq!(records[0].depth_km, Some(20.0));
        assert!((records[0].longitude - (-117.5)).abs() < f64::EPSILON);
        assert!((records[0].latitude - 35.2).abs() < f64::EPSILON);
        assert_eq!(records[0].place.as_deref(), Some("10km SW of Example"));

        // Missing depth and null magnitude both stay absent
        assert_eq!(records[1].magnitude, None);
        assert_eq!(records[1].depth_km, None);
        assert!((records[1].latitude - 61.3).abs() < f64::EPSILON);
        assert_eq!(records[1].place, None);
    }

    #[test]
    fn test_record_time() {
        let feed: FeatureCollection = serde_json::from_str(SAMPLE_FEED).unwrap();
        let time = feed.records()[0].time().unwrap();
        assert_eq!(time.to_rfc3339(), "2023-11-14T22:13:20+00:00");
    }

    #[test]
    fn test_rejects_non_collection() {
        let json = r#"{ "type": "Feature", "features": [] }"#;
        let feed: FeatureCollection = serde_json::from_str(json).unwrap();
        assert!(matches!(
            feed.validate(),
            Err(QuakemapError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_plate_segments() {
        let plates: PlateCollection = serde_json::from_str(SAMPLE_PLATES).unwrap();
        plates.validate().unwrap();

        let segments = plates.segments();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].name.as_deref(), Some("AF-AN"));
        assert_eq!(segments[0].vertices.len(), 3);
        assert_eq!(segments[0].vertices[0], (-0.4379, -54.8518));

        // MultiLineString splits, short positions are dropped
        assert_eq!(segments[1].name.as_deref(), Some("NA-PA"));
        assert_eq!(segments[2].vertices, vec![(-126.0, 41.0), (-127.0, 41.5)]);
    }
}
