//! Overlay layer builders.
//!
//! Turns earthquake records into styled circle markers and plate boundary
//! segments into styled polylines. Neither builder filters, sorts, or merges
//! its input.

use serde::Serialize;

use crate::models::{EarthquakeRecord, PlateBoundarySegment};
use crate::style::{SHALLOW_COLOR, circle_color, circle_size};

/// Marker outline color.
pub const MARKER_STROKE_COLOR: &str = "black";

/// Marker outline weight (pixels).
pub const MARKER_STROKE_WEIGHT: f64 = 0.5;

/// Marker fill opacity.
pub const MARKER_FILL_OPACITY: f64 = 0.8;

/// Plate boundary line color.
pub const BOUNDARY_COLOR: &str = "#fc56c6";

/// Plate boundary line weight (pixels).
pub const BOUNDARY_WEIGHT: f64 = 3.0;

/// Date layout used in popups, UTC.
const POPUP_DATE_FORMAT: &str = "%a %b %d %Y %H:%M:%S GMT+0000 (Coordinated Universal Time)";

/// A geographic position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// A circle marker ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyledMarker {
    pub center: LatLng,
    /// Radius in meters
    pub radius: f64,
    pub fill_color: &'static str,
    pub color: &'static str,
    pub weight: f64,
    pub fill_opacity: f64,
    /// Popup markup
    pub popup: String,
}

impl StyledMarker {
    /// Style a single earthquake.
    ///
    /// A record without a magnitude gets a zero radius; one without a depth
    /// is colored as shallow.
    #[must_use]
    pub fn from_record(record: &EarthquakeRecord) -> Self {
        Self {
            center: LatLng {
                lat: record.latitude,
                lng: record.longitude,
            },
            radius: record.magnitude.map_or(0.0, circle_size),
            fill_color: record.depth_km.map_or(SHALLOW_COLOR, circle_color),
            color: MARKER_STROKE_COLOR,
            weight: MARKER_STROKE_WEIGHT,
            fill_opacity: MARKER_FILL_OPACITY,
            popup: popup_html(record),
        }
    }
}

/// All earthquake markers, in feed order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MarkerLayer {
    pub markers: Vec<StyledMarker>,
}

/// A styled polyline. Vertices are stored as Leaflet expects them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundaryLine {
    pub name: Option<String>,
    pub latlngs: Vec<LatLng>,
}

/// Plate boundary lines sharing one style.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundaryLayer {
    pub color: &'static str,
    pub weight: f64,
    pub lines: Vec<BoundaryLine>,
}

impl Default for BoundaryLayer {
    fn default() -> Self {
        Self {
            color: BOUNDARY_COLOR,
            weight: BOUNDARY_WEIGHT,
            lines: Vec::new(),
        }
    }
}

/// Build the earthquake overlay: one marker per record, order preserved.
#[must_use]
pub fn build_earthquake_layer(records: &[EarthquakeRecord]) -> MarkerLayer {
    MarkerLayer {
        markers: records.iter().map(StyledMarker::from_record).collect(),
    }
}

/// Build the plate boundary overlay.
#[must_use]
pub fn build_boundary_layer(segments: &[PlateBoundarySegment]) -> BoundaryLayer {
    let lines = segments
        .iter()
        .map(|segment| BoundaryLine {
            name: segment.name.clone(),
            latlngs: segment
                .vertices
                .iter()
                .map(|&(lng, lat)| LatLng { lat, lng })
                .collect(),
        })
        .collect();

    BoundaryLayer {
        lines,
        ..BoundaryLayer::default()
    }
}

/// Popup label for an earthquake.
fn popup_html(record: &EarthquakeRecord) -> String {
    let mag = record
        .magnitude
        .map_or_else(|| "unknown".to_string(), |m| m.to_string());
    let place = record
        .place
        .as_deref()
        .map_or_else(|| "unknown".to_string(), escape_html);
    let depth = record
        .depth_km
        .map_or_else(|| "unknown".to_string(), |d| d.to_string());
    let date = record.time().map_or_else(
        || "Invalid Date".to_string(),
        |t| t.format(POPUP_DATE_FORMAT).to_string(),
    );

    format!(
        "<h3>Magnitude: {mag}</h3><h3>Depth: {depth} km</h3><hr>\
         <h4>Location: {place}</h4><hr><p>{date}</p>"
    )
}

/// Escape text for inclusion in HTML.
fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
