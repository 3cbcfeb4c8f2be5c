//! Marker styling: radius from magnitude, fill color from depth.

/// Radius scale applied to the squared magnitude (meters).
pub const RADIUS_SCALE: f64 = 2000.0;

/// Depth color steps, deepest first. The first step whose bound the depth
/// strictly exceeds wins.
pub const DEPTH_COLOR_STEPS: [(f64, &str); 5] = [
    (90.0, "#d73027"),
    (70.0, "#fc8d59"),
    (50.0, "#fee08b"),
    (30.0, "#d9ef8b"),
    (10.0, "#91cf60"),
];

/// Color for depths at or below 10 km, and for anything that compares false.
pub const SHALLOW_COLOR: &str = "#1a9850";

/// Circle radius in meters for a magnitude: `magnitude² × 2000`.
///
/// No clamping; large magnitudes give large circles.
#[must_use]
pub fn circle_size(magnitude: f64) -> f64 {
    magnitude.powi(2) * RADIUS_SCALE
}

/// Fill color for an event depth in kilometers.
#[must_use]
pub fn circle_color(depth_km: f64) -> &'static str {
    DEPTH_COLOR_STEPS
        .iter()
        .find(|(bound, _)| depth_km > *bound)
        .map_or(SHALLOW_COLOR, |&(_, color)| color)
}
