//! Output formatters for the composed map.
//!
//! Supports a self-contained Leaflet HTML page, the JSON view model, and
//! NDJSON markers (one per line).

use std::io::{self, Write};

use crate::map::MapView;

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Interactive HTML page (default)
    #[default]
    Html,
    /// Map view model as JSON
    Json,
    /// Newline-delimited JSON markers
    Ndjson,
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "json" => Ok(Self::Json),
            "ndjson" => Ok(Self::Ndjson),
            _ => Err(format!("unknown format: {s} (expected: html, json, ndjson)")),
        }
    }
}

/// Serialize a value for embedding inside a `<script>` element.
fn script_json<T: serde::Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    // Popups and the legend carry closing tags; keep them from ending the script
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

/// Render the map as a standalone HTML page.
///
/// # Errors
///
/// Returns an error if the view cannot be serialized.
pub fn render_html(view: &MapView) -> serde_json::Result<String> {
    let token = view
        .base_layers
        .first()
        .map_or("", |layer| layer.access_token.as_str());

    Ok(PAGE_TEMPLATE
        .replace("__MAP_VIEW__", &script_json(view)?)
        .replace("__ACCESS_TOKEN__", &script_json(token)?))
}

/// Write the map as an HTML page.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_html<W: Write>(writer: &mut W, view: &MapView) -> io::Result<()> {
    let html = render_html(view).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writer.write_all(html.as_bytes())
}

/// Write the view model as pretty JSON.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json<W: Write>(writer: &mut W, view: &MapView) -> io::Result<()> {
    let json = serde_json::to_string_pretty(view)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{json}")
}

/// Write earthquake markers as newline-delimited JSON.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_ndjson<W: Write>(writer: &mut W, view: &MapView) -> io::Result<()> {
    for marker in &view.earthquakes.layer.markers {
        let json = serde_json::to_string(marker)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        writeln!(writer, "{json}")?;
    }
    Ok(())
}

/// Write the map in the specified format.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_map<W: Write>(writer: &mut W, view: &MapView, format: Format) -> io::Result<()> {
    match format {
        Format::Html => write_html(writer, view),
        Format::Json => write_json(writer, view),
        Format::Ndjson => write_ndjson(writer, view),
    }
}

// ============================================================================
// HTML Template (embedded for single-binary deployment)
// ============================================================================

const PAGE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Earthquakes &amp; Tectonic Plates</title>

    <!-- Leaflet -->
    <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css" />
    <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>

    <style>
        html, body, #map { height: 100%; margin: 0; padding: 0; }

        .legend {
            background: #ffffff;
            padding: 6px 10px;
            border-radius: 5px;
            box-shadow: 0 0 15px rgba(0, 0, 0, 0.2);
            line-height: 1.2;
        }
        .legend h3 { margin: 4px 0; }
        .legend p { margin: 2px 0; padding: 2px 8px; }
    </style>
</head>
<body>
    <div id="map"></div>

    <script>
        const view = __MAP_VIEW__;
        const accessToken = __ACCESS_TOKEN__;

        const tileLayers = {};
        view.base_layers.forEach(function (spec) {
            tileLayers[spec.name] = L.tileLayer(spec.url_template, {
                attribution: spec.attribution,
                tileSize: spec.tile_size,
                maxZoom: spec.max_zoom,
                zoomOffset: spec.zoom_offset,
                id: spec.style_id,
                accessToken: accessToken
            });
        });

        const baseMaps = {};
        view.control.base_layers.forEach(function (name) {
            baseMaps[name] = tileLayers[name];
        });

        const earthquakes = L.layerGroup(view.earthquakes.layer.markers.map(function (m) {
            return L.circle([m.center.lat, m.center.lng], {
                radius: m.radius,
                fillColor: m.fill_color,
                color: m.color,
                weight: m.weight,
                fillOpacity: m.fill_opacity
            }).bindPopup(m.popup);
        }));

        const boundaries = view.plate_boundaries.layer;
        const plates = L.layerGroup(boundaries.lines.map(function (line) {
            return L.polyline(line.latlngs.map(function (p) { return [p.lat, p.lng]; }), {
                color: boundaries.color,
                weight: boundaries.weight
            });
        }));

        const overlayMaps = {};
        overlayMaps[view.earthquakes.name] = earthquakes;
        overlayMaps[view.plate_boundaries.name] = plates;

        const initialLayers = view.base_layers
            .filter(function (spec) { return spec.visible; })
            .map(function (spec) { return tileLayers[spec.name]; });
        if (view.earthquakes.visible) { initialLayers.push(earthquakes); }
        if (view.plate_boundaries.visible) { initialLayers.push(plates); }

        const map = L.map("map", {
            center: [view.center.lat, view.center.lng],
            zoom: view.zoom,
            layers: initialLayers
        });

        L.control.layers(baseMaps, overlayMaps, {
            collapsed: view.control.collapsed,
            position: view.control.position
        }).addTo(map);

        const legend = L.control({ position: view.legend.position });
        legend.onAdd = function () {
            const div = L.DomUtil.create("div", "legend");
            div.innerHTML = view.legend.html;
            return div;
        };
        legend.addTo(map);
    </script>
</body>
</html>
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::build_earthquake_layer;
    use crate::layers::tests::record;
    use crate::map::MapSettings;

    fn view() -> MapView {
        let layer = build_earthquake_layer(&[
            record(Some(5.0), 20.0, "10km SW of Example"),
            record(Some(2.0), 95.0, "Offshore"),
        ]);
        MapView::compose(
            layer,
            &MapSettings {
                access_token: "pk.secret".into(),
            },
        )
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("html".parse::<Format>().unwrap(), Format::Html);
        assert_eq!("json".parse::<Format>().unwrap(), Format::Json);
        assert_eq!("NDJSON".parse::<Format>().unwrap(), Format::Ndjson);
        assert!("human".parse::<Format>().is_err());
    }

    #[test]
    fn test_html_embeds_view_and_token() {
        let html = render_html(&view()).unwrap();

        assert!(!html.contains("__MAP_VIEW__"));
        assert!(html.contains(r#"const accessToken = "pk.secret";"#));
        assert!(html.contains("10km SW of Example"));
        assert!(html.contains("Earthquake Depth (km)"));
        assert!(html.contains("mapbox/outdoors-v11"));
    }

    #[test]
    fn test_html_script_is_not_terminated_early() {
        let html = render_html(&view()).unwrap();
        let script = html
            .split("<script>")
            .nth(1)
            .and_then(|s| s.split("</script>").next())
            .unwrap();

        // Both popups survive inside the inline script
        assert!(script.contains("Offshore"));
        assert!(script.contains("legend.addTo(map)"));
        assert!(script.contains(r"<\/h3>"));
    }

    #[test]
    fn test_write_html_to_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write_map(&mut file, &view(), Format::Html).unwrap();

        let text = std::fs::read_to_string(file.path()).unwrap();
        assert!(text.starts_with("<!DOCTYPE html>"));
        assert!(text.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_json_omits_token() {
        let mut out = Vec::new();
        write_map(&mut out, &view(), Format::Json).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(!text.contains("pk.secret"));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["zoom"], 4);
        assert_eq!(value["control"]["collapsed"], false);
        assert_eq!(value["legend"]["position"], "bottomright");
    }

    #[test]
    fn test_ndjson_one_line_per_marker() {
        let mut out = Vec::new();
        write_map(&mut out, &view(), Format::Ndjson).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["fill_color"], "#91cf60");
        assert_eq!(first["radius"], 50_000.0);
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["fill_color"], "#d73027");
    }
}
