//! Map composition.
//!
//! [`MapView`] is everything the page needs to draw the map: base tile
//! layers, the two overlays, the layer switcher and the legend panel.

use serde::Serialize;

use crate::layers::{BoundaryLayer, LatLng, MarkerLayer};
use crate::legend::legend_html;

/// Initial map center.
pub const MAP_CENTER: LatLng = LatLng {
    lat: 47.0,
    lng: -114.0,
};

/// Initial zoom level.
pub const MAP_ZOOM: u8 = 4;

/// Mapbox styles tile endpoint, filled in by the map library.
pub const TILE_URL_TEMPLATE: &str =
    "https://api.mapbox.com/styles/v1/{id}/tiles/{z}/{x}/{y}?access_token={accessToken}";

/// Attribution shown on every base layer.
pub const TILE_ATTRIBUTION: &str = "Map data &copy; <a href=\"https://www.openstreetmap.org/\">OpenStreetMap</a> contributors, \
     <a href=\"https://creativecommons.org/licenses/by-sa/2.0/\">CC-BY-SA</a>, \
     Imagery © <a href=\"https://www.mapbox.com/\">Mapbox</a>";

pub const TILE_SIZE: u32 = 512;
pub const TILE_MAX_ZOOM: u8 = 18;
pub const TILE_ZOOM_OFFSET: i8 = -1;

/// Overlay names, as shown in the layer switcher.
pub const EARTHQUAKES_OVERLAY: &str = "Earthquakes";
pub const PLATES_OVERLAY: &str = "Tectonic Plate Boundaries";

/// A base map style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseLayerSpec {
    /// Name in the layer switcher
    pub name: &'static str,
    /// Mapbox style identifier
    pub style_id: &'static str,
}

/// Base layers in switcher order. The first one is shown on load.
pub const BASE_LAYERS: [BaseLayerSpec; 4] = [
    BaseLayerSpec {
        name: "Dark",
        style_id: "mapbox/dark-v10",
    },
    BaseLayerSpec {
        name: "Light",
        style_id: "mapbox/light-v10",
    },
    BaseLayerSpec {
        name: "Satellite",
        style_id: "mapbox/satellite-v9",
    },
    BaseLayerSpec {
        name: "Outdoors",
        style_id: "mapbox/outdoors-v11",
    },
];

/// Settings supplied from outside the crate.
#[derive(Debug, Clone, Default)]
pub struct MapSettings {
    /// Mapbox access token, passed through untouched
    pub access_token: String,
}

/// A tile layer with its library options.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileLayer {
    pub name: &'static str,
    pub url_template: &'static str,
    pub style_id: &'static str,
    pub attribution: &'static str,
    pub tile_size: u32,
    pub max_zoom: u8,
    pub zoom_offset: i8,
    #[serde(skip_serializing)]
    pub access_token: String,
    pub visible: bool,
}

impl TileLayer {
    fn from_spec(spec: BaseLayerSpec, settings: &MapSettings, visible: bool) -> Self {
        Self {
            name: spec.name,
            url_template: TILE_URL_TEMPLATE,
            style_id: spec.style_id,
            attribution: TILE_ATTRIBUTION,
            tile_size: TILE_SIZE,
            max_zoom: TILE_MAX_ZOOM,
            zoom_offset: TILE_ZOOM_OFFSET,
            access_token: settings.access_token.clone(),
            visible,
        }
    }
}

/// A named, independently toggleable layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overlay<L> {
    pub name: &'static str,
    pub visible: bool,
    pub layer: L,
}

/// Screen corner for a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlPosition {
    TopRight,
    BottomRight,
}

/// The layer switcher.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerControl {
    /// Radio-exclusive base layer names
    pub base_layers: Vec<&'static str>,
    /// Toggleable overlay names
    pub overlays: Vec<&'static str>,
    pub collapsed: bool,
    pub position: ControlPosition,
}

/// The legend panel. Content is fixed when the map is composed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendPanel {
    pub position: ControlPosition,
    pub html: String,
}

/// The composed map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub center: LatLng,
    pub zoom: u8,
    pub base_layers: Vec<TileLayer>,
    pub earthquakes: Overlay<MarkerLayer>,
    pub plate_boundaries: Overlay<BoundaryLayer>,
    pub control: LayerControl,
    pub legend: LegendPanel,
}

impl MapView {
    /// Compose the map around an earthquake layer.
    ///
    /// The plate boundary overlay starts empty; see
    /// [`MapView::add_plate_boundaries`].
    #[must_use]
    pub fn compose(earthquakes: MarkerLayer, settings: &MapSettings) -> Self {
        let base_layers = BASE_LAYERS
            .iter()
            .enumerate()
            .map(|(i, spec)| TileLayer::from_spec(*spec, settings, i == 0))
            .collect();

        let control = LayerControl {
            base_layers: BASE_LAYERS.iter().map(|spec| spec.name).collect(),
            overlays: vec![EARTHQUAKES_OVERLAY, PLATES_OVERLAY],
            collapsed: false,
            position: ControlPosition::TopRight,
        };

        tracing::info!(markers = earthquakes.markers.len(), "composed map");

        Self {
            center: MAP_CENTER,
            zoom: MAP_ZOOM,
            base_layers,
            earthquakes: Overlay {
                name: EARTHQUAKES_OVERLAY,
                visible: true,
                layer: earthquakes,
            },
            plate_boundaries: Overlay {
                name: PLATES_OVERLAY,
                visible: true,
                layer: BoundaryLayer::default(),
            },
            control,
            legend: LegendPanel {
                position: ControlPosition::BottomRight,
                html: legend_html(),
            },
        }
    }

    /// Fill the plate boundary overlay.
    pub fn add_plate_boundaries(&mut self, boundaries: BoundaryLayer) {
        self.plate_boundaries.layer.lines.extend(boundaries.lines);
    }
}
