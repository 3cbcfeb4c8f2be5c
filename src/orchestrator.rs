//! Fetch orchestration.
//!
//! The earthquake fetch gates map construction. The plate boundary fetch is
//! spawned only once the map exists and holds its own handle to it, so the
//! boundary overlay is filled in whenever that fetch resolves.

use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::client::FeedSource;
use crate::errors::QuakemapError;
use crate::layers::{build_boundary_layer, build_earthquake_layer};
use crate::map::{MapSettings, MapView};

/// Shared handle to the composed map.
pub type SharedMap = Arc<RwLock<MapView>>;

/// A composed map and the still-running plate boundary task.
pub struct LoadedMap {
    pub view: SharedMap,
    pub boundaries: JoinHandle<()>,
}

impl LoadedMap {
    /// Wait for the plate boundary task and return the map handle.
    pub async fn settle(self) -> SharedMap {
        if let Err(e) = self.boundaries.await {
            warn!("plate boundary task did not complete: {e}");
        }
        self.view
    }
}

/// Fetch earthquakes, compose the map, and start the plate boundary fetch.
///
/// Must run inside a tokio runtime; the plate task is spawned onto it.
///
/// # Errors
///
/// Returns an error if the earthquake feed cannot be fetched. No map is
/// built in that case.
pub async fn load_map<S>(
    source: Arc<S>,
    settings: &MapSettings,
) -> Result<LoadedMap, QuakemapError>
where
    S: FeedSource + Send + Sync + 'static,
{
    let feed = source.fetch_earthquakes().await?;
    let records = feed.records();
    let layer = build_earthquake_layer(&records);

    let view: SharedMap = Arc::new(RwLock::new(MapView::compose(layer, settings)));

    let boundaries = tokio::spawn(attach_plate_boundaries(source, Arc::clone(&view)));

    Ok(LoadedMap { view, boundaries })
}

/// Fetch plate boundaries into an existing map. Failure leaves the overlay empty.
async fn attach_plate_boundaries<S>(source: Arc<S>, view: SharedMap)
where
    S: FeedSource + Send + Sync,
{
    match source.fetch_plate_boundaries().await {
        Ok(plates) => {
            let layer = build_boundary_layer(&plates.segments());
            let lines = layer.lines.len();
            view.write().await.add_plate_boundaries(layer);
            info!(lines, "plate boundaries added");
        }
        Err(e) => {
            warn!("plate boundary fetch failed, overlay left empty: {e}");
        }
    }
}
