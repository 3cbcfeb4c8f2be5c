//! Feed client.
//!
//! Provides async HTTP access to the USGS earthquake feed and the plate
//! boundary dataset. Uses reqwest with rustls for TLS.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::errors::QuakemapError;
use crate::models::{FeatureCollection, PlateCollection};

/// Default request timeout in seconds. The plate dataset is a few MB.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// User agent string for API requests.
const USER_AGENT: &str = concat!("quakemap/", env!("CARGO_PKG_VERSION"));

/// USGS base URL for earthquake feeds.
pub const USGS_BASE_URL: &str = "https://earthquake.usgs.gov";

/// PB2002 plate boundaries as GeoJSON.
pub const PLATE_BOUNDARIES_URL: &str =
    "https://raw.githubusercontent.com/fraxen/tectonicplates/master/GeoJSON/PB2002_boundaries.json";

/// Available feed types for summary feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedType {
    AllHour,
    AllDay,
    AllWeek,
    AllMonth,
    Mag1Hour,
    Mag1Day,
    Mag1Week,
    Mag1Month,
    Mag25Hour,
    Mag25Day,
    Mag25Week,
    Mag25Month,
    Mag45Hour,
    Mag45Day,
    Mag45Week,
    Mag45Month,
    SignificantHour,
    SignificantDay,
    SignificantWeek,
    SignificantMonth,
}

impl FeedType {
    /// Get the URL path segment for this feed type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AllHour => "all_hour",
            Self::AllDay => "all_day",
            Self::AllWeek => "all_week",
            Self::AllMonth => "all_month",
            Self::Mag1Hour => "1.0_hour",
            Self::Mag1Day => "1.0_day",
            Self::Mag1Week => "1.0_week",
            Self::Mag1Month => "1.0_month",
            Self::Mag25Hour => "2.5_hour",
            Self::Mag25Day => "2.5_day",
            Self::Mag25Week => "2.5_week",
            Self::Mag25Month => "2.5_month",
            Self::Mag45Hour => "4.5_hour",
            Self::Mag45Day => "4.5_day",
            Self::Mag45Week => "4.5_week",
            Self::Mag45Month => "4.5_month",
            Self::SignificantHour => "significant_hour",
            Self::SignificantDay => "significant_day",
            Self::SignificantWeek => "significant_week",
            Self::SignificantMonth => "significant_month",
        }
    }
}

impl std::str::FromStr for FeedType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all_hour" => Ok(Self::AllHour),
            "all_day" => Ok(Self::AllDay),
            "all_week" => Ok(Self::AllWeek),
            "all_month" => Ok(Self::AllMonth),
            "1.0_hour" => Ok(Self::Mag1Hour),
            "1.0_day" => Ok(Self::Mag1Day),
            "1.0_week" => Ok(Self::Mag1Week),
            "1.0_month" => Ok(Self::Mag1Month),
            "2.5_hour" => Ok(Self::Mag25Hour),
            "2.5_day" => Ok(Self::Mag25Day),
            "2.5_week" => Ok(Self::Mag25Week),
            "2.5_month" => Ok(Self::Mag25Month),
            "4.5_hour" => Ok(Self::Mag45Hour),
            "4.5_day" => Ok(Self::Mag45Day),
            "4.5_week" => Ok(Self::Mag45Week),
            "4.5_month" => Ok(Self::Mag45Month),
            "significant_hour" => Ok(Self::SignificantHour),
            "significant_day" => Ok(Self::SignificantDay),
            "significant_week" => Ok(Self::SignificantWeek),
            "significant_month" => Ok(Self::SignificantMonth),
            _ => Err(format!("unknown feed type: {s}")),
        }
    }
}

/// Where to fetch both datasets from.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub feed_type: FeedType,
    pub base_url: String,
    pub plate_url: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            feed_type: FeedType::AllWeek,
            base_url: USGS_BASE_URL.to_string(),
            plate_url: PLATE_BOUNDARIES_URL.to_string(),
        }
    }
}

impl FeedConfig {
    /// Full URL of the earthquake summary feed.
    #[must_use]
    pub fn earthquake_url(&self) -> String {
        format!(
            "{}/earthquakes/feed/v1.0/summary/{}.geojson",
            self.base_url.trim_end_matches('/'),
            self.feed_type.as_str()
        )
    }
}

/// A source of the two datasets the map is built from.
pub trait FeedSource {
    /// Fetch the earthquake feed.
    fn fetch_earthquakes(
        &self,
    ) -> impl Future<Output = Result<FeatureCollection, QuakemapError>> + Send;

    /// Fetch the plate boundary dataset.
    fn fetch_plate_boundaries(
        &self,
    ) -> impl Future<Output = Result<PlateCollection, QuakemapError>> + Send;
}

/// HTTP client for both feeds.
pub struct HttpFeedClient {
    client: Client,
    config: FeedConfig,
}

impl HttpFeedClient {
    /// Create a new feed client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: FeedConfig) -> Result<Self, QuakemapError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { client, config })
    }

    /// GET a URL and decode its JSON body.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, QuakemapError> {
        debug!("fetching {}", url);

        let response = self.client.get(url).send().await?;

        // Check status before parsing
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(QuakemapError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl FeedSource for HttpFeedClient {
    #[instrument(skip(self), fields(feed = self.config.feed_type.as_str()))]
    async fn fetch_earthquakes(&self) -> Result<FeatureCollection, QuakemapError> {
        let feed: FeatureCollection = self.get_json(&self.config.earthquake_url()).await?;
        feed.validate()?;

        if let Some(meta) = &feed.metadata {
            debug!("feed '{}' reports {} events", meta.title, meta.count);
        }
        debug!("fetched {} events", feed.features.len());
        Ok(feed)
    }

    #[instrument(skip(self))]
    async fn fetch_plate_boundaries(&self) -> Result<PlateCollection, QuakemapError> {
        let plates: PlateCollection = self.get_json(&self.config.plate_url).await?;
        plates.validate()?;

        debug!("fetched {} plate boundary features", plates.features.len());
        Ok(plates)
    }
}
