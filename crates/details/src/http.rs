use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use utility::geo::Coordinate;

use crate::{AddressLookup, DetailError, DetailResult, ImageSource};

pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

async fn get(client: &reqwest::Client, url: &str) -> DetailResult<reqwest::Response> {
    let response = client.get(url).send().await?;
    match response.status() {
        reqwest::StatusCode::OK => Ok(response),
        reqwest::StatusCode::NOT_FOUND => Err(DetailError::NotFound),
        other => Err(DetailError::InvalidResponse {
            status_code: other.as_u16(),
            url: url.to_owned(),
        }),
    }
}

/// Downloads driver photos.
#[derive(Clone, Default)]
pub struct HttpImageSource {
    client: reqwest::Client,
}

impl HttpImageSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    async fn image(&self, url: &str) -> DetailResult<Arc<[u8]>> {
        log::debug!("downloading image '{url}'");
        let bytes = get(&self.client, url).await?.bytes().await?;
        if bytes.is_empty() {
            return Err(DetailError::Other(format!("empty image at {url}")));
        }
        Ok(Arc::from(bytes.as_ref()))
    }
}

#[derive(Debug, Deserialize)]
pub struct ReverseResponse {
    pub display_name: Option<String>,
    pub error: Option<String>,
}

impl ReverseResponse {
    pub fn into_address(self) -> DetailResult<String> {
        match (self.display_name, self.error) {
            (Some(address), _) if !address.is_empty() => Ok(address),
            (_, Some(error)) => Err(DetailError::Other(error)),
            _ => Err(DetailError::NotFound),
        }
    }
}

/// Reverse geocoder speaking the Nominatim `/reverse` API.
#[derive(Clone)]
pub struct HttpAddressLookup {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAddressLookup {
    pub fn new(base_url: impl Into<String>) -> DetailResult<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        })
    }

    pub fn url(&self, at: Coordinate) -> String {
        format!(
            "{}/reverse?format=jsonv2&lat={}&lon={}",
            self.base_url, at.latitude, at.longitude
        )
    }
}

#[async_trait]
impl AddressLookup for HttpAddressLookup {
    async fn address(&self, at: Coordinate) -> DetailResult<String> {
        let url = self.url(at);
        let response: ReverseResponse = get(&self.client, &url).await?.json().await?;
        response.into_address()
    }
}
