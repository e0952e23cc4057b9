use std::{error, fmt, sync::Arc, time::Duration};

use async_trait::async_trait;
use utility::geo::Coordinate;

pub mod cache;
pub mod estimate;
pub mod eta;
pub mod http;
pub mod service;

pub use cache::DetailCache;
pub use estimate::StraightLineRoutes;
pub use http::{HttpAddressLookup, HttpImageSource};
pub use service::{DetailService, DriverDetails, Photo, PhotoCache};

#[derive(Debug, Clone)]
pub enum DetailError {
    Request(Arc<reqwest::Error>),
    InvalidResponse { status_code: u16, url: String },
    NotFound,
    Other(String),
}

impl error::Error for DetailError {}

impl fmt::Display for DetailError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DetailError::Request(e) => write!(f, "HTTP request error: {}", e),
            DetailError::InvalidResponse { status_code, url } => {
                write!(f, "Invalid Response ({}) {}", status_code, url)
            }
            DetailError::NotFound => write!(f, "nothing found"),
            DetailError::Other(e) => write!(f, "{e}"),
        }
    }
}

impl From<reqwest::Error> for DetailError {
    fn from(e: reqwest::Error) -> Self {
        DetailError::Request(Arc::new(e))
    }
}

pub type DetailResult<T> = Result<T, DetailError>;

/// Reverse geocoding.
#[async_trait]
pub trait AddressLookup: Send + Sync + 'static {
    async fn address(&self, at: Coordinate) -> DetailResult<String>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Route {
    pub distance_meters: f64,
    pub travel_time: Duration,
}

#[async_trait]
pub trait RouteLookup: Send + Sync + 'static {
    async fn route(&self, from: Coordinate, to: Coordinate) -> DetailResult<Route>;
}

#[async_trait]
pub trait ImageSource: Send + Sync + 'static {
    async fn image(&self, url: &str) -> DetailResult<Arc<[u8]>>;
}
