use std::sync::Arc;

use chrono::Local;
use model::Driver;
use utility::geo::Coordinate;

use crate::{
    cache::DetailCache,
    eta::{self, ETA_UNKNOWN},
    AddressLookup, ImageSource, RouteLookup,
};

pub const ADDRESS_UNKNOWN: &str = "Address unknown";

/// Downloaded driver photos keyed by URL.
pub type PhotoCache = DetailCache<String, Arc<[u8]>>;

#[derive(Debug, Clone, PartialEq)]
pub enum Photo {
    /// No photo reference, or the download failed.
    Placeholder,
    Image(Arc<[u8]>),
}

impl Photo {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Photo::Placeholder)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DriverDetails {
    pub name: String,
    pub address: String,
    pub eta: String,
    pub photo: Photo,
}

/// Resolves the detail card of a presented driver. Every field falls back
/// to a placeholder on its own; the card itself never fails.
pub struct DetailService {
    addresses: Arc<dyn AddressLookup>,
    routes: Arc<dyn RouteLookup>,
    images: Arc<dyn ImageSource>,
    photos: Arc<PhotoCache>,
}

impl DetailService {
    pub fn new(
        addresses: Arc<dyn AddressLookup>,
        routes: Arc<dyn RouteLookup>,
        images: Arc<dyn ImageSource>,
        photos: Arc<PhotoCache>,
    ) -> Self {
        Self {
            addresses,
            routes,
            images,
            photos,
        }
    }

    /// `from` is the device location the arrival estimate starts at.
    pub async fn details(&self, driver: &Driver, from: Option<Coordinate>) -> DriverDetails {
        let (address, eta, photo) = tokio::join!(
            self.address(driver.position()),
            self.eta(from, driver.position()),
            self.photo(driver.photo_ref()),
        );
        DriverDetails {
            name: driver.name().to_owned(),
            address,
            eta,
            photo,
        }
    }

    pub async fn address(&self, at: Coordinate) -> String {
        match self.addresses.address(at).await {
            Ok(address) => address,
            Err(why) => {
                log::debug!("no address for {}: {}", at, why);
                ADDRESS_UNKNOWN.to_owned()
            }
        }
    }

    pub async fn eta(&self, from: Option<Coordinate>, to: Coordinate) -> String {
        let Some(from) = from else {
            return ETA_UNKNOWN.to_owned();
        };
        match self.routes.route(from, to).await {
            Ok(route) => eta::describe(Some(&route), Local::now()),
            Err(why) => {
                log::debug!("no route from {} to {}: {}", from, to, why);
                ETA_UNKNOWN.to_owned()
            }
        }
    }

    pub async fn photo(&self, url: Option<&str>) -> Photo {
        let Some(url) = url else {
            return Photo::Placeholder;
        };
        let images = self.images.clone();
        let result = self
            .photos
            .get_or_fetch(url.to_owned(), || async move { images.image(url).await })
            .await;
        match result {
            Ok(bytes) => Photo::Image(bytes),
            Err(why) => {
                log::warn!("could not download photo '{}': {}", url, why);
                Photo::Placeholder
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    use async_trait::async_trait;
    use model::DriverRecord;
    use utility::id::Id;

    use super::*;
    use crate::{DetailError, DetailResult, Route, StraightLineRoutes};

    struct FixedAddress(Option<&'static str>);

    #[async_trait]
    impl AddressLookup for FixedAddress {
        async fn address(&self, _: Coordinate) -> DetailResult<String> {
            self.0.map(str::to_owned).ok_or(DetailError::NotFound)
        }
    }

    struct NoRoute;

    #[async_trait]
    impl RouteLookup for NoRoute {
        async fn route(&self, _: Coordinate, _: Coordinate) -> DetailResult<Route> {
            Err(DetailError::Other("no route".to_owned()))
        }
    }

    #[derive(Default)]
    struct CountingImages {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl ImageSource for CountingImages {
        async fn image(&self, url: &str) -> DetailResult<Arc<[u8]>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(100)).await;
            if self.fail {
                return Err(DetailError::NotFound);
            }
            Ok(Arc::from(url.as_bytes()))
        }
    }

    fn driver(image: Option<&str>) -> Driver {
        Driver::new(
            DriverRecord {
                id: Id::new("driver-1".to_owned()),
                name: "Ana".to_owned(),
                image: image.map(str::to_owned),
            },
            Coordinate::new(37.79, -122.40),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn resolves_every_field() {
        let images = Arc::new(CountingImages::default());
        let service = DetailService::new(
            Arc::new(FixedAddress(Some("Market Street"))),
            Arc::new(StraightLineRoutes::default()),
            images.clone(),
            Arc::new(PhotoCache::new()),
        );

        let details = service
            .details(
                &driver(Some("https://img/ana.png")),
                Some(Coordinate::new(37.78, -122.40)),
            )
            .await;

        assert_eq!(details.name, "Ana");
        assert_eq!(details.address, "Market Street");
        assert!(details.eta.ends_with("min away"), "{}", details.eta);
        assert_eq!(details.photo, Photo::Image(Arc::from(&b"https://img/ana.png"[..])));
    }

    #[tokio::test(start_paused = true)]
    async fn failures_fall_back_to_placeholders() {
        let images = Arc::new(CountingImages {
            fail: true,
            ..Default::default()
        });
        let service = DetailService::new(
            Arc::new(FixedAddress(None)),
            Arc::new(NoRoute),
            images.clone(),
            Arc::new(PhotoCache::new()),
        );

        let details = service
            .details(&driver(Some("https://img/ana.png")), Some(Coordinate::new(0.0, 0.0)))
            .await;

        assert_eq!(details.address, ADDRESS_UNKNOWN);
        assert_eq!(details.eta, ETA_UNKNOWN);
        assert!(details.photo.is_placeholder());

        // failed downloads are retried next time
        service.photo(Some("https://img/ana.png")).await;
        assert_eq!(images.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_photo_or_location() {
        let images = Arc::new(CountingImages::default());
        let service = DetailService::new(
            Arc::new(FixedAddress(Some("Market Street"))),
            Arc::new(StraightLineRoutes::default()),
            images.clone(),
            Arc::new(PhotoCache::new()),
        );

        let details = service.details(&driver(None), None).await;

        assert!(details.photo.is_placeholder());
        assert_eq!(details.eta, ETA_UNKNOWN);
        assert_eq!(images.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn photos_are_downloaded_once() {
        let images = Arc::new(CountingImages::default());
        let service = DetailService::new(
            Arc::new(FixedAddress(None)),
            Arc::new(NoRoute),
            images.clone(),
            Arc::new(PhotoCache::new()),
        );
        let url = Some("https://img/ana.png");

        let (first, second) = tokio::join!(service.photo(url), service.photo(url));
        let third = service.photo(url).await;

        assert_eq!(first, second);
        assert_eq!(second, third);
        assert_eq!(images.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn services_sharing_a_cache_share_photos() {
        let images = Arc::new(CountingImages::default());
        let photos = Arc::new(PhotoCache::new());
        let service = |photos| {
            DetailService::new(
                Arc::new(FixedAddress(None)),
                Arc::new(NoRoute),
                images.clone(),
                photos,
            )
        };
        let first = service(photos.clone());
        let second = service(photos.clone());
        let url = Some("https://img/ana.png");

        assert_eq!(first.photo(url).await, second.photo(url).await);
        assert_eq!(images.calls.load(Ordering::SeqCst), 1);
        assert_eq!(photos.len(), 1);
    }
}
