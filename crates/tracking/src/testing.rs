//! Fake collaborators shared by the engine and session tests.

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use futures::{
    stream::{self, BoxStream},
    StreamExt,
};
use model::DriverRecord;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use utility::{geo::Coordinate, id::Id};

use crate::{Authorization, FetchError, FetchGateway, LocationEvent, LocationProvider};

pub const FIX: Coordinate = Coordinate {
    latitude: 37.785834,
    longitude: -122.406417,
};

pub fn records(ids: &[&str]) -> Vec<DriverRecord> {
    ids.iter()
        .map(|id| DriverRecord {
            id: Id::new((*id).to_owned()),
            name: format!("Driver {id}"),
            image: None,
        })
        .collect()
}

pub fn count(counter: &AtomicUsize) -> usize {
    counter.load(Ordering::SeqCst)
}

pub struct FakeLocation {
    authorization: Mutex<Authorization>,
    last_known: Mutex<Option<Coordinate>>,
    sender: mpsc::UnboundedSender<LocationEvent>,
    receiver: Mutex<Option<mpsc::UnboundedReceiver<LocationEvent>>>,
    pub authorization_requests: AtomicUsize,
    pub starts: AtomicUsize,
    pub stops: AtomicUsize,
}

impl FakeLocation {
    pub fn new(authorization: Authorization) -> Arc<Self> {
        let (sender, receiver) = mpsc::unbounded_channel();
        Arc::new(Self {
            authorization: Mutex::new(authorization),
            last_known: Mutex::new(None),
            sender,
            receiver: Mutex::new(Some(receiver)),
            authorization_requests: AtomicUsize::new(0),
            starts: AtomicUsize::new(0),
            stops: AtomicUsize::new(0),
        })
    }

    pub fn set_last_known(&self, fix: Coordinate) {
        *self.last_known.lock().unwrap() = Some(fix);
    }

    /// Emits `event` the way a platform provider would, updating the
    /// provider's own view first.
    pub fn push(&self, event: LocationEvent) {
        match event {
            LocationEvent::AuthorizationChanged(authorization) => {
                *self.authorization.lock().unwrap() = authorization;
            }
            LocationEvent::Fix(fix) => self.set_last_known(fix),
        }
        // the receiver may already be gone after a shutdown
        let _ = self.sender.send(event);
    }
}

impl LocationProvider for FakeLocation {
    fn events(&self) -> BoxStream<'static, LocationEvent> {
        match self.receiver.lock().unwrap().take() {
            Some(receiver) => UnboundedReceiverStream::new(receiver).boxed(),
            None => stream::empty().boxed(),
        }
    }

    fn authorization(&self) -> Authorization {
        *self.authorization.lock().unwrap()
    }

    fn last_known(&self) -> Option<Coordinate> {
        *self.last_known.lock().unwrap()
    }

    fn request_authorization(&self) {
        self.authorization_requests.fetch_add(1, Ordering::SeqCst);
    }

    fn start_updating(&self) {
        self.starts.fetch_add(1, Ordering::SeqCst);
    }

    fn stop_updating(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct FakeGateway {
    result: Result<Vec<DriverRecord>, FetchError>,
    delay: Duration,
    pub calls: AtomicUsize,
}

impl FakeGateway {
    pub fn ok(records: Vec<DriverRecord>) -> Arc<Self> {
        Self::with(Ok(records), Duration::ZERO)
    }

    pub fn failing(why: FetchError) -> Arc<Self> {
        Self::with(Err(why), Duration::ZERO)
    }

    pub fn with(result: Result<Vec<DriverRecord>, FetchError>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            result,
            delay,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl FetchGateway for FakeGateway {
    async fn fetch_roster(&self) -> Result<Vec<DriverRecord>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.result.clone()
    }
}
