use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use futures::{stream::BoxStream, StreamExt};
use tokio::{sync::broadcast, task::JoinHandle};
use tokio_stream::wrappers::BroadcastStream;
use tracking::{Authorization, LocationEvent, LocationProvider};
use utility::geo::{self, Coordinate, VARIANT_COUNT};

/// Meters walked per step.
pub const STEP_METERS: f64 = 15.0;

struct State {
    authorization: Authorization,
    position: Coordinate,
    walker: Option<JoinHandle<()>>,
}

struct Shared {
    state: Mutex<State>,
    events: broadcast::Sender<LocationEvent>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: LocationEvent) {
        // no subscriber yet, or the session is gone
        let _ = self.events.send(event);
    }
}

/// Stand-in for a device location service: grants access as soon as it is
/// asked for and then walks a few meters every `step`.
#[derive(Clone)]
pub struct SimulatedLocation {
    shared: Arc<Shared>,
    step: Duration,
}

impl SimulatedLocation {
    pub fn new(start: Coordinate, step: Duration) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    authorization: Authorization::NotDetermined,
                    position: start,
                    walker: None,
                }),
                events,
            }),
            step,
        }
    }

    pub fn position(&self) -> Coordinate {
        self.shared.lock().position
    }
}

impl LocationProvider for SimulatedLocation {
    fn events(&self) -> BoxStream<'static, LocationEvent> {
        BroadcastStream::new(self.shared.events.subscribe())
            .filter_map(|event| async move {
                match event {
                    Ok(event) => Some(event),
                    Err(why) => {
                        log::warn!("location events lagged: {}", why);
                        None
                    }
                }
            })
            .boxed()
    }

    fn authorization(&self) -> Authorization {
        self.shared.lock().authorization
    }

    fn last_known(&self) -> Option<Coordinate> {
        let state = self.shared.lock();
        state
            .authorization
            .is_granted()
            .then_some(state.position)
    }

    fn request_authorization(&self) {
        log::info!("granting simulated location access");
        self.shared.lock().authorization = Authorization::Authorized;
        self.shared
            .emit(LocationEvent::AuthorizationChanged(Authorization::Authorized));
    }

    fn start_updating(&self) {
        let mut state = self.shared.lock();
        if state.walker.is_some() {
            return;
        }
        let shared = self.shared.clone();
        let step = self.step;
        state.walker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(step);
            let mut heading = 0;
            loop {
                interval.tick().await;
                let position = {
                    let mut state = shared.lock();
                    state.position = geo::displace(state.position, heading, STEP_METERS);
                    state.position
                };
                shared.emit(LocationEvent::Fix(position));
                heading = (heading + 1) % VARIANT_COUNT;
            }
        }));
    }

    fn stop_updating(&self) {
        if let Some(walker) = self.shared.lock().walker.take() {
            walker.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn authorizes_on_request() {
        let location = SimulatedLocation::new(Coordinate::new(0.0, 0.0), Duration::from_secs(1));
        let mut events = location.events();
        assert_eq!(location.last_known(), None);

        location.request_authorization();

        assert_eq!(
            events.next().await,
            Some(LocationEvent::AuthorizationChanged(Authorization::Authorized))
        );
        assert_eq!(location.last_known(), Some(Coordinate::new(0.0, 0.0)));
    }

    #[tokio::test(start_paused = true)]
    async fn walks_until_stopped() {
        let start = Coordinate::new(54.3, 10.1);
        let location = SimulatedLocation::new(start, Duration::from_secs(3));
        let mut events = location.events();
        location.request_authorization();
        events.next().await;

        location.start_updating();
        let Some(LocationEvent::Fix(first)) = events.next().await else {
            panic!("expected a fix");
        };
        let Some(LocationEvent::Fix(second)) = events.next().await else {
            panic!("expected a fix");
        };
        assert_ne!(first, start);
        assert_ne!(second, first);
        assert_eq!(location.position(), second);

        location.stop_updating();
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(location.position(), second);
    }
}
