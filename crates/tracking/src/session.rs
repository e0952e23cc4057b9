use std::sync::Arc;

use actors::actor_ref::{ActorRef, WeakActorRef};
use futures::{
    stream::{self, BoxStream},
    StreamExt,
};
use model::{Annotation, Driver, Presented, Roster};
use tokio::{sync::watch, task::JoinHandle};
use tokio_stream::wrappers::WatchStream;
use utility::{geo::Coordinate, id::Id};

use crate::{
    config::TrackingConfig,
    engine::{
        AuthorizationChanged, GetPhase, LocationChanged, Phase, SelectAnnotation, SelectDriver,
        Start, TrackingEngine,
    },
    gateway::FetchGateway,
    location::{LocationEvent, LocationProvider},
    publish::{RosterUpdate, SelfLocationCallback},
    EngineError, FetchError,
};

pub struct SessionBuilder {
    config: TrackingConfig,
    on_self_location: Option<SelfLocationCallback>,
}

impl SessionBuilder {
    pub fn new(config: TrackingConfig) -> Self {
        Self {
            config,
            on_self_location: None,
        }
    }

    /// Called with every accepted device fix, before drivers are moved.
    pub fn on_self_location<F>(mut self, callback: F) -> Self
    where
        F: Fn(Coordinate) + Send + Sync + 'static,
    {
        self.on_self_location = Some(Box::new(callback));
        self
    }

    /// Subscribes to `location`, starts the engine and returns once the
    /// engine has checked the current authorization.
    pub async fn start(
        self,
        location: Arc<dyn LocationProvider>,
        gateway: Arc<dyn FetchGateway>,
    ) -> Result<TrackingSession, EngineError> {
        let events = location.events();
        let engine = TrackingEngine::new(self.config, location, gateway, self.on_self_location);
        let roster = engine.subscribe_roster();
        let presented = engine.subscribe_presented();

        let engine = actors::run(engine);
        engine.ask(Start).await?;
        let pump = tokio::spawn(forward_events(events, engine.downgrade()));

        Ok(TrackingSession {
            engine,
            roster,
            presented,
            pump,
        })
    }
}

/// A running tracking engine plus the task feeding it location events.
///
/// Dropping the session stops the engine as well, but only
/// [`shutdown`](Self::shutdown) waits for it.
pub struct TrackingSession {
    engine: ActorRef<TrackingEngine>,
    roster: watch::Receiver<RosterUpdate>,
    presented: watch::Receiver<Presented>,
    pump: JoinHandle<()>,
}

impl TrackingSession {
    pub async fn start(
        config: TrackingConfig,
        location: Arc<dyn LocationProvider>,
        gateway: Arc<dyn FetchGateway>,
    ) -> Result<Self, EngineError> {
        SessionBuilder::new(config).start(location, gateway).await
    }

    pub fn roster(&self) -> watch::Receiver<RosterUpdate> {
        self.roster.clone()
    }

    pub fn presented(&self) -> watch::Receiver<Presented> {
        self.presented.clone()
    }

    /// Every published roster, starting with the current one. A failed
    /// fetch is yielded once as an error and ends the stream.
    pub fn roster_stream(&self) -> BoxStream<'static, Result<Roster, FetchError>> {
        let updates = WatchStream::new(self.roster.clone());
        stream::unfold(Some(updates), |updates| async move {
            let mut updates = updates?;
            loop {
                match updates.next().await? {
                    RosterUpdate::Pending => continue,
                    RosterUpdate::Ready(roster) => return Some((Ok(roster), Some(updates))),
                    RosterUpdate::Failed(why) => return Some((Err(why), None)),
                }
            }
        })
        .boxed()
    }

    /// The presented driver, starting with the current one.
    pub fn presented_stream(&self) -> BoxStream<'static, Presented> {
        WatchStream::new(self.presented.clone()).boxed()
    }

    /// Presents the driver with `id`, or the user for `None` or an id
    /// that is not on the roster.
    pub async fn select_driver(&self, id: Option<Id<Driver>>) -> Result<Presented, EngineError> {
        Ok(self.engine.ask(SelectDriver(id)).await?)
    }

    pub async fn select_annotation(
        &self,
        annotation: Id<Annotation>,
    ) -> Result<Presented, EngineError> {
        Ok(self.engine.ask(SelectAnnotation(annotation)).await?)
    }

    pub async fn phase(&self) -> Result<Phase, EngineError> {
        Ok(self.engine.ask(GetPhase).await?)
    }

    /// Unsubscribes from location events and stops the engine. Nothing is
    /// published after this returns.
    pub async fn shutdown(self) {
        self.pump.abort();
        self.engine.stop().await;
    }
}

impl Drop for TrackingSession {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

async fn forward_events(
    mut events: BoxStream<'static, LocationEvent>,
    engine: WeakActorRef<TrackingEngine>,
) {
    loop {
        let event = tokio::select! {
            _ = engine.stopping() => break,
            event = events.next() => event,
        };
        let Some(event) = event else {
            log::debug!("location provider closed its event stream");
            break;
        };
        let Some(target) = engine.upgrade() else {
            break;
        };
        let sent = match event {
            LocationEvent::AuthorizationChanged(authorization) => {
                target.tell(AuthorizationChanged(authorization)).await
            }
            LocationEvent::Fix(fix) => target.tell(LocationChanged(fix)).await,
        };
        if sent.is_err() {
            break;
        }
    }
}
