use std::sync::Arc;

use actors::{
    actor::Actor,
    actor_ref::WeakActorRef,
    handler::{Handler, Message},
    schedule::{self, Timer},
};
use async_trait::async_trait;
use model::{Annotation, Driver, DriverRecord, Presented, SelfDriver};
use tokio::{sync::watch, task::JoinHandle};
use utility::{geo::Coordinate, id::Id};

use crate::{
    config::TrackingConfig,
    directory::DriverDirectory,
    gateway::FetchGateway,
    location::{Authorization, LocationProvider},
    position::PositionGenerator,
    publish::{Publisher, RosterUpdate, SelfLocationCallback},
    selection::SelectionController,
    FetchError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    AwaitingFirstFix,
    Tracking(TrackingPhase),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingPhase {
    /// The roster request is in flight.
    Fetching,
    /// Roster published, repositioning on every tick.
    Live,
    /// The roster request failed. Not retried.
    FetchFailed,
}

/// Owns the roster and the selection. Every mutation happens inside one of
/// the handlers below, so location fixes, authorization changes, the fetch
/// result and timer ticks are applied strictly one after another.
pub struct TrackingEngine {
    config: TrackingConfig,
    phase: Phase,
    authorization: Authorization,
    updating: bool,
    latest_fix: Option<Coordinate>,
    directory: DriverDirectory,
    selection: SelectionController,
    generator: PositionGenerator,
    publisher: Publisher,
    location: Arc<dyn LocationProvider>,
    gateway: Arc<dyn FetchGateway>,
    myself: Option<WeakActorRef<Self>>,
    ticker: Option<Timer>,
    timer_generation: u64,
    fetch: Option<JoinHandle<()>>,
}

impl TrackingEngine {
    pub fn new(
        config: TrackingConfig,
        location: Arc<dyn LocationProvider>,
        gateway: Arc<dyn FetchGateway>,
        on_self_location: Option<SelfLocationCallback>,
    ) -> Self {
        let generator = PositionGenerator::new(config.perturbation, config.seed);
        Self {
            config,
            phase: Phase::Uninitialized,
            authorization: Authorization::NotDetermined,
            updating: false,
            latest_fix: None,
            directory: DriverDirectory::new(),
            selection: SelectionController::new(),
            generator,
            publisher: Publisher::new(on_self_location),
            location,
            gateway,
            myself: None,
            ticker: None,
            timer_generation: 0,
            fetch: None,
        }
    }

    pub fn subscribe_roster(&self) -> watch::Receiver<RosterUpdate> {
        self.publisher.subscribe_roster()
    }

    pub fn subscribe_presented(&self) -> watch::Receiver<Presented> {
        self.selection.subscribe()
    }

    fn me(&self) -> SelfDriver {
        SelfDriver {
            position: self.latest_fix,
        }
    }

    fn start(&mut self) {
        if self.phase != Phase::Uninitialized {
            return;
        }
        self.phase = Phase::AwaitingFirstFix;
        log::info!("tracking engine started, waiting for a location fix");
        let authorization = self.location.authorization();
        self.on_authorization(authorization);
    }

    fn on_authorization(&mut self, authorization: Authorization) {
        let previous = self.authorization;
        self.authorization = authorization;
        if self.phase == Phase::Uninitialized {
            return;
        }

        if !authorization.is_granted() {
            log::info!("location access is {:?}, requesting it", authorization);
            self.stop_ticker();
            self.location.request_authorization();
            return;
        }
        if previous.is_granted() && self.updating {
            return;
        }

        self.location.start_updating();
        self.updating = true;
        if let Some(fix) = self.location.last_known() {
            self.on_fix(fix);
        }
    }

    fn on_fix(&mut self, fix: Coordinate) {
        if self.phase == Phase::Uninitialized || !self.authorization.is_granted() {
            log::debug!("ignoring location fix {} without authorization", fix);
            return;
        }

        self.latest_fix = Some(fix);
        self.publisher.self_location(fix);
        let me = self.me();
        self.selection.refresh_self(&me);

        match self.phase {
            Phase::AwaitingFirstFix => {
                log::info!("first location fix at {}, fetching drivers", fix);
                self.phase = Phase::Tracking(TrackingPhase::Fetching);
                self.fetch_roster();
            }
            Phase::Tracking(TrackingPhase::Live) => self.restart_ticker(),
            _ => {}
        }
    }

    fn fetch_roster(&mut self) {
        let gateway = self.gateway.clone();
        let myself = self.myself.clone();
        self.fetch = Some(tokio::spawn(async move {
            let result = gateway.fetch_roster().await;
            match myself.and_then(|myself| myself.upgrade()) {
                Some(engine) => {
                    if engine.tell(RosterFetched(result)).await.is_err() {
                        log::debug!("engine stopped before the roster arrived");
                    }
                }
                None => log::debug!("engine stopped before the roster arrived"),
            }
        }));
    }

    fn on_roster_fetched(&mut self, result: Result<Vec<DriverRecord>, FetchError>) {
        self.fetch = None;
        if self.phase != Phase::Tracking(TrackingPhase::Fetching) {
            log::warn!("dropping roster result received in phase {:?}", self.phase);
            return;
        }
        let Some(origin) = self.latest_fix else {
            return;
        };

        let generator = &mut self.generator;
        let directory = &mut self.directory;
        let result = result.and_then(|records| {
            directory.replace(records, || generator.perturb(origin, None))
        });

        match result {
            Ok(()) => {
                log::info!("roster of {} drivers is live", self.directory.len());
                self.phase = Phase::Tracking(TrackingPhase::Live);
                self.publisher.roster(self.directory.snapshot());
                let me = self.me();
                self.selection.reindex(&self.directory, &me);
                if self.authorization.is_granted() {
                    self.restart_ticker();
                }
            }
            Err(why) => {
                log::warn!("could not fetch drivers: {}", why);
                self.phase = Phase::Tracking(TrackingPhase::FetchFailed);
                self.publisher.roster_failed(why);
            }
        }
    }

    fn on_tick(&mut self, timer: u64) {
        if timer != self.timer_generation
            || self.phase != Phase::Tracking(TrackingPhase::Live)
        {
            log::debug!("ignoring stale tick of timer {}", timer);
            return;
        }
        let Some(origin) = self.latest_fix else {
            return;
        };

        let generator = &mut self.generator;
        self.directory
            .reposition(|driver| generator.relocate(origin, driver.position()));
        log::debug!(
            "repositioned {} drivers around {}",
            self.directory.len(),
            origin
        );
        self.publisher.roster(self.directory.snapshot());
        let me = self.me();
        self.selection.refresh(&self.directory, &me);
    }

    fn present(&mut self, id: Option<Id<Driver>>) -> Presented {
        let me = self.me();
        self.selection.present(id.as_ref(), &self.directory, &me)
    }

    fn present_annotation(&mut self, annotation: Id<Annotation>) -> Presented {
        let me = self.me();
        self.selection
            .present_annotation(&annotation, &self.directory, &me)
    }

    /// Cancels the running timer, if any, and schedules a fresh one whose
    /// first tick is one full period away.
    fn restart_ticker(&mut self) {
        self.stop_ticker();
        let Some(myself) = self.myself.clone() else {
            return;
        };
        let generation = self.timer_generation;
        self.ticker = Some(schedule::repeat(
            myself,
            self.config.tick_period,
            move || Tick { timer: generation },
        ));
    }

    /// Also invalidates ticks the old timer may already have queued.
    fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.cancel();
        }
        self.timer_generation += 1;
    }
}

impl Actor for TrackingEngine {
    fn started(&mut self, myself: WeakActorRef<Self>) {
        self.myself = Some(myself);
    }

    fn stopped(&mut self) {
        self.stop_ticker();
        if let Some(fetch) = self.fetch.take() {
            fetch.abort();
        }
        if self.updating {
            self.location.stop_updating();
            self.updating = false;
        }
        log::info!("tracking engine stopped");
    }
}

pub struct Start;

impl Message for Start {
    type Response = ();
}

pub struct AuthorizationChanged(pub Authorization);

impl Message for AuthorizationChanged {
    type Response = ();
}

pub struct LocationChanged(pub Coordinate);

impl Message for LocationChanged {
    type Response = ();
}

pub struct RosterFetched(pub Result<Vec<DriverRecord>, FetchError>);

impl Message for RosterFetched {
    type Response = ();
}

pub struct Tick {
    pub timer: u64,
}

impl Message for Tick {
    type Response = ();
}

pub struct SelectDriver(pub Option<Id<Driver>>);

impl Message for SelectDriver {
    type Response = Presented;
}

pub struct SelectAnnotation(pub Id<Annotation>);

impl Message for SelectAnnotation {
    type Response = Presented;
}

pub struct GetPhase;

impl Message for GetPhase {
    type Response = Phase;
}

#[async_trait]
impl Handler<Start> for TrackingEngine {
    async fn handle(&mut self, _: Start) {
        self.start();
    }
}

#[async_trait]
impl Handler<AuthorizationChanged> for TrackingEngine {
    async fn handle(&mut self, message: AuthorizationChanged) {
        self.on_authorization(message.0);
    }
}

#[async_trait]
impl Handler<LocationChanged> for TrackingEngine {
    async fn handle(&mut self, message: LocationChanged) {
        self.on_fix(message.0);
    }
}

#[async_trait]
impl Handler<RosterFetched> for TrackingEngine {
    async fn handle(&mut self, message: RosterFetched) {
        self.on_roster_fetched(message.0);
    }
}

#[async_trait]
impl Handler<Tick> for TrackingEngine {
    async fn handle(&mut self, message: Tick) {
        self.on_tick(message.timer);
    }
}

#[async_trait]
impl Handler<SelectDriver> for TrackingEngine {
    async fn handle(&mut self, message: SelectDriver) -> Presented {
        self.present(message.0)
    }
}

#[async_trait]
impl Handler<SelectAnnotation> for TrackingEngine {
    async fn handle(&mut self, message: SelectAnnotation) -> Presented {
        self.present_annotation(message.0)
    }
}

#[async_trait]
impl Handler<GetPhase> for TrackingEngine {
    async fn handle(&mut self, _: GetPhase) -> Phase {
        self.phase
    }
}
