use std::{error::Error, process, sync::Arc};

use details::{
    DetailService, HttpAddressLookup, HttpImageSource, PhotoCache, StraightLineRoutes,
};
use futures::StreamExt;
use model::{Driver, Presented};
use sheetdb::SheetDbGateway;
use tracking::{LocationProvider, SessionBuilder};
use utility::{geo::Coordinate, id::Id};

use settings::Settings;
use simulated::SimulatedLocation;

mod settings;
mod simulated;

#[tokio::main]
async fn main() {
    env_logger::init();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(why) => {
            log::error!("{why}");
            process::exit(1);
        }
    };

    if let Err(why) = run(settings).await {
        log::error!("{why}");
        process::exit(1);
    }
}

async fn run(settings: Settings) -> Result<(), Box<dyn Error>> {
    // collaborators
    let location = Arc::new(SimulatedLocation::new(settings.start, settings.walk_period));
    let gateway = Arc::new(SheetDbGateway::new(settings.server_url.clone()));
    let details = Arc::new(DetailService::new(
        Arc::new(HttpAddressLookup::new(settings.geocoder_url.clone())?),
        Arc::new(StraightLineRoutes::default()),
        Arc::new(HttpImageSource::default()),
        Arc::new(PhotoCache::new()),
    ));

    // tracking
    let session = SessionBuilder::new(settings.tracking.clone())
        .on_self_location(|fix| log::debug!("device moved to {fix}"))
        .start(location.clone(), gateway)
        .await?;
    log::info!("tracking session started");

    let mut rosters = session.roster_stream();
    let mut presented = session.presented_stream();
    let mut rosters_open = true;
    let mut selected = false;
    let mut described: Option<Id<Driver>> = None;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                log::info!("shutting down");
                break;
            }
            roster = rosters.next(), if rosters_open => match roster {
                Some(Ok(roster)) => {
                    log::info!(
                        "roster revision {} with {} drivers",
                        roster.revision,
                        roster.len()
                    );
                    for driver in roster.drivers() {
                        log::debug!("  {} {} at {}", driver.id(), driver.name(), driver.position());
                    }
                    if !selected {
                        if let Some(first) = roster.drivers().first() {
                            session.select_driver(Some(first.id().clone())).await?;
                            selected = true;
                        }
                    }
                }
                Some(Err(why)) => log::error!("could not load drivers: {why}"),
                None => rosters_open = false,
            },
            Some(current) = presented.next() => {
                log::debug!("presented: {}", serde_json::to_string(&current)?);
                match current {
                    Presented::SelfDriver(me) => {
                        described = None;
                        if let Some(position) = me.position {
                            log::info!("presenting the device at {position}");
                        }
                    }
                    Presented::Driver(driver) => {
                        log::info!("presenting {} at {}", driver.name(), driver.position());
                        if described.as_ref() != Some(driver.id()) {
                            described = Some(driver.id().clone());
                            tokio::spawn(describe(
                                details.clone(),
                                driver,
                                location.last_known(),
                            ));
                        }
                    }
                }
            }
        }
    }

    session.shutdown().await;
    log::info!("tracking session stopped");
    Ok(())
}

async fn describe(
    details: Arc<DetailService>,
    driver: Driver,
    from: Option<Coordinate>,
) {
    let card = details.details(&driver, from).await;
    let photo = if card.photo.is_placeholder() {
        "placeholder photo"
    } else {
        "photo loaded"
    };
    log::info!("{}: {} | {} | {}", card.name, card.address, card.eta, photo);
}
