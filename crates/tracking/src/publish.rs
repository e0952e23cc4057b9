use model::Roster;
use tokio::sync::watch;
use utility::geo::Coordinate;

use crate::FetchError;

/// Value of the roster channel.
#[derive(Debug, Clone)]
pub enum RosterUpdate {
    /// No roster yet.
    Pending,
    Ready(Roster),
    /// The fetch failed; nothing else is published for this session.
    Failed(FetchError),
}

impl RosterUpdate {
    pub fn roster(&self) -> Option<&Roster> {
        match self {
            RosterUpdate::Ready(roster) => Some(roster),
            _ => None,
        }
    }

    pub fn revision(&self) -> Option<u64> {
        self.roster().map(|roster| roster.revision)
    }
}

pub type SelfLocationCallback = Box<dyn Fn(Coordinate) + Send + Sync>;

/// Outbound side of the engine: the roster channel and the self-location
/// callback.
pub struct Publisher {
    roster: watch::Sender<RosterUpdate>,
    on_self_location: Option<SelfLocationCallback>,
}

impl Publisher {
    pub fn new(on_self_location: Option<SelfLocationCallback>) -> Self {
        let (roster, _) = watch::channel(RosterUpdate::Pending);
        Self {
            roster,
            on_self_location,
        }
    }

    pub fn subscribe_roster(&self) -> watch::Receiver<RosterUpdate> {
        self.roster.subscribe()
    }

    pub fn roster(&self, roster: Roster) {
        self.roster.send_replace(RosterUpdate::Ready(roster));
    }

    pub fn roster_failed(&self, why: FetchError) {
        self.roster.send_replace(RosterUpdate::Failed(why));
    }

    pub fn self_location(&self, position: Coordinate) {
        if let Some(callback) = &self.on_self_location {
            callback(position);
        }
    }
}
