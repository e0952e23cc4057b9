use std::{env, error, fmt, str::FromStr, time::Duration};

use tracking::{PerturbationBounds, TrackingConfig};
use utility::geo::Coordinate;

/// Where the simulated device starts when nothing is configured.
pub const DEFAULT_START: Coordinate = Coordinate {
    latitude: 37.785834,
    longitude: -122.406417,
};

pub const DEFAULT_WALK: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    Missing(&'static str),
    Invalid { name: &'static str, value: String },
}

impl error::Error for SettingsError {}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SettingsError::Missing(name) => write!(f, "Expected {name} in env."),
            SettingsError::Invalid { name, value } => {
                write!(f, "Invalid value for {name}: '{value}'")
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub server_url: String,
    pub geocoder_url: String,
    pub tracking: TrackingConfig,
    pub start: Coordinate,
    pub walk_period: Duration,
}

impl Settings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let var = |name| Var {
            name,
            value: lookup(name).filter(|value| !value.trim().is_empty()),
        };

        let server_url = var("SERVER_URL")
            .value
            .ok_or(SettingsError::Missing("SERVER_URL"))?;
        let geocoder_url = var("GEOCODER_URL")
            .value
            .unwrap_or_else(|| details::http::NOMINATIM_URL.to_owned());

        let mut tracking = TrackingConfig::default();
        if let Some(seconds) = var("TICK_SECONDS").parse::<u64>()? {
            tracking.tick_period = Duration::from_secs(seconds.max(1));
        }
        let defaults = PerturbationBounds::default();
        tracking.perturbation = PerturbationBounds::new(
            var("PERTURB_MIN_METERS")
                .parse()?
                .unwrap_or(defaults.min_meters()),
            var("PERTURB_MAX_METERS")
                .parse()?
                .unwrap_or(defaults.max_meters()),
        );
        tracking.seed = var("RNG_SEED").parse()?;

        let start = Coordinate::new(
            var("START_LATITUDE")
                .parse()?
                .unwrap_or(DEFAULT_START.latitude),
            var("START_LONGITUDE")
                .parse()?
                .unwrap_or(DEFAULT_START.longitude),
        );
        let walk_period = var("WALK_SECONDS")
            .parse::<u64>()?
            .map(|seconds| Duration::from_secs(seconds.max(1)))
            .unwrap_or(DEFAULT_WALK);

        Ok(Self {
            server_url,
            geocoder_url,
            tracking,
            start,
            walk_period,
        })
    }
}

struct Var {
    name: &'static str,
    value: Option<String>,
}

impl Var {
    fn parse<T: FromStr>(self) -> Result<Option<T>, SettingsError> {
        match self.value {
            None => Ok(None),
            Some(value) => match value.trim().parse() {
                Ok(parsed) => Ok(Some(parsed)),
                Err(_) => Err(SettingsError::Invalid {
                    name: self.name,
                    value,
                }),
            },
        }
    }
}
