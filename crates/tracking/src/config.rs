use std::time::Duration;

use utility::geo::DEGREES_PER_METER;

/// Range of the random displacement applied to every driver, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerturbationBounds {
    min_meters: u32,
    max_meters: u32,
}

impl PerturbationBounds {
    /// Bounds are reordered if given backwards; a zero minimum is raised to
    /// one meter so a driver always moves.
    pub fn new(min_meters: u32, max_meters: u32) -> Self {
        let (low, high) = if min_meters <= max_meters {
            (min_meters, max_meters)
        } else {
            (max_meters, min_meters)
        };
        Self {
            min_meters: low.max(1),
            max_meters: high.max(1),
        }
    }

    pub fn min_meters(&self) -> u32 {
        self.min_meters
    }

    pub fn max_meters(&self) -> u32 {
        self.max_meters
    }

    /// Largest offset on either axis a displacement can produce.
    pub fn max_degrees(&self) -> f64 {
        f64::from(self.max_meters) * DEGREES_PER_METER
    }
}

impl Default for PerturbationBounds {
    fn default() -> Self {
        Self::new(100, 300)
    }
}

#[derive(Debug, Clone)]
pub struct TrackingConfig {
    /// Cadence of the repositioning timer, restarted on every location fix.
    pub tick_period: Duration,
    pub perturbation: PerturbationBounds,
    /// Fixed seed for reproducible driver positions. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            tick_period: Duration::from_secs(5),
            perturbation: PerturbationBounds::default(),
            seed: None,
        }
    }
}
