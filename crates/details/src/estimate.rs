use std::time::Duration;

use async_trait::async_trait;
use utility::geo::Coordinate;

use crate::{DetailResult, Route, RouteLookup};

/// Urban driving speed used when no routing service is configured.
pub const DEFAULT_SPEED_KMH: f64 = 30.0;

/// Estimates routes as the great circle between both points, driven at a
/// constant speed.
#[derive(Debug, Clone, Copy)]
pub struct StraightLineRoutes {
    meters_per_second: f64,
}

impl StraightLineRoutes {
    pub fn new(speed_kmh: f64) -> Self {
        Self {
            meters_per_second: speed_kmh.max(1.0) / 3.6,
        }
    }

    pub fn estimate(&self, from: Coordinate, to: Coordinate) -> Route {
        let distance_meters = from.distance_km(&to) * 1000.0;
        Route {
            distance_meters,
            travel_time: Duration::from_secs_f64(distance_meters / self.meters_per_second),
        }
    }
}

impl Default for StraightLineRoutes {
    fn default() -> Self {
        Self::new(DEFAULT_SPEED_KMH)
    }
}

#[async_trait]
impl RouteLookup for StraightLineRoutes {
    async fn route(&self, from: Coordinate, to: Coordinate) -> DetailResult<Route> {
        Ok(self.estimate(from, to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_point_takes_no_time() {
        let here = Coordinate::new(37.785834, -122.406417);
        let route = StraightLineRoutes::default().estimate(here, here);
        assert_eq!(route.distance_meters, 0.0);
        assert!(route.travel_time.is_zero());
    }

    #[test]
    fn one_kilometer_at_thirty() {
        let from = Coordinate::new(0.0, 0.0);
        // 1 km of latitude
        let to = Coordinate::new(1.0 / 111.195, 0.0);
        let route = StraightLineRoutes::new(30.0).estimate(from, to);
        assert!((route.distance_meters - 1000.0).abs() < 1.0);
        let seconds = route.travel_time.as_secs_f64();
        assert!((seconds - 120.0).abs() < 1.0, "{seconds}");
    }
}
