use rand::{rngs::SmallRng, Rng, SeedableRng};
use utility::geo::{self, Coordinate, VARIANT_COUNT};

use crate::config::PerturbationBounds;

/// Displaces `origin` by a random whole number of meters within `bounds`.
///
/// `variant` picks the direction (see [`geo::displace`]); `None` draws one
/// of the seven uniformly. The only state touched is the caller's `rng`.
pub fn perturb<R: Rng>(
    rng: &mut R,
    bounds: PerturbationBounds,
    origin: Coordinate,
    variant: Option<u8>,
) -> Coordinate {
    let meters = rng.gen_range(bounds.min_meters()..=bounds.max_meters());
    let variant = variant.unwrap_or_else(|| rng.gen_range(0..VARIANT_COUNT));
    geo::displace(origin, variant, f64::from(meters))
}

/// Owns the random source used to scatter drivers around a location fix.
pub struct PositionGenerator {
    bounds: PerturbationBounds,
    rng: SmallRng,
}

impl PositionGenerator {
    pub fn new(bounds: PerturbationBounds, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self { bounds, rng }
    }

    pub fn perturb(&mut self, origin: Coordinate, variant: Option<u8>) -> Coordinate {
        perturb(&mut self.rng, self.bounds, origin, variant)
    }

    /// A random position around `origin` that differs from `current`.
    pub fn relocate(&mut self, origin: Coordinate, current: Coordinate) -> Coordinate {
        // at least six of the seven directions land on distinct points
        loop {
            let position = self.perturb(origin, None);
            if position != current {
                return position;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIX: Coordinate = Coordinate {
        latitude: 37.785834,
        longitude: -122.406417,
    };

    fn offset(moved: Coordinate) -> (f64, f64) {
        (moved.latitude - FIX.latitude, moved.longitude - FIX.longitude)
    }

    #[test]
    fn stays_within_bounds() {
        let bounds = PerturbationBounds::default();
        let mut generator = PositionGenerator::new(bounds, Some(7));
        let min = f64::from(bounds.min_meters()) * geo::DEGREES_PER_METER;
        for _ in 0..1_000 {
            let (dlat, dlon) = offset(generator.perturb(FIX, None));
            let largest = dlat.abs().max(dlon.abs());
            assert!(largest <= bounds.max_degrees() + 1e-12);
            assert!(largest >= min - 1e-12);
        }
    }

    #[test]
    fn variant_fixes_direction_sign() {
        let mut generator = PositionGenerator::new(PerturbationBounds::default(), Some(11));
        for _ in 0..50 {
            let (dlat, dlon) = offset(generator.perturb(FIX, Some(2)));
            assert!(dlat > 0.0);
            assert!(dlon < 0.0);

            let (dlat, dlon) = offset(generator.perturb(FIX, Some(5)));
            assert!(dlat < 0.0);
            assert_eq!(dlon, 0.0);
        }
    }

    #[test]
    fn fixed_magnitude_is_deterministic() {
        let bounds = PerturbationBounds::new(250, 250);
        let mut generator = PositionGenerator::new(bounds, None);
        for variant in 0..VARIANT_COUNT {
            let first = generator.perturb(FIX, Some(variant));
            let second = generator.perturb(FIX, Some(variant));
            assert_eq!(first, second);
            assert_ne!(first, FIX);
        }
    }

    #[test]
    fn relocate_never_returns_the_current_position() {
        let mut generator = PositionGenerator::new(PerturbationBounds::new(100, 100), Some(1));
        let mut current = generator.perturb(FIX, None);
        for _ in 0..2_000 {
            let next = generator.relocate(FIX, current);
            assert_ne!(next, current);
            current = next;
        }
    }

    #[test]
    fn same_seed_same_scatter() {
        let mut a = PositionGenerator::new(PerturbationBounds::default(), Some(42));
        let mut b = PositionGenerator::new(PerturbationBounds::default(), Some(42));
        for _ in 0..20 {
            assert_eq!(a.perturb(FIX, None), b.perturb(FIX, None));
        }
    }
}
