use std::sync::Arc;

use utility::id::Id;

use crate::Driver;

/// Read-only snapshot of the roster as published to observers.
///
/// `generation` counts wholesale replacements (fetches), `revision` counts
/// every publish including repositioning ticks.
#[derive(Debug, Clone, PartialEq)]
pub struct Roster {
    pub generation: u64,
    pub revision: u64,
    drivers: Arc<[Driver]>,
}

impl Roster {
    pub fn new(generation: u64, revision: u64, drivers: Vec<Driver>) -> Self {
        Self {
            generation,
            revision,
            drivers: drivers.into(),
        }
    }

    pub fn drivers(&self) -> &[Driver] {
        &self.drivers
    }

    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }

    pub fn get(&self, id: &Id<Driver>) -> Option<&Driver> {
        self.drivers.iter().find(|driver| driver.id() == id)
    }
}
