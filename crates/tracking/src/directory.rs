use indexmap::IndexMap;
use model::{Driver, DriverRecord, Roster};
use utility::{geo::Coordinate, id::Id};

use crate::FetchError;

/// The authoritative roster. Insertion order is fetch order.
#[derive(Debug, Default)]
pub struct DriverDirectory {
    generation: u64,
    revision: u64,
    drivers: IndexMap<Id<Driver>, Driver>,
}

impl DriverDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole roster with `records`, placing each new driver at
    /// `place()`. Nothing changes if the records are rejected.
    pub fn replace<F>(
        &mut self,
        records: Vec<DriverRecord>,
        mut place: F,
    ) -> Result<(), FetchError>
    where
        F: FnMut() -> Coordinate,
    {
        let mut drivers = IndexMap::with_capacity(records.len());
        for record in records {
            if drivers.contains_key(&record.id) {
                return Err(FetchError::DuplicateDriver(record.id.raw()));
            }
            let driver = Driver::new(record, place());
            drivers.insert(driver.id().clone(), driver);
        }
        self.drivers = drivers;
        self.generation += 1;
        self.revision += 1;
        Ok(())
    }

    /// Moves every driver to `place(driver)`. Identities are untouched.
    pub fn reposition<F>(&mut self, mut place: F)
    where
        F: FnMut(&Driver) -> Coordinate,
    {
        for driver in self.drivers.values_mut() {
            let position = place(driver);
            driver.move_to(position);
        }
        self.revision += 1;
    }

    pub fn get(&self, id: &Id<Driver>) -> Option<&Driver> {
        self.drivers.get(id)
    }

    pub fn drivers(&self) -> impl Iterator<Item = &Driver> {
        self.drivers.values()
    }

    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn snapshot(&self) -> Roster {
        Roster::new(
            self.generation,
            self.revision,
            self.drivers.values().cloned().collect(),
        )
    }
}
