use std::collections::HashMap;

use model::{Annotation, Driver, Presented, SelfDriver};
use tokio::sync::watch;
use utility::id::Id;

use crate::directory::DriverDirectory;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    SelfDriver,
    Driver(Id<Driver>),
}

/// Tracks which driver is presented and publishes it on an always-current
/// channel. A selection never refers to an id missing from the directory.
pub struct SelectionController {
    current: Selection,
    annotations: HashMap<Id<Annotation>, Id<Driver>>,
    presented: watch::Sender<Presented>,
}

impl SelectionController {
    pub fn new() -> Self {
        let (presented, _) = watch::channel(Presented::default());
        Self {
            current: Selection::SelfDriver,
            annotations: HashMap::new(),
            presented,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Presented> {
        self.presented.subscribe()
    }

    pub fn current(&self) -> &Selection {
        &self.current
    }

    /// Selects `id`, or the user when `id` is `None` or not in `directory`.
    /// The result is published before it is returned.
    pub fn present(
        &mut self,
        id: Option<&Id<Driver>>,
        directory: &DriverDirectory,
        me: &SelfDriver,
    ) -> Presented {
        let driver = id.and_then(|id| directory.get(id));
        match (id, driver) {
            (_, Some(driver)) => {
                self.current = Selection::Driver(driver.id().clone());
                self.publish(Presented::Driver(driver.clone()))
            }
            (Some(missing), None) => {
                log::debug!("driver {} is not in the roster, presenting self", missing);
                self.present_self(me)
            }
            (None, None) => self.present_self(me),
        }
    }

    /// Like [`present`](Self::present), resolving a map annotation first.
    pub fn present_annotation(
        &mut self,
        annotation: &Id<Annotation>,
        directory: &DriverDirectory,
        me: &SelfDriver,
    ) -> Presented {
        let driver = self.annotations.get(annotation).cloned();
        if driver.is_none() {
            log::debug!("annotation {} belongs to no driver", annotation);
        }
        self.present(driver.as_ref(), directory, me)
    }

    /// Rebuilds the annotation table after the roster was replaced and drops
    /// a selection whose driver is gone.
    pub fn reindex(&mut self, directory: &DriverDirectory, me: &SelfDriver) {
        self.annotations = directory
            .drivers()
            .map(|driver| (driver.annotation().id().clone(), driver.id().clone()))
            .collect();
        self.refresh(directory, me);
    }

    /// Republishes the selected driver with its current state. Called after
    /// every reposition; does nothing while the user is presented.
    pub fn refresh(&mut self, directory: &DriverDirectory, me: &SelfDriver) {
        if let Selection::Driver(id) = &self.current {
            match directory.get(id) {
                Some(driver) => {
                    self.publish(Presented::Driver(driver.clone()));
                }
                None => {
                    log::debug!("selected driver {} left the roster", id);
                    self.present_self(me);
                }
            }
        }
    }

    /// Republishes the user after the device location changed, if the user
    /// is what is presented.
    pub fn refresh_self(&mut self, me: &SelfDriver) {
        if self.current == Selection::SelfDriver {
            self.publish(Presented::SelfDriver(me.clone()));
        }
    }

    fn present_self(&mut self, me: &SelfDriver) -> Presented {
        self.current = Selection::SelfDriver;
        self.publish(Presented::SelfDriver(me.clone()))
    }

    fn publish(&self, presented: Presented) -> Presented {
        self.presented.send_replace(presented.clone());
        presented
    }
}

impl Default for SelectionController {
    fn default() -> Self {
        Self::new()
    }
}
