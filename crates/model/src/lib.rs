pub use serde_with;

pub mod driver;
pub mod presented;
pub mod roster;

pub use driver::{Annotation, Driver, DriverRecord};
pub use presented::{Presented, SelfDriver};
pub use roster::Roster;
