use serde::Serialize;
use utility::geo::Coordinate;
use utility::id::Id;

use crate::Driver;

/// The user, shown on the "presented" stream whenever no driver is selected.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelfDriver {
    /// Latest known device location, if any fix has arrived yet.
    pub position: Option<Coordinate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Presented {
    SelfDriver(SelfDriver),
    Driver(Driver),
}

impl Default for Presented {
    fn default() -> Self {
        Self::SelfDriver(SelfDriver::default())
    }
}

impl Presented {
    pub fn is_self(&self) -> bool {
        matches!(self, Self::SelfDriver(_))
    }

    pub fn driver(&self) -> Option<&Driver> {
        match self {
            Self::Driver(driver) => Some(driver),
            Self::SelfDriver(_) => None,
        }
    }

    pub fn driver_id(&self) -> Option<&Id<Driver>> {
        self.driver().map(Driver::id)
    }

    pub fn position(&self) -> Option<Coordinate> {
        match self {
            Self::Driver(driver) => Some(driver.position()),
            Self::SelfDriver(me) => me.position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DriverRecord;

    #[test]
    fn default_is_self_without_position() {
        let presented = Presented::default();
        assert!(presented.is_self());
        assert_eq!(presented.position(), None);
        assert_eq!(presented.driver_id(), None);
    }

    #[test]
    fn serializes_with_kind_tag() {
        let me = Presented::SelfDriver(SelfDriver {
            position: Some(Coordinate::new(1.0, 2.0)),
        });
        let json = serde_json::to_value(&me).unwrap();
        assert_eq!(json["kind"], "selfDriver");
        assert_eq!(json["position"]["latitude"], 1.0);

        let driver = Driver::new(
            DriverRecord {
                id: Id::new("driver-1".to_owned()),
                name: "Ana".to_owned(),
                image: None,
            },
            Coordinate::new(3.0, 4.0),
        );
        let json = serde_json::to_value(Presented::Driver(driver)).unwrap();
        assert_eq!(json["kind"], "driver");
        assert_eq!(json["id"], "driver-1");
        assert!(json.get("photoRef").is_none());
    }
}
