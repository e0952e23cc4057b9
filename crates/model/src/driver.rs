use serde::{Deserialize, Serialize};
use utility::geo::Coordinate;
use utility::id::{HasId, Id};

fn default_name() -> String {
    "User".to_owned()
}

fn generated_id() -> Id<Driver> {
    Id::generate()
}

/// One record of the roster payload: `{"id": .., "name": .., "image": ..}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverRecord {
    #[serde(default = "generated_id")]
    pub id: Id<Driver>,
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// Map handle of a driver. Carries the same raw id as its driver so a pin
/// can be traced back without holding the driver itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    id: Id<Annotation>,
    pub coordinate: Coordinate,
}

impl HasId for Annotation {
    type IdType = String;
}

impl Annotation {
    pub fn id(&self) -> &Id<Annotation> {
        &self.id
    }
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    id: Id<Driver>,
    name: String,
    photo_ref: Option<String>,
    annotation: Annotation,
}

impl HasId for Driver {
    type IdType = String;
}

impl Driver {
    /// Creates the driver together with its annotation at `position`.
    pub fn new(record: DriverRecord, position: Coordinate) -> Self {
        let annotation = Annotation {
            id: record.id.clone().cast(),
            coordinate: position,
        };
        Self {
            id: record.id,
            name: record.name,
            photo_ref: record.image.filter(|image| !image.is_empty()),
            annotation,
        }
    }

    pub fn id(&self) -> &Id<Driver> {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `None` means the placeholder portrait should be shown.
    pub fn photo_ref(&self) -> Option<&str> {
        self.photo_ref.as_deref()
    }

    pub fn annotation(&self) -> &Annotation {
        &self.annotation
    }

    pub fn position(&self) -> Coordinate {
        self.annotation.coordinate
    }

    pub fn move_to(&mut self, position: Coordinate) {
        self.annotation.coordinate = position;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_defaults_fill_missing_fields() {
        let record: DriverRecord = serde_json::from_str("{}").unwrap();
        assert_eq!(record.name, "User");
        assert_eq!(record.image, None);
        assert_eq!(record.id.raw().len(), 36);
    }

    #[test]
    fn record_accepts_null_image() {
        let record: DriverRecord =
            serde_json::from_str(r#"{"id":"driver-1","name":"Ana","image":null}"#)
                .unwrap();
        assert_eq!(record.id, Id::new("driver-1".to_owned()));
        assert_eq!(record.name, "Ana");
        assert_eq!(record.image, None);
    }

    #[test]
    fn annotation_shares_driver_id() {
        let record = DriverRecord {
            id: Id::new("driver-2".to_owned()),
            name: "Bo".to_owned(),
            image: Some("https://example.com/bo.png".to_owned()),
        };
        let driver = Driver::new(record, Coordinate::new(1.0, 2.0));
        assert_eq!(driver.annotation().id().raw_ref::<str>(), "driver-2");
        assert_eq!(driver.photo_ref(), Some("https://example.com/bo.png"));
        assert_eq!(driver.position(), Coordinate::new(1.0, 2.0));
    }

    #[test]
    fn empty_image_means_placeholder() {
        let record = DriverRecord {
            id: Id::new("driver-3".to_owned()),
            name: "Cy".to_owned(),
            image: Some(String::new()),
        };
        let driver = Driver::new(record, Coordinate::new(0.0, 0.0));
        assert_eq!(driver.photo_ref(), None);
    }

    #[test]
    fn move_to_keeps_identity() {
        let record = DriverRecord {
            id: Id::new("driver-4".to_owned()),
            name: "Di".to_owned(),
            image: None,
        };
        let mut driver = Driver::new(record, Coordinate::new(0.0, 0.0));
        driver.move_to(Coordinate::new(0.5, 0.5));
        assert_eq!(driver.id().raw_ref::<str>(), "driver-4");
        assert_eq!(driver.annotation().coordinate, Coordinate::new(0.5, 0.5));
    }
}
