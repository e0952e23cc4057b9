use std::{fmt, hash, marker::PhantomData};

use rand::Rng;
use serde::{Deserialize, Serialize};

pub trait HasId {
    type IdType;
}

/// Identifier tagged with the type it identifies, so a driver id can not be
/// passed where an annotation id is expected.
pub struct Id<T: HasId>(T::IdType, PhantomData<T>);

impl<T: HasId> Id<T> {
    pub fn new(inner: T::IdType) -> Self {
        Self(inner, PhantomData)
    }

    /// Re-tags the raw value for another type with the same id representation.
    pub fn cast<U>(self) -> Id<U>
    where
        U: HasId<IdType = T::IdType>,
    {
        Id::new(self.0)
    }
}

impl<T: HasId> Id<T>
where
    T::IdType: Clone,
{
    pub fn raw(&self) -> T::IdType {
        self.0.clone()
    }

    pub fn raw_ref<'a, R>(&'a self) -> &'a R
    where
        T::IdType: AsRef<R>,
        R: ?Sized,
    {
        self.0.as_ref()
    }
}

impl<T: HasId> Id<T>
where
    T::IdType: From<String>,
{
    /// Random 128 bit identifier in the usual 8-4-4-4-12 hex grouping.
    pub fn generate() -> Self {
        let bits: u128 = rand::thread_rng().gen();
        let hex = format!("{:032X}", bits);
        let inner = format!(
            "{}-{}-{}-{}-{}",
            &hex[0..8],
            &hex[8..12],
            &hex[12..16],
            &hex[16..20],
            &hex[20..32]
        );
        Self::new(inner.into())
    }
}

impl<T: HasId> fmt::Debug for Id<T>
where
    T::IdType: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Id").field(&self.0).finish()
    }
}

impl<T: HasId> fmt::Display for Id<T>
where
    T::IdType: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<T: HasId> Clone for Id<T>
where
    T::IdType: Clone,
{
    fn clone(&self) -> Self {
        Self(self.0.clone(), PhantomData)
    }
}

impl<T: HasId> Copy for Id<T> where T::IdType: Copy {}

impl<T: HasId> hash::Hash for Id<T>
where
    T::IdType: hash::Hash,
{
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

impl<T: HasId> PartialEq for Id<T>
where
    T::IdType: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0.eq(&other.0)
    }
}

impl<T: HasId> Eq for Id<T> where T::IdType: Eq {}

impl<'de, T: HasId> Deserialize<'de> for Id<T>
where
    T::IdType: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        T::IdType::deserialize(deserializer).map(|id| Id::new(id))
    }
}

impl<T: HasId> Serialize for Id<T>
where
    T::IdType: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    struct Thing;

    impl HasId for Thing {
        type IdType = String;
    }

    struct Other;

    impl HasId for Other {
        type IdType = String;
    }

    #[test]
    fn generated_ids_are_grouped_hex() {
        let id = Id::<Thing>::generate().raw();
        let groups = id.split('-').map(str::len).collect::<Vec<_>>();
        assert_eq!(groups, vec![8, 4, 4, 4, 12]);
        assert!(id.chars().all(|c| c == '-' || c.is_ascii_hexdigit()));
    }

    #[test]
    fn generated_ids_do_not_repeat() {
        let ids = (0..256)
            .map(|_| Id::<Thing>::generate())
            .collect::<HashSet<_>>();
        assert_eq!(ids.len(), 256);
    }

    #[test]
    fn cast_keeps_raw_value() {
        let id = Id::<Thing>::new("driver-1".to_owned());
        let other: Id<Other> = id.clone().cast();
        assert_eq!(other.raw_ref::<str>(), id.raw_ref::<str>());
    }

    #[test]
    fn serializes_transparently() {
        let id = Id::<Thing>::new("driver-7".to_owned());
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""driver-7""#);
        let back: Id<Thing> = serde_json::from_str(r#""driver-7""#).unwrap();
        assert_eq!(back, id);
    }
}
