//! Tri-state entity fields.
//!
//! YouTrack write payloads distinguish a field that was never touched from a
//! field explicitly set to `null` (e.g. unassigning a ticket). `Opt` models
//! both alongside a concrete value, so entities can double as read models and
//! partial update payloads.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A field that is either absent from the payload, explicitly `null`, or set.
///
/// Serialization emits `null` for [`Opt::Null`] and the value for
/// [`Opt::Set`]; [`Opt::Unset`] fields are skipped entirely via
/// `#[serde(skip_serializing_if = "Opt::is_unset")]` on the entity structs.
/// Deserialization maps a missing key to `Unset` (through `#[serde(default)]`)
/// and a JSON `null` to `Null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opt<T> {
    /// The field is not part of the payload.
    Unset,
    /// The field is explicitly `null`.
    Null,
    /// The field holds a value.
    Set(T),
}

impl<T> Opt<T> {
    /// Returns `true` if the field is absent from the payload.
    pub fn is_unset(&self) -> bool {
        matches!(self, Opt::Unset)
    }

    /// Returns `true` if the field is explicitly `null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Opt::Null)
    }

    /// Returns `true` if the field holds a value.
    pub fn is_set(&self) -> bool {
        matches!(self, Opt::Set(_))
    }

    /// Borrows the value, if set.
    pub fn value(&self) -> Option<&T> {
        match self {
            Opt::Set(value) => Some(value),
            _ => None,
        }
    }

    /// Consumes the field and returns the value, if set.
    pub fn into_value(self) -> Option<T> {
        match self {
            Opt::Set(value) => Some(value),
            _ => None,
        }
    }

    /// Maps the contained value, preserving `Unset`/`Null`.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Opt<U> {
        match self {
            Opt::Unset => Opt::Unset,
            Opt::Null => Opt::Null,
            Opt::Set(value) => Opt::Set(f(value)),
        }
    }

    /// Borrowing view of the field.
    pub fn as_ref(&self) -> Opt<&T> {
        match self {
            Opt::Unset => Opt::Unset,
            Opt::Null => Opt::Null,
            Opt::Set(value) => Opt::Set(value),
        }
    }
}

impl<T> Default for Opt<T> {
    fn default() -> Self {
        Opt::Unset
    }
}

impl<T> From<T> for Opt<T> {
    fn from(value: T) -> Self {
        Opt::Set(value)
    }
}

impl<T> From<Option<T>> for Opt<T> {
    /// `Some` becomes `Set`, `None` becomes `Null` (an intentional value).
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Opt::Set(value),
            None => Opt::Null,
        }
    }
}

impl From<&str> for Opt<String> {
    fn from(value: &str) -> Self {
        Opt::Set(value.to_string())
    }
}

impl<T: Serialize> Serialize for Opt<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            // Unset fields are skipped by the entity structs; if one is
            // serialized anyway it degrades to `null`.
            Opt::Unset | Opt::Null => serializer.serialize_none(),
            Opt::Set(value) => value.serialize(serializer),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Opt<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<T>::deserialize(deserializer)?.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Payload {
        #[serde(default, skip_serializing_if = "Opt::is_unset")]
        summary: Opt<String>,
        #[serde(default, skip_serializing_if = "Opt::is_unset")]
        count: Opt<i64>,
    }

    #[test]
    fn test_unset_fields_are_skipped() {
        let payload = Payload {
            summary: Opt::Set("Title".to_string()),
            count: Opt::Unset,
        };
        assert_eq!(
            serde_json::to_string(&payload).unwrap(),
            r#"{"summary":"Title"}"#
        );
    }

    #[test]
    fn test_null_fields_are_kept() {
        let payload = Payload {
            summary: Opt::Null,
            count: Opt::Set(5),
        };
        assert_eq!(
            serde_json::to_string(&payload).unwrap(),
            r#"{"summary":null,"count":5}"#
        );
    }

    #[test]
    fn test_missing_key_deserializes_to_unset() {
        let payload: Payload = serde_json::from_str(r#"{"count":3}"#).unwrap();
        assert_eq!(payload.summary, Opt::Unset);
        assert_eq!(payload.count, Opt::Set(3));
    }

    #[test]
    fn test_null_deserializes_to_null() {
        let payload: Payload = serde_json::from_str(r#"{"summary":null}"#).unwrap();
        assert_eq!(payload.summary, Opt::Null);
        assert_eq!(payload.count, Opt::Unset);
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Opt::<i64>::from(None), Opt::Null);
        assert_eq!(Opt::from(Some(1)), Opt::Set(1));
    }

    #[test]
    fn test_value_accessors() {
        let set: Opt<i64> = Opt::Set(7);
        assert_eq!(set.value(), Some(&7));
        assert!(set.is_set());
        assert!(!set.is_unset());

        let unset: Opt<i64> = Opt::Unset;
        assert_eq!(unset.value(), None);
        assert!(unset.is_unset());

        let null: Opt<i64> = Opt::Null;
        assert!(null.is_null());
        assert_eq!(null.into_value(), None);
    }

    #[test]
    fn test_map_preserves_state() {
        assert_eq!(Opt::Set(2).map(|v| v * 2), Opt::Set(4));
        assert_eq!(Opt::<i64>::Null.map(|v| v * 2), Opt::Null);
        assert_eq!(Opt::<i64>::Unset.map(|v| v * 2), Opt::Unset);
    }
}
