//! Tri-state field for merge-patch request bodies.

use serde::{Deserialize, Deserializer};

/// A field of a merge-patch document.
///
/// Use with `#[serde(default)]` so that a key missing from the document
/// deserializes to `Absent` while an explicit `null` becomes `Null`.
#[derive(Debug, Clone, PartialEq)]
pub enum Patch<T> {
    Absent,
    Null,
    Value(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Absent
    }
}

impl<T> Patch<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Patch<U> {
        match self {
            Patch::Absent => Patch::Absent,
            Patch::Null => Patch::Null,
            Patch::Value(v) => Patch::Value(f(v)),
        }
    }

    /// Overwrite `target` when a value was supplied. Returns whether it did.
    pub fn merge_into(self, target: &mut T) -> bool {
        match self {
            Patch::Value(v) => {
                *target = v;
                true
            }
            Patch::Absent | Patch::Null => false,
        }
    }

    /// Same as [`Patch::merge_into`] for optional targets. A `Null` keeps
    /// the stored value rather than clearing it.
    pub fn merge_into_optional(self, target: &mut Option<T>) -> bool {
        match self {
            Patch::Value(v) => {
                *target = Some(v);
                true
            }
            Patch::Absent | Patch::Null => false,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        })
    }
}
