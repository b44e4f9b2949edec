//! Explicit presence tracking for partial updates.

use serde::{Deserialize, Deserializer};

/// A field of a partial update: either absent or present with a value.
///
/// Combine with `#[serde(default)]` so a missing key deserializes to
/// [`Patch::Absent`]. For nullable fields use `Patch<Option<T>>`, which
/// keeps "absent" apart from "present as null".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Patch<T> {
    /// The field was not supplied.
    Absent,
    /// The field was supplied with this value.
    Present(T),
}

impl<T> Patch<T> {
    /// Returns `true` when the field was not supplied.
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Returns `true` when the field was supplied.
    #[must_use]
    pub const fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// Borrows the supplied value.
    #[must_use]
    pub const fn as_present(&self) -> Option<&T> {
        match self {
            Self::Absent => None,
            Self::Present(value) => Some(value),
        }
    }

    /// Converts the supplied value, keeping absence.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Patch<U> {
        match self {
            Self::Absent => Patch::Absent,
            Self::Present(value) => Patch::Present(f(value)),
        }
    }

    /// Converts the supplied value with a fallible function.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `f`.
    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<Patch<U>, E> {
        match self {
            Self::Absent => Ok(Patch::Absent),
            Self::Present(value) => f(value).map(Patch::Present),
        }
    }

    /// Converts into an `Option`, losing the distinction for nullable fields.
    #[must_use]
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Absent => None,
            Self::Present(value) => Some(value),
        }
    }
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Self::Absent
    }
}

impl<T> From<T> for Patch<T> {
    fn from(value: T) -> Self {
        Self::Present(value)
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Self::Present)
    }
}
