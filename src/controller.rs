use derive_more::{AsRef, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct ActionName(String);

crate::impl_string_newtype!(ActionName);

/// Opaque render token owned by the painting collaborator.
///
/// The core never interprets it; it only checks for its presence when
/// deciding whether a value can appear in a candidate set.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct DisplayToken(String);

crate::impl_string_newtype!(DisplayToken);

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct PrettyName(String);

crate::impl_string_newtype!(PrettyName);

/// Capability interface to the host property being controlled.
///
/// The selectors depend only on this trait, never on a concrete value
/// domain. `set_value` is assumed idempotent: the rotation selector and
/// the slider call it on every polling tick, not only on change.
pub trait Controller<V> {
    fn get_value(&self) -> V;

    fn set_value(&self, value: V);

    /// Re-read external state before a session starts.
    fn refresh(&self) {}

    /// Render token for a value, or `None` if the value cannot be
    /// displayed and must be excluded from candidate sets.
    fn get_label(&self, value: &V) -> Option<DisplayToken>;

    fn get_pretty_name(&self, value: &V) -> PrettyName;
}
