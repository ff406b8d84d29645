use crate::anim::AnimationProgress;
use crate::controller::{Controller, DisplayToken, PrettyName};
use crate::geometry::{CirclePoints, Point, angle_difference};
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::{Hash, Hasher};
use std::iter::zip;
use std::sync::OnceLock;

/// Bound alias for types usable as selectable values.
pub trait Value: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

impl<T: Clone + Eq + Hash + Debug + Send + Sync + 'static> Value for T {}

/// Values which have no display representation, remembered process-wide
/// so recomputing a candidate set does not query the controller for them
/// again. Starts empty, grows monotonically, never persisted. Mutation
/// is expected from the GUI thread only; the lock keeps it safe anyway.
static INVALID_VALUES: OnceLock<RwLock<HashMap<TypeId, Box<dyn Any + Send + Sync>>>> =
    OnceLock::new();

fn invalid_registry() -> &'static RwLock<HashMap<TypeId, Box<dyn Any + Send + Sync>>> {
    INVALID_VALUES.get_or_init(Default::default)
}

pub fn is_marked_invalid<V: Value>(value: &V) -> bool {
    invalid_registry()
        .read()
        .get(&TypeId::of::<V>())
        .and_then(|set| set.downcast_ref::<HashSet<V>>())
        .is_some_and(|set| set.contains(value))
}

pub fn mark_invalid<V: Value>(value: V) {
    let mut registry = invalid_registry().write();
    let entry = registry
        .entry(TypeId::of::<V>())
        .or_insert_with(|| Box::new(HashSet::<V>::new()));
    if let Some(set) = entry.downcast_mut::<HashSet<V>>() {
        set.insert(value);
    }
}

/// A single selectable value with its spatial placement and animation
/// state.
///
/// - `value` -- value to set using the controller
/// - `center` -- label position in widget coordinates
/// - `angle` -- degrees relative to widget center, clockwise, 0 at top
/// - `display` -- render token owned by the painting collaborator
/// - `progress` -- selection-emphasis animation state in [0, 1]
#[derive(Debug, Clone)]
pub struct Label<V> {
    pub value: V,
    pub center: Point,
    pub angle: f64,
    pub display: DisplayToken,
    pub pretty_name: PrettyName,
    pub progress: AnimationProgress,
}

impl<V: Value> Label<V> {
    /// Build a label for `value`, or `None` when the controller has no
    /// display representation for it.
    pub fn from_value(value: V, controller: &impl Controller<V>) -> Option<Self> {
        let display = controller.get_label(&value)?;
        let pretty_name = controller.get_pretty_name(&value);
        Some(Self {
            value,
            center: Point::default(),
            angle: 0.0,
            display,
            pretty_name,
            progress: AnimationProgress::default(),
        })
    }
}

/// Two labels with the same value and position are considered equal.
impl<V: PartialEq> PartialEq for Label<V> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.center == other.center
    }
}

/// Hashing uses the value alone, as it does not change over time.
impl<V: Hash> Hash for Label<V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

/// Ordered set of labels. Order is significant: it determines angular
/// placement and the persisted configuration order. No two labels share
/// the same value.
#[derive(Debug, Clone, Default)]
pub struct LabelSet<V> {
    labels: Vec<Label<V>>,
}

impl<V: Value> LabelSet<V> {
    pub fn new() -> Self {
        Self { labels: Vec::new() }
    }

    /// Build the set from configured values, excluding ones the
    /// controller cannot display and remembering them in the
    /// process-wide registry.
    pub fn from_values(
        values: impl IntoIterator<Item = V>,
        controller: &impl Controller<V>,
    ) -> Self {
        let mut set = Self::new();
        for value in values {
            if is_marked_invalid(&value) {
                continue;
            }
            match Label::from_value(value.clone(), controller) {
                Some(label) => set.push(label),
                None => {
                    log::warn!("value {value:?} has no display representation, excluding it");
                    mark_invalid(value);
                }
            }
        }
        set
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Label<V>> {
        self.labels.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Label<V>> {
        self.labels.iter_mut()
    }

    pub fn get(&self, index: usize) -> Option<&Label<V>> {
        self.labels.get(index)
    }

    pub fn contains(&self, value: &V) -> bool {
        self.index_of(value).is_some()
    }

    pub fn index_of(&self, value: &V) -> Option<usize> {
        self.labels.iter().position(|label| &label.value == value)
    }

    /// Append a label; a label with a duplicate value is ignored.
    pub fn push(&mut self, label: Label<V>) {
        if !self.contains(&label.value) {
            self.labels.push(label);
        }
    }

    pub fn remove_value(&mut self, value: &V) -> Option<Label<V>> {
        let index = self.index_of(value)?;
        Some(self.labels.remove(index))
    }

    /// Distribute all labels evenly around the circle, in set order.
    pub fn reset_layout(&mut self, circle: &CirclePoints) {
        let slots = circle.iterate_over_circle(self.labels.len());
        for (label, (angle, point)) in zip(self.labels.iter_mut(), slots) {
            label.angle = angle;
            label.center = point;
        }
    }

    /// Index of the label angularly closest to `angle`, measured by the
    /// shorter arc. Ties resolve to the lowest index.
    pub fn nearest_to_angle(&self, angle: f64) -> Option<usize> {
        (0..self.labels.len()).min_by(|&a, &b| {
            angle_difference(angle, self.labels[a].angle)
                .total_cmp(&angle_difference(angle, self.labels[b].angle))
        })
    }

    /// Exchange the spatial slots of two labels. Values and identities
    /// stay put, only `(angle, center)` pairs move.
    pub fn swap_slots(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        let (angle_a, center_a) = (self.labels[a].angle, self.labels[a].center);
        self.labels[a].angle = self.labels[b].angle;
        self.labels[a].center = self.labels[b].center;
        self.labels[b].angle = angle_a;
        self.labels[b].center = center_a;
    }

    pub fn values(&self) -> Vec<V> {
        self.labels.iter().map(|label| label.value.clone()).collect()
    }

    /// Values sorted by their current angular slot. This is the order
    /// persisted to configuration.
    pub fn values_in_angle_order(&self) -> Vec<V> {
        let mut indices: Vec<usize> = (0..self.labels.len()).collect();
        indices.sort_by(|&a, &b| self.labels[a].angle.total_cmp(&self.labels[b].angle));
        indices
            .into_iter()
            .map(|i| self.labels[i].value.clone())
            .collect()
    }

    /// Invariant check: every label occupies its own angular slot.
    pub(crate) fn angles_are_distinct(&self) -> bool {
        for (i, a) in self.labels.iter().enumerate() {
            for b in self.labels.iter().skip(i + 1) {
                if a.angle == b.angle {
                    return false;
                }
            }
        }
        true
    }
}
