use crate::geometry::{CirclePoints, Point};
use crate::label::{Label, LabelSet, Value};

/// Pie selection state: maps the current pointer position to the
/// angularly nearest label, with a central deadzone below which no
/// label is active.
///
/// `update_cursor` is expected once per polling tick; it also drives
/// every label's selection-emphasis animation, so progress keeps
/// easing even while the active label stays the same.
#[derive(Debug)]
pub struct PieState<V> {
    labels: LabelSet<V>,
    circle: CirclePoints,
    deadzone_radius: f64,
    active_index: Option<usize>,
}

impl<V: Value> PieState<V> {
    pub fn new(mut labels: LabelSet<V>, circle: CirclePoints, deadzone_radius: f64) -> Self {
        labels.reset_layout(&circle);
        Self {
            labels,
            circle,
            deadzone_radius,
            active_index: None,
        }
    }

    pub fn labels(&self) -> &LabelSet<V> {
        &self.labels
    }

    /// Mutable access for the drag engine. Invalidates the cached
    /// active label; the next tick recomputes it.
    pub fn labels_mut(&mut self) -> &mut LabelSet<V> {
        self.active_index = None;
        &mut self.labels
    }

    pub fn circle(&self) -> &CirclePoints {
        &self.circle
    }

    pub fn deadzone_radius(&self) -> f64 {
        self.deadzone_radius
    }

    /// Recompute the active label from a pointer sample and advance all
    /// label animations by one tick. Returns whether the active label
    /// changed.
    pub fn update_cursor(&mut self, cursor: Point) -> bool {
        let new_index = if self.circle.distance(cursor) < self.deadzone_radius {
            None
        } else {
            let angle = self.circle.angle_from_point(cursor);
            self.labels.nearest_to_angle(angle)
        };

        let changed = self.active_index != new_index;
        self.active_index = new_index;

        for (i, label) in self.labels.iter_mut().enumerate() {
            if Some(i) == new_index {
                label.progress.up();
            } else {
                label.progress.down();
            }
        }

        changed
    }

    pub fn active_label(&self) -> Option<&Label<V>> {
        self.active_index.and_then(|i| self.labels.get(i))
    }

    pub fn clear_active(&mut self) {
        self.active_index = None;
        for label in self.labels.iter_mut() {
            label.progress.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{Controller, DisplayToken, PrettyName};

    struct TokenController;

    impl Controller<u32> for TokenController {
        fn get_value(&self) -> u32 {
            0
        }

        fn set_value(&self, _value: u32) {}

        fn get_label(&self, value: &u32) -> Option<DisplayToken> {
            Some(DisplayToken::new(value.to_string()))
        }

        fn get_pretty_name(&self, value: &u32) -> PrettyName {
            PrettyName::new(value.to_string())
        }
    }

    fn pie(values: &[u32]) -> PieState<u32> {
        let labels = LabelSet::from_values(values.to_vec(), &TokenController);
        let circle = CirclePoints::new(Point::new(0.0, 0.0), 100.0);
        PieState::new(labels, circle, 40.0)
    }

    #[test]
    fn test_deadzone_reports_no_active_label() {
        let mut pie = pie(&[1, 2, 3, 4]);
        for cursor in [
            Point::new(0.0, 0.0),
            Point::new(10.0, -15.0),
            Point::new(-39.0, 0.0),
        ] {
            pie.update_cursor(cursor);
            assert!(pie.active_label().is_none(), "{cursor:?} is inside deadzone");
        }
    }

    #[test]
    fn test_selection_outside_deadzone_is_deterministic() {
        let mut pie = pie(&[1, 2, 3, 4]);
        // Slots sit at 0, 90, 180, 270 degrees; straight right is 90.
        let cursor = Point::new(80.0, 0.0);
        pie.update_cursor(cursor);
        assert_eq!(pie.active_label().map(|l| l.value), Some(2));
        pie.update_cursor(cursor);
        assert_eq!(pie.active_label().map(|l| l.value), Some(2));
    }

    #[test]
    fn test_every_position_outside_deadzone_selects_something() {
        let mut pie = pie(&[1, 2, 3]);
        for i in 0..72 {
            let angle = (i * 5) as f64;
            let cursor = pie.circle().point_from_angle(angle);
            pie.update_cursor(cursor);
            assert!(pie.active_label().is_some(), "no selection at {angle} degrees");
        }
    }

    #[test]
    fn test_empty_set_never_selects() {
        let mut pie = pie(&[]);
        pie.update_cursor(Point::new(80.0, 0.0));
        assert!(pie.active_label().is_none());
    }

    #[test]
    fn test_progress_animates_toward_active_label() {
        let mut pie = pie(&[1, 2]);
        let cursor = Point::new(0.0, -80.0); // angle 0, nearest to value 1
        for _ in 0..5 {
            pie.update_cursor(cursor);
        }
        let active = pie.labels().get(0).unwrap().progress.value();
        let other = pie.labels().get(1).unwrap().progress.value();
        assert!(active > 0.0);
        assert_eq!(other, 0.0);

        // Moving away decays the previous label's progress.
        let cursor = Point::new(0.0, 80.0);
        pie.update_cursor(cursor);
        assert!(pie.labels().get(0).unwrap().progress.value() < active);
    }

    #[test]
    fn test_exact_deadzone_boundary_selects() {
        let mut pie = pie(&[1]);
        pie.update_cursor(Point::new(0.0, -40.0));
        assert!(pie.active_label().is_some());
    }
}
