use crate::geometry::{CirclePoints, Point};
use crate::label::{Label, LabelSet, Value};

/// Drag-based layout editing for a label set.
///
/// The first drag puts the owning widget into edit mode, which persists
/// across further drags until the widget is dismissed. While a label is
/// dragged, pointer samples relocate it between angular slots, remove
/// it when the pointer leaves the ring, or insert it when it came from
/// the unused-values pool. Relocation is a pairwise slot swap, never a
/// full re-layout, which would be too expensive to run on every sample.
///
/// The set stays internally consistent at every step: an interrupted
/// drag (pointer device lost, no `drag_end`) leaves no label without a
/// slot and no slot claimed twice.
#[derive(Debug, Default)]
pub struct DragReorderEngine<V> {
    edit_mode: bool,
    dragged: Option<Label<V>>,
}

impl<V: Value> DragReorderEngine<V> {
    pub fn new() -> Self {
        Self {
            edit_mode: false,
            dragged: None,
        }
    }

    pub fn edit_mode(&self) -> bool {
        self.edit_mode
    }

    pub fn is_dragging(&self) -> bool {
        self.dragged.is_some()
    }

    /// Begin dragging a label. The label may come from the set being
    /// edited or from the unused-values pool.
    pub fn drag_start(&mut self, label: Label<V>) {
        if !self.edit_mode {
            log::debug!("entering edit mode");
            self.edit_mode = true;
        }
        self.dragged = Some(label);
    }

    /// Apply one drag pointer sample to `labels`. Returns whether the
    /// layout changed.
    pub fn drag_move(
        &mut self,
        labels: &mut LabelSet<V>,
        circle: &CirclePoints,
        deadzone_radius: f64,
        cursor: Point,
    ) -> bool {
        let Some(dragged) = &self.dragged else {
            return false;
        };

        let distance = circle.distance(cursor);
        if distance < deadzone_radius {
            return false;
        }

        if distance > circle.radius() {
            // Out of the ring: the label leaves the active layout and
            // returns to the unused-values pool.
            if labels.remove_value(&dragged.value).is_some() {
                labels.reset_layout(circle);
                debug_assert!(labels.angles_are_distinct());
                return true;
            }
            return false;
        }

        let mut changed = false;
        if !labels.contains(&dragged.value) {
            labels.push(dragged.clone());
            labels.reset_layout(circle);
            changed = true;
        }

        let angle = circle.angle_from_point(cursor);
        let (Some(target), Some(source)) =
            (labels.nearest_to_angle(angle), labels.index_of(&dragged.value))
        else {
            return changed;
        };
        if target != source {
            labels.swap_slots(source, target);
            changed = true;
        }
        debug_assert!(labels.angles_are_distinct());
        changed
    }

    /// End the current drag. Edit mode persists so further drags can
    /// follow before the layout is committed.
    pub fn drag_end(&mut self) {
        self.dragged = None;
    }

    /// Leave edit mode. Returns whether the engine was in edit mode, in
    /// which case the caller commits the layout to configuration.
    pub fn finish(&mut self) -> bool {
        self.dragged = None;
        std::mem::take(&mut self.edit_mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{Controller, DisplayToken, PrettyName};

    struct TokenController;

    impl Controller<String> for TokenController {
        fn get_value(&self) -> String {
            "a".into()
        }

        fn set_value(&self, _value: String) {}

        fn get_label(&self, value: &String) -> Option<DisplayToken> {
            Some(DisplayToken::new(value.clone()))
        }

        fn get_pretty_name(&self, value: &String) -> PrettyName {
            PrettyName::new(value.clone())
        }
    }

    const DEADZONE: f64 = 40.0;

    fn setup(values: &[&str]) -> (LabelSet<String>, CirclePoints) {
        let values: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        let mut labels = LabelSet::from_values(values, &TokenController);
        let circle = CirclePoints::new(Point::new(0.0, 0.0), 100.0);
        labels.reset_layout(&circle);
        (labels, circle)
    }

    fn on_ring(circle: &CirclePoints, angle: f64) -> Point {
        CirclePoints::new(circle.center(), circle.radius() * 0.8).point_from_angle(angle)
    }

    #[test]
    fn test_drag_to_another_slot_swaps_pairwise() {
        let (mut labels, circle) = setup(&["a", "b", "c"]);
        let mut engine = DragReorderEngine::new();

        engine.drag_start(labels.get(0).unwrap().clone());
        assert!(engine.drag_move(&mut labels, &circle, DEADZONE, on_ring(&circle, 240.0)));
        engine.drag_end();

        // Values swapped slots; the slots themselves stay at 0/120/240.
        let order: Vec<String> = labels.values_in_angle_order();
        assert_eq!(order, vec!["c", "b", "a"]);
        let mut angles: Vec<f64> = labels.iter().map(|l| l.angle).collect();
        angles.sort_by(f64::total_cmp);
        assert_eq!(angles, vec![0.0, 120.0, 240.0]);
        assert!(engine.edit_mode());
    }

    #[test]
    fn test_drag_within_deadzone_changes_nothing() {
        let (mut labels, circle) = setup(&["a", "b", "c"]);
        let mut engine = DragReorderEngine::new();
        engine.drag_start(labels.get(0).unwrap().clone());
        assert!(!engine.drag_move(&mut labels, &circle, DEADZONE, Point::new(5.0, 5.0)));
        assert_eq!(labels.values_in_angle_order(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_drag_out_removes_and_back_reinserts() {
        let (mut labels, circle) = setup(&["a", "b", "c"]);
        let mut engine = DragReorderEngine::new();
        engine.drag_start(labels.get(0).unwrap().clone());

        let outside = Point::new(0.0, -150.0);
        assert!(engine.drag_move(&mut labels, &circle, DEADZONE, outside));
        assert_eq!(labels.len(), 2);
        assert!(!labels.contains(&"a".to_string()));
        assert!(labels.angles_are_distinct());

        // Back inside without releasing: membership is restored.
        assert!(engine.drag_move(&mut labels, &circle, DEADZONE, on_ring(&circle, 0.0)));
        assert_eq!(labels.len(), 3);
        assert!(labels.contains(&"a".to_string()));
        assert!(labels.angles_are_distinct());
    }

    #[test]
    fn test_drag_from_pool_inserts() {
        let (mut labels, circle) = setup(&["a", "b"]);
        let mut engine = DragReorderEngine::new();
        let pooled = Label::from_value("d".to_string(), &TokenController).unwrap();

        engine.drag_start(pooled);
        assert!(engine.drag_move(&mut labels, &circle, DEADZONE, on_ring(&circle, 90.0)));
        assert_eq!(labels.len(), 3);
        assert!(labels.contains(&"d".to_string()));
        assert!(labels.angles_are_distinct());
    }

    #[test]
    fn test_interrupted_drag_leaves_consistent_state() {
        let (mut labels, circle) = setup(&["a", "b", "c", "d"]);
        let mut engine = DragReorderEngine::new();
        engine.drag_start(labels.get(1).unwrap().clone());
        engine.drag_move(&mut labels, &circle, DEADZONE, on_ring(&circle, 180.0));
        // Pointer device lost: no drag_end, the widget is dismissed.
        assert!(engine.finish());
        assert_eq!(labels.len(), 4);
        assert!(labels.angles_are_distinct());
        assert!(!engine.edit_mode());
    }

    #[test]
    fn test_edit_mode_persists_across_drags() {
        let (mut labels, circle) = setup(&["a", "b"]);
        let mut engine = DragReorderEngine::new();
        engine.drag_start(labels.get(0).unwrap().clone());
        engine.drag_end();
        assert!(engine.edit_mode());
        engine.drag_start(labels.get(1).unwrap().clone());
        engine.drag_end();
        assert!(engine.edit_mode());
        assert!(engine.finish());
        assert!(!engine.finish(), "finish is one-shot");
    }
}
