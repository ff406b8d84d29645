use crate::TICK_INTERVAL;
use crate::controller::Controller;
use crate::label::Value;
use crate::runtime::runtime;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::time::MissedTickBehavior;

/// The ordered or ranged set of values a slider cycles through.
pub trait SliderValues<V>: Send + Sync {
    fn min(&self) -> i64;

    fn max(&self) -> i64;

    /// Value at `index`. Callers pass indices already clamped to
    /// [min, max].
    fn at(&self, index: i64) -> V;

    fn index_of(&self, value: &V) -> Option<i64>;

    /// Index to start from when the current value is not in the set.
    fn default_index(&self) -> i64;
}

/// An explicit list of values, addressed by position.
pub struct ListValues<V> {
    values: Vec<V>,
    default_index: i64,
}

impl<V: Value> ListValues<V> {
    pub fn new(values: Vec<V>, default_value: &V) -> Self {
        assert!(!values.is_empty(), "slider requires at least one value");
        let default_index = values
            .iter()
            .position(|v| v == default_value)
            .unwrap_or(0) as i64;
        Self {
            values,
            default_index,
        }
    }
}

impl<V: Value> SliderValues<V> for ListValues<V> {
    fn min(&self) -> i64 {
        0
    }

    fn max(&self) -> i64 {
        self.values.len() as i64 - 1
    }

    fn at(&self, index: i64) -> V {
        let index = index.clamp(self.min(), self.max()) as usize;
        self.values[index].clone()
    }

    fn index_of(&self, value: &V) -> Option<i64> {
        self.values.iter().position(|v| v == value).map(|i| i as i64)
    }

    fn default_index(&self) -> i64 {
        self.default_index
    }
}

/// A contiguous integer range; index and value coincide.
pub struct RangeValues {
    min: i64,
    max: i64,
    default: i64,
}

impl RangeValues {
    pub fn new(min: i64, max: i64, default: i64) -> Self {
        assert!(min <= max, "slider range must not be empty");
        Self {
            min,
            max,
            default: default.clamp(min, max),
        }
    }
}

impl SliderValues<i64> for RangeValues {
    fn min(&self) -> i64 {
        self.min
    }

    fn max(&self) -> i64 {
        self.max
    }

    fn at(&self, index: i64) -> i64 {
        index.clamp(self.min, self.max)
    }

    fn index_of(&self, value: &i64) -> Option<i64> {
        (self.min..=self.max).contains(value).then_some(*value)
    }

    fn default_index(&self) -> i64 {
        self.default
    }
}

/// Maps 1-D pointer displacement to a clamped index.
///
/// `sensitivity` is the pixel travel needed to move one full step;
/// larger means less sensitive. Fractional steps round ties to even, so
/// a displacement of exactly 2.5 steps advances by 2.
#[derive(Debug, Clone, Copy)]
pub struct MouseInterpreter {
    min: i64,
    max: i64,
    mouse_origin: i32,
    start_value: i64,
    sensitivity: u32,
}

impl MouseInterpreter {
    pub fn new(min: i64, max: i64, mouse_origin: i32, start_value: i64, sensitivity: u32) -> Self {
        Self {
            min,
            max,
            mouse_origin,
            start_value,
            sensitivity: sensitivity.max(1),
        }
    }

    pub fn mouse_to_value(&self, mouse: i32) -> i64 {
        let steps = f64::from(mouse - self.mouse_origin) / f64::from(self.sensitivity);
        (self.start_value + steps.round_ties_even() as i64).clamp(self.min, self.max)
    }
}

/// Cyclic slider driven by a polling loop.
///
/// `start` samples the pointer coordinate every tick, resolves the
/// index through a [`MouseInterpreter`] seeded from the value current
/// at start time, and writes the resolved value through the controller
/// on every tick. `stop` is cooperative and may be called from any
/// thread; the loop exits after at most one further tick.
pub struct Slider<V, C> {
    controller: Arc<C>,
    values: Arc<dyn SliderValues<V>>,
    sensitivity: u32,
    working: Arc<AtomicBool>,
}

impl<V, C> Slider<V, C>
where
    V: Value,
    C: Controller<V> + Send + Sync + 'static,
{
    pub fn new(controller: C, values: impl SliderValues<V> + 'static, sensitivity: u32) -> Self {
        Self {
            controller: Arc::new(controller),
            values: Arc::new(values),
            sensitivity,
            working: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_working(&self) -> bool {
        self.working.load(Ordering::SeqCst)
    }

    /// Begin polling. A no-op when the loop is already running.
    pub fn start<F>(&self, mouse_getter: F)
    where
        F: Fn() -> i32 + Send + 'static,
    {
        if self.working.swap(true, Ordering::SeqCst) {
            return;
        }

        self.controller.refresh();
        let start_index = self
            .values
            .index_of(&self.controller.get_value())
            .unwrap_or_else(|| self.values.default_index());
        let interpreter = MouseInterpreter::new(
            self.values.min(),
            self.values.max(),
            mouse_getter(),
            start_index,
            self.sensitivity,
        );

        let working = Arc::clone(&self.working);
        let controller = Arc::clone(&self.controller);
        let values = Arc::clone(&self.values);
        runtime().spawn(async move {
            let mut ticks = tokio::time::interval(TICK_INTERVAL);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticks.tick().await;
                if !working.load(Ordering::SeqCst) {
                    break;
                }
                let index = interpreter.mouse_to_value(mouse_getter());
                controller.set_value(values.at(index));
            }
        });
    }

    /// Request the polling loop to exit. Idempotent.
    pub fn stop(&self) {
        self.working.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{DisplayToken, PrettyName};
    use parking_lot::Mutex;
    use std::sync::atomic::AtomicI32;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_mouse_to_value_steps_and_clamps() {
        let interpreter = MouseInterpreter::new(0, 9, 1000, 5, 50);
        assert_eq!(interpreter.mouse_to_value(1000), 5);
        assert_eq!(interpreter.mouse_to_value(1050), 6);
        assert_eq!(interpreter.mouse_to_value(950), 4);
        // 125 px is 2.5 steps; ties round to even, so 2 steps forward.
        assert_eq!(interpreter.mouse_to_value(1125), 7);
        // Clamped at both ends.
        assert_eq!(interpreter.mouse_to_value(2000), 9);
        assert_eq!(interpreter.mouse_to_value(-2000), 0);
    }

    #[test]
    fn test_range_values_coincide_with_indices() {
        let range = RangeValues::new(10, 20, 10);
        assert_eq!(range.at(15), 15);
        assert_eq!(range.at(99), 20);
        assert_eq!(range.index_of(&12), Some(12));
        assert_eq!(range.index_of(&9), None);
    }

    #[test]
    fn test_list_values_default_fallback() {
        let list = ListValues::new(vec!["x", "y", "z"], &"y");
        assert_eq!(list.default_index(), 1);
        let missing = ListValues::new(vec!["x", "y", "z"], &"absent");
        assert_eq!(missing.default_index(), 0);
    }

    struct RecordingController {
        current: Mutex<i64>,
        writes: Mutex<Vec<i64>>,
    }

    impl RecordingController {
        fn new(current: i64) -> Self {
            Self {
                current: Mutex::new(current),
                writes: Mutex::new(Vec::new()),
            }
        }
    }

    impl Controller<i64> for RecordingController {
        fn get_value(&self) -> i64 {
            *self.current.lock()
        }

        fn set_value(&self, value: i64) {
            *self.current.lock() = value;
            self.writes.lock().push(value);
        }

        fn get_label(&self, value: &i64) -> Option<DisplayToken> {
            Some(DisplayToken::new(value.to_string()))
        }

        fn get_pretty_name(&self, value: &i64) -> PrettyName {
            PrettyName::new(value.to_string())
        }
    }

    #[test]
    fn test_polling_loop_writes_every_tick_and_stops() {
        let slider = Slider::new(RecordingController::new(5), RangeValues::new(0, 9, 0), 50);
        let mouse = Arc::new(AtomicI32::new(0));

        let source = Arc::clone(&mouse);
        slider.start(move || source.load(Ordering::SeqCst));
        assert!(slider.is_working());

        sleep(Duration::from_millis(160));
        mouse.store(125, Ordering::SeqCst);
        sleep(Duration::from_millis(160));

        slider.stop();
        slider.stop(); // idempotent
        sleep(Duration::from_millis(160));

        let writes = slider.controller.writes.lock().clone();
        assert!(writes.len() >= 3, "loop should write on every tick");
        assert_eq!(writes.first(), Some(&5));
        // 125 px at sensitivity 50 is 2.5 steps, rounded to even: 2.
        assert_eq!(writes.last(), Some(&7));

        let settled = writes.len();
        sleep(Duration::from_millis(160));
        assert_eq!(
            slider.controller.writes.lock().len(),
            settled,
            "no writes may arrive after stop has settled"
        );
        assert!(!slider.is_working());
    }

    #[test]
    fn test_start_while_running_is_a_no_op() {
        let slider = Slider::new(RecordingController::new(0), RangeValues::new(0, 9, 0), 50);
        slider.start(|| 0);
        slider.start(|| 10_000); // ignored: loop already running
        sleep(Duration::from_millis(120));
        slider.stop();
        sleep(Duration::from_millis(120));
        let writes = slider.controller.writes.lock().clone();
        assert!(writes.iter().all(|&v| v == 0));
    }
}
