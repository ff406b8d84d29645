use crate::config::{ConfigStore, PieConfig, RotationConfig, Settings};
use crate::controller::{ActionName, Controller};
use crate::events::AppEvent;
use crate::geometry::{CirclePoints, Point};
use crate::label::{Label, LabelSet, Value};
use crate::menu::{DragReorderEngine, PieState, RotationParams, RotationState};
use crate::slider::{Slider, SliderValues};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::cell::Cell;
use std::rc::Rc;

/// Additional behavior attached to a control, run on the session
/// lifecycle events. The host-side analog would be toggling playback,
/// toggling a tool, or similar side effects.
pub trait Instruction {
    fn on_key_press(&mut self) {}
    fn on_short_key_release(&mut self) {}
    fn on_long_key_release(&mut self) {}
    fn on_every_key_release(&mut self) {}
}

/// Session lifecycle exposed to the host. The host measures press
/// duration against [`Settings::short_vs_long_press_time`] and calls
/// the matching release hook; the core only reacts.
pub trait ShortcutHandler {
    fn on_key_press(&mut self) {}
    fn on_short_key_release(&mut self) {}
    fn on_long_key_release(&mut self) {}
    fn on_every_key_release(&mut self) {}
    fn on_cursor_move(&mut self, _cursor: Point) {}
}

/// Map a host event onto a handler. Release events fire the specific
/// hook first, then `on_every_key_release`. `ConfigReload` is the
/// host's cue to call [`ConfigStore::reload`]; the field callbacks take
/// it from there.
pub fn dispatch(handler: &mut dyn ShortcutHandler, event: &AppEvent) {
    match event {
        AppEvent::KeyPress => handler.on_key_press(),
        AppEvent::ShortKeyRelease => {
            handler.on_short_key_release();
            handler.on_every_key_release();
        }
        AppEvent::LongKeyRelease => {
            handler.on_long_key_release();
            handler.on_every_key_release();
        }
        AppEvent::CursorMove(cursor) => handler.on_cursor_move(*cursor),
        AppEvent::ConfigReload => {}
    }
}

/// Pick a value by hovering over a ring of labels.
///
/// Active between key press and release. The hovered label is committed
/// through the controller on release only; releasing inside the
/// deadzone keeps the current value. Dragging a label switches the
/// session into edit mode, which survives key releases until the
/// widget is dismissed, at which point the reordered layout is written
/// back to configuration exactly once.
pub struct PieMenu<V, C> {
    name: ActionName,
    controller: C,
    config: PieConfig<V>,
    settings: Settings,
    instructions: Vec<Box<dyn Instruction>>,
    state: PieState<V>,
    drag: DragReorderEngine<V>,
    last_values: Vec<V>,
    stale: Rc<Cell<bool>>,
    session_active: bool,
}

impl<V, C> PieMenu<V, C>
where
    V: Value + Serialize + DeserializeOwned,
    C: Controller<V>,
{
    pub fn new(
        name: ActionName,
        controller: C,
        default_values: Vec<V>,
        instructions: Vec<Box<dyn Instruction>>,
        store: &ConfigStore,
        settings: Settings,
    ) -> Self {
        let config = PieConfig::new(store, &name, default_values);

        let stale = Rc::new(Cell::new(true));
        {
            let stale = Rc::clone(&stale);
            config.order.register_callback(move || stale.set(true));
        }

        let scale = config.pie_radius_scale.read();
        let radius = settings.pie_radius * scale;
        let circle = CirclePoints::new(Point::new(radius, radius), radius);
        let state = PieState::new(LabelSet::new(), circle, settings.deadzone_radius * scale);

        Self {
            name,
            controller,
            config,
            settings,
            instructions,
            state,
            drag: DragReorderEngine::new(),
            last_values: Vec::new(),
            stale,
            session_active: false,
        }
    }

    pub fn name(&self) -> &ActionName {
        &self.name
    }

    pub fn config(&self) -> &PieConfig<V> {
        &self.config
    }

    /// Current selection state, for the painting collaborator.
    pub fn state(&self) -> &PieState<V> {
        &self.state
    }

    pub fn edit_mode(&self) -> bool {
        self.drag.edit_mode()
    }

    /// Feed one pointer sample. Returns whether the active label
    /// changed, so the host knows to repaint.
    pub fn update_cursor(&mut self, cursor: Point) -> bool {
        if !self.session_active {
            return false;
        }
        self.state.update_cursor(cursor)
    }

    /// Label for a value from the unused-values pool, for starting an
    /// insertion drag.
    pub fn make_label(&self, value: V) -> Option<Label<V>> {
        Label::from_value(value, &self.controller)
    }

    pub fn drag_start(&mut self, label: Label<V>) {
        self.drag.drag_start(label);
    }

    /// Start dragging the label currently occupying `index`.
    pub fn drag_start_index(&mut self, index: usize) {
        if let Some(label) = self.state.labels().get(index).cloned() {
            self.drag.drag_start(label);
        }
    }

    pub fn drag_move(&mut self, cursor: Point) -> bool {
        let circle = *self.state.circle();
        let deadzone = self.state.deadzone_radius();
        self.drag
            .drag_move(self.state.labels_mut(), &circle, deadzone, cursor)
    }

    pub fn drag_end(&mut self) {
        self.drag.drag_end();
    }

    /// Dismiss the widget. Leaving edit mode commits the edited layout
    /// to configuration.
    pub fn dismiss(&mut self) {
        if self.drag.finish() {
            let order = self.state.labels().values_in_angle_order();
            log::info!("{}: committing layout of {} labels", self.name, order.len());
            self.config.order.write(&order);
        }
        self.session_active = false;
    }

    fn reset_labels(&mut self) {
        let values = self.config.values();
        if !self.stale.replace(false) && values == self.last_values {
            // Rebuilding labels queries the controller for every value;
            // skip it when nothing changed.
            self.state.clear_active();
            return;
        }

        let scale = self.config.pie_radius_scale.read();
        let radius = self.settings.pie_radius * scale;
        let circle = CirclePoints::new(Point::new(radius, radius), radius);
        let labels = LabelSet::from_values(values.clone(), &self.controller);
        log::debug!("{}: rebuilt {} labels", self.name, labels.len());
        self.last_values = values;
        self.state = PieState::new(labels, circle, self.settings.deadzone_radius * scale);
    }
}

impl<V, C> ShortcutHandler for PieMenu<V, C>
where
    V: Value + Serialize + DeserializeOwned,
    C: Controller<V>,
{
    fn on_key_press(&mut self) {
        if self.session_active {
            return;
        }
        self.session_active = true;
        for instruction in &mut self.instructions {
            instruction.on_key_press();
        }
        self.controller.refresh();
        self.reset_labels();
    }

    fn on_short_key_release(&mut self) {
        if !self.session_active {
            return;
        }
        for instruction in &mut self.instructions {
            instruction.on_short_key_release();
        }
    }

    fn on_long_key_release(&mut self) {
        if !self.session_active {
            return;
        }
        for instruction in &mut self.instructions {
            instruction.on_long_key_release();
        }
    }

    fn on_every_key_release(&mut self) {
        if !self.session_active {
            return;
        }
        for instruction in &mut self.instructions {
            instruction.on_every_key_release();
        }
        if self.drag.edit_mode() {
            // The widget stays open for editing; dismiss() ends it.
            return;
        }
        self.session_active = false;
        if let Some(label) = self.state.active_label() {
            self.controller.set_value(label.value.clone());
        }
    }

    fn on_cursor_move(&mut self, cursor: Point) {
        self.update_cursor(cursor);
    }
}

/// Pick an angle by hovering over a partitioned ring.
///
/// Unlike the pie, the resolved value is live-previewed: it is pushed
/// through the controller on every pointer sample between key press
/// and release.
pub struct RotationMenu<C> {
    name: ActionName,
    controller: C,
    config: RotationConfig,
    settings: Settings,
    instructions: Vec<Box<dyn Instruction>>,
    state: Option<RotationState>,
}

impl<C: Controller<i32>> RotationMenu<C> {
    pub fn new(
        name: ActionName,
        controller: C,
        instructions: Vec<Box<dyn Instruction>>,
        store: &ConfigStore,
        settings: Settings,
    ) -> Self {
        let config = RotationConfig::new(store, &name);
        Self {
            name,
            controller,
            config,
            settings,
            instructions,
            state: None,
        }
    }

    pub fn name(&self) -> &ActionName {
        &self.name
    }

    pub fn config(&self) -> &RotationConfig {
        &self.config
    }

    pub fn state(&self) -> Option<&RotationState> {
        self.state.as_ref()
    }

    /// Feed one pointer sample; pushes the resolved value through the
    /// controller.
    pub fn update_cursor(&mut self, cursor: Point) {
        if let Some(state) = &mut self.state {
            let value = state.update_cursor(cursor);
            self.controller.set_value(value);
        }
    }
}

impl<C: Controller<i32>> ShortcutHandler for RotationMenu<C> {
    fn on_key_press(&mut self) {
        if self.state.is_some() {
            return;
        }
        for instruction in &mut self.instructions {
            instruction.on_key_press();
        }
        self.controller.refresh();

        let params = RotationParams::snapshot(&self.config, self.settings.pie_radius);
        let radius = self.settings.pie_radius;
        let circle = CirclePoints::new(Point::new(radius, radius), radius);
        let start_value = self.controller.get_value();
        log::debug!("{}: session starts at {start_value}", self.name);
        self.state = Some(RotationState::new(circle, params, start_value));
    }

    fn on_short_key_release(&mut self) {
        if self.state.is_none() {
            return;
        }
        for instruction in &mut self.instructions {
            instruction.on_short_key_release();
        }
    }

    fn on_long_key_release(&mut self) {
        if self.state.is_none() {
            return;
        }
        for instruction in &mut self.instructions {
            instruction.on_long_key_release();
        }
    }

    fn on_every_key_release(&mut self) {
        if self.state.is_none() {
            return;
        }
        for instruction in &mut self.instructions {
            instruction.on_every_key_release();
        }
        self.state = None;
    }

    fn on_cursor_move(&mut self, cursor: Point) {
        self.update_cursor(cursor);
    }
}

/// Cycle through a value set by dragging the pointer along one axis
/// while the key is held.
pub struct SliderShortcut<V, C, F> {
    slider: Slider<V, C>,
    pointer_source: F,
    instructions: Vec<Box<dyn Instruction>>,
}

impl<V, C, F> SliderShortcut<V, C, F>
where
    V: Value,
    C: Controller<V> + Send + Sync + 'static,
    F: Fn() -> i32 + Clone + Send + 'static,
{
    pub fn new(
        controller: C,
        values: impl SliderValues<V> + 'static,
        instructions: Vec<Box<dyn Instruction>>,
        settings: &Settings,
        pointer_source: F,
    ) -> Self {
        Self {
            slider: Slider::new(controller, values, settings.sensitivity),
            pointer_source,
            instructions,
        }
    }

    pub fn slider(&self) -> &Slider<V, C> {
        &self.slider
    }
}

impl<V, C, F> ShortcutHandler for SliderShortcut<V, C, F>
where
    V: Value,
    C: Controller<V> + Send + Sync + 'static,
    F: Fn() -> i32 + Clone + Send + 'static,
{
    fn on_key_press(&mut self) {
        if self.slider.is_working() {
            return;
        }
        for instruction in &mut self.instructions {
            instruction.on_key_press();
        }
        self.slider.start(self.pointer_source.clone());
    }

    fn on_every_key_release(&mut self) {
        if !self.slider.is_working() {
            return;
        }
        for instruction in &mut self.instructions {
            instruction.on_every_key_release();
        }
        self.slider.stop();
    }
}
