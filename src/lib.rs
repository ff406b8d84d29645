//! Geometry and state-machine core for pointer-driven radial controls.
//!
//! Three controls share the same session model (key press opens, key
//! release commits):
//!
//! - [`session::PieMenu`] -- pick one value by hovering over a ring of
//!   labels; committed on release.
//! - [`session::RotationMenu`] -- pick an angle on a ring partitioned
//!   into discrete and continuous bands; live-previewed on every sample.
//! - [`session::SliderShortcut`] -- cycle through a value set by
//!   dragging along one axis; polled and committed every tick.
//!
//! Rendering, input timing and the value being controlled belong to the
//! host, reached through [`controller::Controller`], [`events::AppEvent`]
//! and the [`session::ShortcutHandler`] lifecycle.

use std::time::Duration;

pub mod anim;
pub mod config;
pub mod controller;
pub mod events;
pub mod geometry;
pub mod label;
mod macros;
pub mod menu;
pub mod runtime;
pub mod session;
pub mod slider;

pub use anim::AnimationProgress;
pub use config::{ConfigStore, Field, PieConfig, RotationConfig, Settings};
pub use controller::{ActionName, Controller, DisplayToken, PrettyName};
pub use events::AppEvent;
pub use geometry::{CirclePoints, Point};
pub use label::{Label, LabelSet, Value};
pub use menu::{DeadzoneStrategy, DragReorderEngine, PieState, RotationState, Zone};
pub use session::{Instruction, PieMenu, RotationMenu, ShortcutHandler, SliderShortcut, dispatch};
pub use slider::{ListValues, MouseInterpreter, RangeValues, Slider, SliderValues};

/// Polling cadence shared by the selection animation and the slider
/// loop.
pub const TICK_INTERVAL: Duration = Duration::from_millis(50);
