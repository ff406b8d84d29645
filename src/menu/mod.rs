pub mod drag;
pub mod pie;
pub mod rotation;

pub use drag::DragReorderEngine;
pub use pie::PieState;
pub use rotation::{DeadzoneStrategy, RotationParams, RotationState, Zone};

pub const PIE_RADIUS: f64 = 120.0; // label orbital radius
pub const DEADZONE_RADIUS: f64 = 48.0; // no selection below this distance
