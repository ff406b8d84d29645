use crate::config::RotationConfig;
use crate::geometry::{CirclePoints, Point};
use serde::Serialize;
use serde_with::DeserializeFromStr;
use strum::{Display as StrumDisplay, EnumIter, EnumString};

/// What to apply while the pointer sits inside the deadzone.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    DeserializeFromStr,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum DeadzoneStrategy {
    /// Keep the last value computed this session.
    #[strum(serialize = "KeepChange", serialize = "keep_change")]
    KeepChange,
    /// Revert to the value held at session start.
    #[strum(serialize = "DiscardChange", serialize = "discard_change")]
    DiscardChange,
    /// Snap back to zero.
    #[strum(serialize = "SetToZero", serialize = "set_to_zero")]
    SetToZero,
}

impl DeadzoneStrategy {
    /// Pure resolution: invoked once per tick while inside the deadzone.
    pub fn resolve(self, last_value: i32, start_value: i32) -> i32 {
        match self {
            Self::KeepChange => last_value,
            Self::DiscardChange => start_value,
            Self::SetToZero => 0,
        }
    }
}

/// Session-immutable snapshot of the rotation configuration, with the
/// scales already resolved against the pie radius.
#[derive(Debug, Clone, Copy)]
pub struct RotationParams {
    pub deadzone_radius: f64,
    pub inner_zone_radius: f64,
    pub divisions: u32,
    pub is_counterclockwise: bool,
    pub offset: i32,
    pub inverse_zones: bool,
    pub strategy: DeadzoneStrategy,
}

impl RotationParams {
    pub fn snapshot(config: &RotationConfig, pie_radius: f64) -> Self {
        let divisions = config.divisions.read();
        if divisions == 0 {
            log::warn!("rotation configured with 0 divisions, using 1");
        }
        Self {
            deadzone_radius: pie_radius * config.deadzone_scale.read(),
            inner_zone_radius: pie_radius * config.inner_zone_scale.read(),
            divisions: divisions.max(1),
            is_counterclockwise: config.is_counterclockwise.read(),
            offset: config.offset.read(),
            inverse_zones: config.inverse_zones.read(),
            strategy: config.deadzone_strategy.read(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Deadzone,
    Discrete,
    Continuous,
}

/// Maps pointer samples to a value on a circular 0..360 scale.
///
/// The circle splits radially into three bands, from the center
/// outward: deadzone, then a discrete band quantized into `divisions`
/// steps, then a continuous band with full angular resolution
/// (`inverse_zones` swaps the two outer bands). While the pointer stays
/// in the deadzone the configured strategy decides what value to
/// report.
#[derive(Debug)]
pub struct RotationState {
    circle: CirclePoints,
    params: RotationParams,
    start_value: i32,
    last_value: i32,
}

impl RotationState {
    pub fn new(circle: CirclePoints, params: RotationParams, start_value: i32) -> Self {
        Self {
            circle,
            params,
            start_value,
            last_value: start_value,
        }
    }

    pub fn params(&self) -> &RotationParams {
        &self.params
    }

    pub fn start_value(&self) -> i32 {
        self.start_value
    }

    pub fn zone(&self, cursor: Point) -> Zone {
        let distance = self.circle.distance(cursor);
        if distance < self.params.deadzone_radius {
            return Zone::Deadzone;
        }
        let in_inner_band = distance < self.params.inner_zone_radius;
        if in_inner_band != self.params.inverse_zones {
            Zone::Discrete
        } else {
            Zone::Continuous
        }
    }

    fn step(&self) -> f64 {
        360.0 / f64::from(self.params.divisions)
    }

    /// Quantize an angle to a division index.
    ///
    /// Half-division boundaries round up: with 24 divisions (15 degrees
    /// each), 7.5 degrees resolves to index 1.
    pub fn discrete_index(&self, angle: f64) -> u32 {
        ((angle / self.step()).round() as u32) % self.params.divisions
    }

    fn directed_angle(&self, cursor: Point) -> f64 {
        let raw = self.circle.angle_from_point(cursor);
        if self.params.is_counterclockwise {
            (360.0 - raw).rem_euclid(360.0)
        } else {
            raw
        }
    }

    fn apply_offset(&self, degrees: f64) -> i32 {
        (degrees.round() as i32 + self.params.offset).rem_euclid(360)
    }

    /// Resolve the value for one pointer sample. Called once per tick;
    /// the caller pushes the result through the controller every time.
    pub fn update_cursor(&mut self, cursor: Point) -> i32 {
        match self.zone(cursor) {
            Zone::Deadzone => self
                .params
                .strategy
                .resolve(self.last_value, self.start_value),
            Zone::Discrete => {
                let angle = self.directed_angle(cursor);
                let snapped = f64::from(self.discrete_index(angle)) * self.step();
                let value = self.apply_offset(snapped);
                self.last_value = value;
                value
            }
            Zone::Continuous => {
                let value = self.apply_offset(self.directed_angle(cursor));
                self.last_value = value;
                value
            }
        }
    }
}
