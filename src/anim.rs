use crate::TICK_INTERVAL;

/// Two-way animation progress in range [0, 1].
///
/// The change is fastest when the animation starts and slows down near
/// the bound; `steep` controls how pronounced that shape is. `up()` and
/// `down()` are meant to be called once per polling tick.
#[derive(Debug, Clone)]
pub struct AnimationProgress {
    value: f64,
    speed: f64,
    steep: f64,
}

impl AnimationProgress {
    pub fn new(speed_scale: f64, steep: f64) -> Self {
        Self {
            value: 0.0,
            speed: 0.004 * TICK_INTERVAL.as_millis() as f64 * speed_scale,
            steep,
        }
    }

    pub fn up(&mut self) {
        let difference = (1.0 + self.steep - self.value) * self.speed;
        self.value = (self.value + difference).min(1.0);
    }

    pub fn down(&mut self) {
        let difference = (self.value + self.steep) * self.speed;
        self.value = (self.value - difference).max(0.0);
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Set the value back to 0 immediately, without easing.
    pub fn reset(&mut self) {
        self.value = 0.0;
    }
}

impl Default for AnimationProgress {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_up_saturates_at_one() {
        let mut progress = AnimationProgress::default();
        let first_step = {
            progress.up();
            progress.value()
        };
        assert!(first_step > 0.0);
        for _ in 0..200 {
            progress.up();
        }
        assert_eq!(progress.value(), 1.0);
    }

    #[test]
    fn test_down_saturates_at_zero() {
        let mut progress = AnimationProgress::default();
        for _ in 0..20 {
            progress.up();
        }
        for _ in 0..200 {
            progress.down();
        }
        assert_eq!(progress.value(), 0.0);
    }

    #[test]
    fn test_steps_shrink_near_the_bound() {
        let mut progress = AnimationProgress::default();
        progress.up();
        let early = progress.value();
        for _ in 0..10 {
            progress.up();
        }
        let before = progress.value();
        progress.up();
        let late_step = progress.value() - before;
        assert!(late_step < early, "easing should slow down near 1");
    }

    #[test]
    fn test_reset_is_immediate() {
        let mut progress = AnimationProgress::default();
        for _ in 0..10 {
            progress.up();
        }
        progress.reset();
        assert_eq!(progress.value(), 0.0);
    }
}
