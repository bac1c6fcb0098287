//! Published values for the telemetry collaborator.
//!
//! Each value latches the most recent setting plus a pending flag:
//! `set(v, force)` marks the value pending when it changed or when the
//! publisher forces a refresh; the bridge drains with `take_update()`.
//! This decouples update cadence from value change, matching the
//! throttle/force semantics of the original device integration.

/// A published value with change/force-driven update latching.
#[derive(Debug, Clone)]
pub struct Published<T> {
    value: T,
    pending: bool,
}

impl<T: PartialEq + Clone> Published<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            pending: false,
        }
    }

    /// Record a value; queue an update if it changed or `force` is set.
    pub fn set(&mut self, value: T, force: bool) {
        let changed = self.value != value;
        self.value = value;
        if force || changed {
            self.pending = true;
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Drain the pending update, if any.
    pub fn take_update(&mut self) -> Option<T> {
        if self.pending {
            self.pending = false;
            Some(self.value.clone())
        } else {
            None
        }
    }
}

/// All values the controller publishes.
#[derive(Debug, Clone)]
pub struct Telemetry {
    /// Reservoir weight (g).
    pub reservoir_mean: Published<f32>,
    /// Reservoir weight standard deviation (g).
    pub reservoir_stddev: Published<f32>,
    /// Bowl weight (g).
    pub bowl_mean: Published<f32>,
    /// Bowl weight standard deviation (g).
    pub bowl_stddev: Published<f32>,
    /// Feeding deficit (g).
    pub deficit_g: Published<f32>,
    /// Last amount fed (g).
    pub last_feed_g: Published<f32>,
    /// Grams-per-day setting feedback.
    pub grams_per_day: Published<i32>,
    /// Whether a feed cycle is in progress.
    pub feeding: Published<bool>,
    /// Whether maintenance mode is active.
    pub maintenance: Published<bool>,
    /// Whether the hopper is jammed.
    pub jammed: Published<bool>,
    /// Highest-priority error message.
    pub error: Published<&'static str>,
}

impl Default for Telemetry {
    fn default() -> Self {
        Self {
            reservoir_mean: Published::new(0.0),
            reservoir_stddev: Published::new(0.0),
            bowl_mean: Published::new(0.0),
            bowl_stddev: Published::new(0.0),
            deficit_g: Published::new(0.0),
            last_feed_g: Published::new(0.0),
            grams_per_day: Published::new(0),
            feeding: Published::new(false),
            maintenance: Published::new(false),
            jammed: Published::new(false),
            error: Published::new("No error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_without_change_stays_quiet() {
        let mut p = Published::new(1.0f32);
        p.set(1.0, false);
        assert_eq!(p.take_update(), None);
    }

    #[test]
    fn change_or_force_queues_one_update() {
        let mut p = Published::new(0i32);
        p.set(5, false);
        assert_eq!(p.take_update(), Some(5));
        assert_eq!(p.take_update(), None);
        p.set(5, true);
        assert_eq!(p.take_update(), Some(5));
    }
}
