//! Runtime configuration for the feed controller.
//!
//! These are the in-memory structs used by `Feeder`; they are separate
//! from the TOML-deserialized schema in `feeder_config`.

/// Timings and thresholds for the feed cycle and scheduling.
#[derive(Debug, Clone)]
pub struct FeedCfg {
    /// Settle time after a command before measuring (ms).
    pub settle_ms: u64,
    /// Give up on a load-cell run after this long (ms).
    pub sensor_timeout_ms: u64,
    /// The motor takes about 2 s per stroke; time out well past that (ms).
    pub run_timeout_ms: u64,
    /// Open-loop motor run time when the limit switch is known bad (ms).
    pub run_limp_ms: u64,
    /// Extra run time after the limit-switch release edge (ms).
    pub run_post_ms: u64,
    /// Limit-switch debounce hold (ms).
    pub debounce_ms: u64,
    /// Settle time between motor stop and post-feed measurement (ms).
    pub post_wait_ms: u64,
    /// Minimum time between feed attempts (ms).
    pub cooldown_ms: u64,
    /// Remeasure an idle channel once its reading is older than this
    /// (ms); measured continuously during maintenance.
    pub idle_refresh_ms: u64,
    /// Re-arm the same measurement state up to this many times on a
    /// noisy batch before giving up on the state.
    pub measure_retries: u16,
    /// Consecutive sensor-aborted or under-dispensed feeds tolerated
    /// before escalating (limp mode / JAMMED respectively).
    pub max_feed_retries: u16,
    /// A measurement is trusted when its stddev is below this (g).
    pub stddev_limit_g: f32,
    /// Portion weight assumed when sensors are untrusted (g).
    pub assumed_feed_g: f32,
    /// Maximum disagreement between reservoir and bowl deltas (g).
    pub max_disagree_g: f32,
    /// Lower bound of the dispensed-weight sanity window (g); the
    /// upper bound is 3x the assumed portion.
    pub min_reasonable_g: f32,
    /// A feed below this fraction of the assumed portion counts
    /// toward jam detection.
    pub jam_fraction: f32,
    /// Warn when the reservoir weighs less than this (g).
    pub low_reservoir_g: f32,
    /// Deficit level at which auto-feed becomes eligible (mg).
    pub deficit_threshold_mg: i32,
    /// Force-republish throttled telemetry this often (ms).
    pub telemetry_refresh_ms: u64,
}

impl Default for FeedCfg {
    fn default() -> Self {
        Self {
            settle_ms: 2_000,
            sensor_timeout_ms: 10_000,
            run_timeout_ms: 3_000,
            run_limp_ms: 2_000,
            run_post_ms: 10,
            debounce_ms: 50,
            post_wait_ms: 800,
            cooldown_ms: 5 * 60 * 1000,
            idle_refresh_ms: 5 * 60 * 1000,
            measure_retries: 5,
            max_feed_retries: 3,
            stddev_limit_g: 1.0,
            assumed_feed_g: 9.0,
            max_disagree_g: 5.0,
            min_reasonable_g: -2.0,
            jam_fraction: 0.3,
            low_reservoir_g: 250.0,
            deficit_threshold_mg: 0,
            telemetry_refresh_ms: 5_000,
        }
    }
}

impl FeedCfg {
    /// Bench preset: short cooldown so auto-feed can be exercised
    /// without waiting out the five-minute window.
    pub fn debug() -> Self {
        Self {
            cooldown_ms: 3_000,
            ..Self::default()
        }
    }
}
