//! Builder for [`Feeder`]. All fields are validated on `build()`.

use feeder_traits::{Adc, Clock, LimitSwitch, MonotonicClock, Motor};

use crate::config::FeedCfg;
use crate::error::{BuildError, Result};
use crate::feeder::Feeder;
use crate::loadcell::LoadCellCal;

/// Builder for [`Feeder`]. The ADC, motor, and limit switch are
/// required; everything else has factory defaults.
pub struct FeederBuilder<A, M, L> {
    adc: Option<A>,
    motor: Option<M>,
    limit: Option<L>,
    clock: Option<Box<dyn Clock>>,
    cal: LoadCellCal,
    cfg: FeedCfg,
    grams_per_day: i32,
}

impl<A, M, L> Default for FeederBuilder<A, M, L> {
    fn default() -> Self {
        Self {
            adc: None,
            motor: None,
            limit: None,
            clock: None,
            cal: LoadCellCal::default(),
            cfg: FeedCfg::default(),
            grams_per_day: 60,
        }
    }
}

impl<A: Adc, M: Motor, L: LimitSwitch> FeederBuilder<A, M, L> {
    pub fn with_adc(mut self, adc: A) -> Self {
        self.adc = Some(adc);
        self
    }

    pub fn with_motor(mut self, motor: M) -> Self {
        self.motor = Some(motor);
        self
    }

    pub fn with_limit_switch(mut self, limit: L) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Override the clock, e.g. with a manual clock for tests.
    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn with_calibration(mut self, cal: LoadCellCal) -> Self {
        self.cal = cal;
        self
    }

    pub fn with_feed_cfg(mut self, cfg: FeedCfg) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn with_grams_per_day(mut self, grams: i32) -> Self {
        self.grams_per_day = grams;
        self
    }

    /// Apply the file-loaded configuration: calibration, daily ration,
    /// cooldown, and the auto-feed threshold.
    pub fn with_config(mut self, config: &feeder_config::Config) -> Self {
        self.cal = config.calibration.into();
        self.grams_per_day = config.feeding.grams_per_day;
        self.cfg.cooldown_ms = config.feeding.cooldown_ms;
        self.cfg.deficit_threshold_mg = config.feeding.deficit_threshold_mg;
        self
    }

    /// Validate and construct the controller.
    pub fn build(self) -> Result<Feeder<A, M, L>> {
        let adc = self
            .adc
            .ok_or_else(|| eyre::Report::new(BuildError::MissingAdc))?;
        let motor = self
            .motor
            .ok_or_else(|| eyre::Report::new(BuildError::MissingMotor))?;
        let limit = self
            .limit
            .ok_or_else(|| eyre::Report::new(BuildError::MissingLimitSwitch))?;

        if !(0..=150).contains(&self.grams_per_day) {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "grams_per_day out of range",
            )));
        }
        for gain in [self.cal.reservoir.gain_g_per_raw, self.cal.bowl.gain_g_per_raw] {
            if !gain.is_finite() || gain == 0.0 {
                return Err(eyre::Report::new(BuildError::InvalidConfig(
                    "calibration gain must be finite and non-zero",
                )));
            }
        }
        if self.cfg.cooldown_ms == 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "cooldown_ms must be >= 1",
            )));
        }
        if !self.cfg.stddev_limit_g.is_finite() || self.cfg.stddev_limit_g <= 0.0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "stddev_limit_g must be > 0",
            )));
        }
        if !self.cfg.assumed_feed_g.is_finite() || self.cfg.assumed_feed_g <= 0.0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "assumed_feed_g must be > 0",
            )));
        }
        if !(0.0..1.0).contains(&self.cfg.jam_fraction) {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "jam_fraction must be in [0, 1)",
            )));
        }
        if self.cfg.measure_retries == 0 || self.cfg.max_feed_retries == 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "retry counts must be >= 1",
            )));
        }

        let clock = self
            .clock
            .unwrap_or_else(|| Box::new(MonotonicClock::new()));

        Ok(Feeder::new(
            adc,
            motor,
            limit,
            clock,
            self.cal,
            self.cfg,
            self.grams_per_day,
        ))
    }
}
