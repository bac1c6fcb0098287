//! Feed controller: dispensing state machine, deficit scheduling, jam
//! detection, and telemetry publishing over the hardware traits.

use std::time::Instant;

use feeder_traits::{Adc, Clock, LimitSwitch, Motor, SensorChannel};

use crate::config::FeedCfg;
use crate::error::{Alert, ErrorFlags, ErrorReport, Result};
use crate::loadcell::{LoadCell, LoadCellCal};
use crate::report::{self, StateReport};
use crate::status::{FeedOutcome, FeedReport};
use crate::telemetry::Telemetry;

/// Controller state. One feed cycle walks the `Feed*` states in order;
/// the `Idle*` states serve background measurement and taring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedState {
    /// Waiting for a command or the next automatic feed.
    Idle,
    /// Let the reservoir settle after the tare command before sampling.
    IdleTareReservoirWait,
    /// Empty-reservoir measurement establishing the tare baseline.
    IdleTareReservoir,
    /// Empty-bowl measurement establishing the tare baseline.
    IdleTareBowl,
    /// Background reservoir measurement to refresh telemetry.
    IdleMeasureReservoir,
    /// Background bowl measurement to refresh telemetry.
    IdleMeasureBowl,
    /// Let the mechanics settle before the pre-feed measurements.
    FeedPreMeasureWait,
    /// Pre-feed reservoir sample.
    FeedPreMeasureReservoir,
    /// Pre-feed bowl sample.
    FeedPreMeasureBowl,
    /// Motor running; waiting for initial limit-switch release in case
    /// the cam stopped on the switch last time.
    FeedRunSync,
    /// Motor running; waiting for the limit switch to engage.
    FeedRunA,
    /// Motor running; waiting for the limit switch to release.
    FeedRunB,
    /// Motor running; brief overtravel past the release edge.
    FeedRunC,
    /// Let the kibble settle before the post-feed measurements.
    FeedPostWait,
    /// Post-feed bowl sample.
    FeedPostMeasureBowl,
    /// Post-feed reservoir sample.
    FeedPostMeasureReservoir,
}

impl FeedState {
    /// True for the states between feed start and feed completion.
    fn is_feed_phase(self) -> bool {
        !matches!(
            self,
            FeedState::Idle
                | FeedState::IdleTareReservoirWait
                | FeedState::IdleTareReservoir
                | FeedState::IdleTareBowl
                | FeedState::IdleMeasureReservoir
                | FeedState::IdleMeasureBowl
        )
    }
}

/// Maintenance/error mode, orthogonal to [`FeedState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaintenanceMode {
    /// Feeding normally.
    Operational,
    /// Operator-requested maintenance. No automatic feeding; idle
    /// sensors are measured continuously.
    Maintenance,
    /// Hopper appears jammed or empty. Feeding is stopped until an
    /// operator intervenes or a manual feed dispenses normally.
    Jammed,
}

/// Why an automatic feed is currently blocked, if it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedBlock {
    NotBlocked,
    Maintenance,
    Jammed,
    Cooldown,
    Deficit,
}

/// The feed controller. Owns the load-cell driver, motor and limit
/// switch, and all scheduling state; driven by calling [`update`] from
/// the application poll loop.
///
/// [`update`]: Feeder::update
pub struct Feeder<A: Adc, M: Motor, L: LimitSwitch> {
    loadcell: LoadCell<A>,
    motor: M,
    limit: L,
    clock: Box<dyn Clock>,
    cfg: FeedCfg,

    state: FeedState,
    maintenance_mode: MaintenanceMode,
    flags: ErrorFlags,

    grams_per_day: i32,
    deficit_ms_remain: i64,
    deficit_mg: i32,

    epoch: Instant,
    prev_now_ms: u64,
    ms_since_reservoir_read: u64,
    ms_since_bowl_read: u64,
    ms_since_feed_attempt: u64,
    ms_since_transition: u64,
    ms_since_forced_publish: u64,

    state_retries: u16,
    sensor_retries: u16,
    jam_retries: u16,

    feed_reservoir_pre: f32,
    feed_reservoir_post: f32,
    feed_bowl_pre: f32,
    feed_bowl_post: f32,

    feed_report: FeedReport,
    telemetry: Telemetry,
}

impl<A: Adc, M: Motor, L: LimitSwitch> core::fmt::Debug for Feeder<A, M, L> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Feeder")
            .field("state", &self.state)
            .field("maintenance_mode", &self.maintenance_mode)
            .field("flags", &self.flags)
            .field("grams_per_day", &self.grams_per_day)
            .field("deficit_ms_remain", &self.deficit_ms_remain)
            .field("deficit_mg", &self.deficit_mg)
            .finish_non_exhaustive()
    }
}

impl<A: Adc, M: Motor, L: LimitSwitch> Feeder<A, M, L> {
    /// Start building a feeder.
    pub fn builder() -> crate::builder::FeederBuilder<A, M, L> {
        crate::builder::FeederBuilder::default()
    }

    pub(crate) fn new(
        adc: A,
        motor: M,
        limit: L,
        clock: Box<dyn Clock>,
        cal: LoadCellCal,
        cfg: FeedCfg,
        grams_per_day: i32,
    ) -> Self {
        let epoch = clock.now();
        Self {
            loadcell: LoadCell::new(adc, cal),
            motor,
            limit,
            clock,
            cfg,
            state: FeedState::Idle,
            maintenance_mode: MaintenanceMode::Operational,
            flags: ErrorFlags::at_boot(),
            grams_per_day,
            deficit_ms_remain: 0,
            deficit_mg: 0,
            epoch,
            prev_now_ms: 0,
            // Start stale so both channels are measured soon after boot.
            ms_since_reservoir_read: u64::MAX / 2,
            ms_since_bowl_read: u64::MAX / 2,
            ms_since_feed_attempt: 0,
            ms_since_transition: 0,
            ms_since_forced_publish: 0,
            state_retries: 0,
            sensor_retries: 0,
            jam_retries: 0,
            feed_reservoir_pre: 0.0,
            feed_reservoir_post: 0.0,
            feed_bowl_pre: 0.0,
            feed_bowl_post: 0.0,
            feed_report: FeedReport::default(),
            telemetry: Telemetry::default(),
        }
    }

    /// One poll-loop iteration: advance the load-cell run, accrue the
    /// deficit, publish telemetry, step the state machine, and drive
    /// the motor. IO failures on the motor or limit switch propagate.
    pub fn update(&mut self) -> Result<()> {
        self.loadcell.update();

        let now_ms = self.clock.ms_since(self.epoch);
        let delta_ms = now_ms.saturating_sub(self.prev_now_ms);
        self.prev_now_ms = now_ms;

        self.accrue_deficit(delta_ms);
        self.telemetry
            .deficit_g
            .set(self.deficit_mg as f32 / 1000.0, false);

        // Throttled force-refresh keeps consumers in sync even when no
        // value changes, but is suppressed while feeding since the
        // motor edge timing is tight.
        let mut force = false;
        if self.ms_since_forced_publish > self.cfg.telemetry_refresh_ms {
            force = true;
            self.ms_since_forced_publish = 0;
        } else {
            self.ms_since_forced_publish += delta_ms;
        }
        let feeding = self.state.is_feed_phase();
        if feeding {
            force = false;
        }
        self.telemetry.feeding.set(feeding, false);
        self.telemetry.maintenance.set(
            self.maintenance_mode == MaintenanceMode::Maintenance,
            force,
        );
        self.telemetry
            .jammed
            .set(self.maintenance_mode == MaintenanceMode::Jammed, force);
        self.telemetry.error.set(self.error_report().message(), force);
        self.telemetry.grams_per_day.set(self.grams_per_day, force);

        self.ms_since_reservoir_read = self.ms_since_reservoir_read.saturating_add(delta_ms);
        self.ms_since_bowl_read = self.ms_since_bowl_read.saturating_add(delta_ms);
        self.ms_since_feed_attempt = self.ms_since_feed_attempt.saturating_add(delta_ms);
        self.ms_since_transition = self.ms_since_transition.saturating_add(delta_ms);

        let limit = self
            .limit
            .is_engaged()
            .map_err(|e| eyre::eyre!("limit switch read failed: {e}"))?;

        let mut motor = false;
        match self.state {
            FeedState::Idle => {
                if self.need_to_feed() == FeedBlock::NotBlocked {
                    self.feed();
                } else {
                    // Refresh whichever idle channel is staler, every
                    // five minutes normally, continuously in
                    // maintenance mode.
                    let refresh_ms = if self.maintenance_mode == MaintenanceMode::Maintenance {
                        0
                    } else {
                        self.cfg.idle_refresh_ms
                    };
                    // Reservoir wins ties so it is measured first after boot.
                    if self.ms_since_reservoir_read >= self.ms_since_bowl_read {
                        if self.ms_since_reservoir_read > refresh_ms {
                            self.transition(FeedState::IdleMeasureReservoir);
                        }
                    } else if self.ms_since_bowl_read > refresh_ms {
                        self.transition(FeedState::IdleMeasureBowl);
                    }
                }
            }

            FeedState::IdleTareReservoirWait => {
                if self.ms_since_transition > self.cfg.settle_ms {
                    self.transition(FeedState::IdleTareReservoir);
                }
            }

            FeedState::IdleTareReservoir
            | FeedState::IdleTareBowl
            | FeedState::IdleMeasureReservoir
            | FeedState::IdleMeasureBowl => {
                if self.consume_loadcell_run() {
                    self.transition(FeedState::Idle);
                }
            }

            FeedState::FeedPreMeasureWait => {
                if self.ms_since_transition > self.cfg.settle_ms {
                    self.transition(FeedState::FeedPreMeasureReservoir);
                }
            }

            FeedState::FeedPreMeasureReservoir => {
                self.pre_measure(SensorChannel::Reservoir, now_ms);
            }

            FeedState::FeedPreMeasureBowl => {
                self.pre_measure(SensorChannel::Bowl, now_ms);
            }

            FeedState::FeedRunSync => {
                motor = true;
                if self.flags.limit_switch {
                    // Open loop: run for the nominal stroke time.
                    if self.ms_since_transition > self.cfg.run_limp_ms {
                        self.transition(FeedState::FeedPostWait);
                    }
                } else if !limit {
                    self.transition(FeedState::FeedRunA);
                } else if self.ms_since_transition >= self.cfg.run_timeout_ms {
                    // Assume the motor already moved plenty; continue.
                    self.flags.limit_switch = true;
                    self.transition(FeedState::FeedPostWait);
                }
            }

            FeedState::FeedRunA => {
                motor = true;
                self.run_edge(limit, true, FeedState::FeedRunB);
            }

            FeedState::FeedRunB => {
                motor = true;
                self.run_edge(limit, false, FeedState::FeedRunC);
            }

            FeedState::FeedRunC => {
                motor = true;
                if self.ms_since_transition > self.cfg.run_post_ms {
                    self.transition(FeedState::FeedPostWait);
                }
            }

            FeedState::FeedPostWait => {
                if self.ms_since_transition > self.cfg.post_wait_ms {
                    self.transition(FeedState::FeedPostMeasureBowl);
                }
            }

            FeedState::FeedPostMeasureBowl => {
                self.post_measure(SensorChannel::Bowl, now_ms);
            }

            FeedState::FeedPostMeasureReservoir => {
                self.post_measure(SensorChannel::Reservoir, now_ms);
            }
        }

        self.motor
            .set_running(motor)
            .map_err(|e| eyre::eyre!("motor drive failed: {e}"))?;
        Ok(())
    }

    /// Replenish the deficit: one milligram every
    /// `86_400_000 / grams_per_day` milliseconds. A zero rate suspends
    /// accrual entirely.
    fn accrue_deficit(&mut self, delta_ms: u64) {
        self.deficit_ms_remain -= delta_ms as i64;
        while self.deficit_ms_remain < 0 {
            if self.grams_per_day <= 0 {
                self.deficit_ms_remain = 0;
                break;
            }
            self.deficit_ms_remain += 86_400_000 / i64::from(self.grams_per_day);
            self.deficit_mg += 1;
        }
    }

    fn transition(&mut self, new_state: FeedState) {
        if new_state == self.state {
            self.state_retries += 1;
        } else {
            self.state_retries = 0;
        }
        tracing::debug!(
            from = ?self.state,
            to = ?new_state,
            after_ms = self.ms_since_transition,
            retries = self.state_retries,
            mode = ?self.maintenance_mode,
            "transition"
        );
        match new_state {
            FeedState::IdleTareReservoir => {
                self.loadcell.start(SensorChannel::Reservoir, true);
            }
            FeedState::IdleTareBowl => {
                self.loadcell.start(SensorChannel::Bowl, true);
            }
            FeedState::IdleMeasureReservoir
            | FeedState::FeedPreMeasureReservoir
            | FeedState::FeedPostMeasureReservoir => {
                self.loadcell.start(SensorChannel::Reservoir, false);
            }
            FeedState::IdleMeasureBowl
            | FeedState::FeedPreMeasureBowl
            | FeedState::FeedPostMeasureBowl => {
                self.loadcell.start(SensorChannel::Bowl, false);
            }
            _ => {}
        }
        self.ms_since_transition = 0;
        self.state = new_state;
    }

    /// Handle the pending load-cell run. Returns true when the readout
    /// is finished, either with fresh values published or with the
    /// sensor-timeout flag raised.
    fn consume_loadcell_run(&mut self) -> bool {
        if self.flags.sensor_timeout || self.ms_since_transition > self.cfg.sensor_timeout_ms {
            self.flags.sensor_timeout = true;
            return true;
        }
        if self.loadcell.is_busy() {
            return false;
        }
        match self.loadcell.channel() {
            SensorChannel::Reservoir => {
                self.telemetry
                    .reservoir_mean
                    .set(self.loadcell.mean_g(), true);
                self.telemetry
                    .reservoir_stddev
                    .set(self.loadcell.stddev_g(), true);
                self.ms_since_reservoir_read = 0;
            }
            SensorChannel::Bowl => {
                self.telemetry.bowl_mean.set(self.loadcell.mean_g(), true);
                self.telemetry
                    .bowl_stddev
                    .set(self.loadcell.stddev_g(), true);
                self.ms_since_bowl_read = 0;
            }
        }
        true
    }

    /// Pre-feed measurement step for one channel. A noisy batch re-arms
    /// the same state a few times; persistent noise aborts the whole
    /// attempt (the animal is probably leaning on something) until the
    /// retry budget runs out, after which the feed proceeds in limp
    /// mode with an assumed portion.
    fn pre_measure(&mut self, channel: SensorChannel, now_ms: u64) {
        if self.flags.limp_cause().is_none() {
            if !self.consume_loadcell_run() {
                return;
            }
            if self.loadcell.stddev_g() < self.cfg.stddev_limit_g {
                match channel {
                    SensorChannel::Reservoir => {
                        self.feed_reservoir_pre = self.loadcell.mean_g();
                        self.transition(FeedState::FeedPreMeasureBowl);
                    }
                    SensorChannel::Bowl => {
                        self.feed_bowl_pre = self.loadcell.mean_g();
                        self.transition(FeedState::FeedRunSync);
                    }
                }
                return;
            }
            if self.state_retries < self.cfg.measure_retries {
                self.transition(self.state);
                return;
            }
            if self.sensor_retries <= self.cfg.max_feed_retries {
                self.ms_since_feed_attempt = 0;
                self.sensor_retries += 1;
                self.feed_report = FeedReport {
                    outcome: FeedOutcome::SensorRetry(self.sensor_retries),
                    at_ms: now_ms,
                };
                self.transition(FeedState::Idle);
                return;
            }
        }

        // Limp mode.
        match channel {
            SensorChannel::Reservoir => {
                self.flags.reservoir_noisy = true;
                self.transition(FeedState::FeedPreMeasureBowl);
            }
            SensorChannel::Bowl => {
                self.flags.bowl_noisy = true;
                self.transition(FeedState::FeedRunSync);
            }
        }
    }

    /// Post-feed measurement step. Unlike the pre-feed steps this never
    /// aborts; the feed already happened, so persistent noise just
    /// drops us into limp mode for the estimate.
    fn post_measure(&mut self, channel: SensorChannel, now_ms: u64) {
        if self.flags.limp_cause().is_none() {
            if !self.consume_loadcell_run() {
                return;
            }
            if self.loadcell.stddev_g() < self.cfg.stddev_limit_g {
                match channel {
                    SensorChannel::Bowl => {
                        self.feed_bowl_post = self.loadcell.mean_g();
                        self.transition(FeedState::FeedPostMeasureReservoir);
                    }
                    SensorChannel::Reservoir => {
                        self.feed_reservoir_post = self.loadcell.mean_g();
                        self.complete_feed(now_ms);
                    }
                }
                return;
            }
            if self.state_retries < self.cfg.measure_retries {
                self.transition(self.state);
                return;
            }
        }

        // Limp mode.
        match channel {
            SensorChannel::Bowl => {
                self.flags.bowl_noisy = true;
                self.transition(FeedState::FeedPostMeasureReservoir);
            }
            SensorChannel::Reservoir => {
                self.flags.reservoir_noisy = true;
                self.complete_feed(now_ms);
            }
        }
    }

    /// Motor-run edge wait with debounce; times out into open-loop
    /// completion with the limit-switch fault raised.
    fn run_edge(&mut self, limit: bool, want_engaged: bool, next: FeedState) {
        if limit == want_engaged && self.ms_since_transition > self.cfg.debounce_ms {
            self.transition(next);
        } else if self.ms_since_transition >= self.cfg.run_timeout_ms {
            self.flags.limit_switch = true;
            self.transition(FeedState::FeedPostWait);
        }
    }

    /// Estimate the dispensed weight from the pre/post deltas of both
    /// channels, falling back to the assumed portion when sensing is
    /// untrusted, the channels disagree, or the result is implausible.
    fn estimate_dispensed_g(&mut self) -> f32 {
        if self.flags.limp_cause().is_some() {
            return self.cfg.assumed_feed_g;
        }
        let from_reservoir = self.feed_reservoir_pre - self.feed_reservoir_post;
        let into_bowl = self.feed_bowl_post - self.feed_bowl_pre;
        if (from_reservoir - into_bowl).abs() > self.cfg.max_disagree_g {
            self.flags.sensor_disagree = true;
            return self.cfg.assumed_feed_g;
        }
        let dispensed = (from_reservoir + into_bowl) / 2.0;
        if dispensed < self.cfg.min_reasonable_g || dispensed > self.cfg.assumed_feed_g * 3.0 {
            self.flags.sensor_unreasonable = true;
            return self.cfg.assumed_feed_g;
        }
        dispensed
    }

    fn complete_feed(&mut self, now_ms: u64) {
        let dispensed_g = self.estimate_dispensed_g();

        // Too little dispensed means the hopper is probably empty or
        // jammed; escalate after a few attempts in a row. A normal
        // portion clears a previous jam verdict.
        if dispensed_g > self.cfg.assumed_feed_g * self.cfg.jam_fraction {
            self.jam_retries = 0;
            if self.maintenance_mode == MaintenanceMode::Jammed {
                self.maintenance_mode = MaintenanceMode::Operational;
            }
        } else {
            self.jam_retries += 1;
            if self.jam_retries >= self.cfg.max_feed_retries {
                self.maintenance_mode = MaintenanceMode::Jammed;
            }
        }

        let dispensed_mg = (dispensed_g * 1000.0) as i32;
        self.deficit_mg -= dispensed_mg;

        self.ms_since_feed_attempt = 0;
        self.sensor_retries = 0;
        self.feed_report = FeedReport {
            outcome: FeedOutcome::Success(dispensed_mg),
            at_ms: now_ms,
        };
        self.telemetry.last_feed_g.set(dispensed_g, true);
        tracing::info!(
            dispensed_g,
            deficit_mg = self.deficit_mg,
            jam_retries = self.jam_retries,
            "feed complete"
        );
        self.transition(FeedState::Idle);
    }

    /// Abandon any cycle in progress and stop the motor. For orderly
    /// application shutdown.
    pub fn halt(&mut self) -> Result<()> {
        self.transition(FeedState::Idle);
        self.motor
            .set_running(false)
            .map_err(|e| eyre::eyre!("motor drive failed: {e}"))?;
        Ok(())
    }

    /// Whether an automatic feed should start now, or why not.
    pub fn need_to_feed(&self) -> FeedBlock {
        match self.maintenance_mode {
            MaintenanceMode::Operational => {}
            MaintenanceMode::Maintenance => return FeedBlock::Maintenance,
            MaintenanceMode::Jammed => return FeedBlock::Jammed,
        }
        if self.deficit_mg < self.cfg.deficit_threshold_mg {
            return FeedBlock::Deficit;
        }
        if self.ms_since_feed_attempt < self.cfg.cooldown_ms {
            return FeedBlock::Cooldown;
        }
        FeedBlock::NotBlocked
    }

    /// Start a feeding cycle.
    pub fn feed(&mut self) {
        self.transition(FeedState::FeedPreMeasureWait);
    }

    /// Clear all faults and return to normal operation.
    pub fn reset(&mut self) {
        self.flags.reset();
        self.maintenance_mode = MaintenanceMode::Operational;
        self.transition(FeedState::Idle);
        self.state_retries = 0;
        self.jam_retries = 0;
        self.sensor_retries = 0;
    }

    /// Clear faults and enter maintenance mode.
    pub fn enter_maintenance(&mut self) {
        self.flags.reset();
        self.maintenance_mode = MaintenanceMode::Maintenance;
        self.transition(FeedState::Idle);
    }

    pub fn maintenance(&self) -> bool {
        self.maintenance_mode == MaintenanceMode::Maintenance
    }

    pub fn jammed(&self) -> bool {
        self.maintenance_mode == MaintenanceMode::Jammed
    }

    /// Enter maintenance and tare the empty reservoir after a settle
    /// window (the operator's hand is still on the unit).
    pub fn tare_reservoir(&mut self) {
        self.maintenance_mode = MaintenanceMode::Maintenance;
        self.transition(FeedState::IdleTareReservoirWait);
    }

    /// Enter maintenance and tare the empty bowl.
    pub fn tare_bowl(&mut self) {
        self.maintenance_mode = MaintenanceMode::Maintenance;
        self.transition(FeedState::IdleTareBowl);
    }

    pub fn deficit_mg(&self) -> i32 {
        self.deficit_mg
    }

    /// Adjust the feeding deficit. Positive values bring the next
    /// automatic feed forward; negative values account for food given
    /// by hand.
    pub fn adjust_deficit(&mut self, milligrams: i32) {
        self.deficit_mg += milligrams;
    }

    pub fn grams_per_day(&self) -> i32 {
        self.grams_per_day
    }

    /// Set the daily ration, clamped to the supported range. Takes
    /// effect at the next replenish tick.
    pub fn set_grams_per_day(&mut self, grams: i32) {
        self.grams_per_day = grams.clamp(0, 150);
    }

    pub fn state(&self) -> FeedState {
        self.state
    }

    pub fn feed_report(&self) -> &FeedReport {
        &self.feed_report
    }

    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    pub fn telemetry_mut(&mut self) -> &mut Telemetry {
        &mut self.telemetry
    }

    /// Highest-priority condition worth telling the operator about.
    pub fn error_report(&self) -> ErrorReport {
        let alert = if self.flags.limit_switch {
            Some(Alert::LimitSwitch)
        } else if let Some(cause) = self.flags.limp_cause() {
            Some(cause)
        } else if self.flags.power_loss {
            Some(Alert::PowerLoss)
        } else if self.maintenance_mode == MaintenanceMode::Jammed {
            Some(Alert::Jammed)
        } else if self.jam_retries > 0 {
            Some(Alert::JamSuspected)
        } else if *self.telemetry.reservoir_mean.get() < self.cfg.low_reservoir_g {
            Some(Alert::ReservoirLow)
        } else {
            None
        };
        ErrorReport { alert }
    }

    /// Structured status screen for a display front end.
    pub fn state_report(&self) -> StateReport {
        let mut rep = StateReport::default();
        let progress = match self.state {
            FeedState::Idle | FeedState::IdleMeasureReservoir | FeedState::IdleMeasureBowl => {
                if matches!(self.feed_report.outcome, FeedOutcome::Success(_))
                    && self.prev_now_ms.saturating_sub(self.feed_report.at_ms) < 10_000
                {
                    rep.header = "Feed result".into();
                    rep.detail1 = format!(
                        "R {:+7.1}g {:+7.1}g",
                        self.feed_reservoir_pre,
                        self.feed_reservoir_post - self.feed_reservoir_pre
                    );
                    rep.detail2 = format!(
                        "B {:+7.1}g {:+7.1}g",
                        self.feed_bowl_pre,
                        self.feed_bowl_post - self.feed_bowl_pre
                    );
                    return rep;
                }
                match self.need_to_feed() {
                    FeedBlock::Maintenance => {
                        rep.header = "Maintenance".into();
                        self.fill_weight_details(&mut rep);
                        return rep;
                    }
                    FeedBlock::Jammed => {
                        rep.detail1 = "JAMMED".into();
                        rep.large = true;
                        return rep;
                    }
                    FeedBlock::Cooldown => {
                        rep.header = "Cooldown".into();
                        let remain = self.cfg.cooldown_ms - self.ms_since_feed_attempt;
                        if remain < self.cfg.cooldown_ms {
                            rep.detail1 = report::countdown(remain);
                        }
                        rep.large = true;
                        return rep;
                    }
                    FeedBlock::Deficit => {
                        rep.header = "Deficit".into();
                        rep.detail1 =
                            format!("{}mg", self.deficit_mg - self.cfg.deficit_threshold_mg);
                        rep.large = true;
                        return rep;
                    }
                    FeedBlock::NotBlocked => 0,
                }
            }
            FeedState::IdleTareReservoirWait | FeedState::IdleTareReservoir => {
                rep.header = "Tare reservoir".into();
                self.fill_weight_details(&mut rep);
                return rep;
            }
            FeedState::IdleTareBowl => {
                rep.header = "Tare bowl".into();
                self.fill_weight_details(&mut rep);
                return rep;
            }
            FeedState::FeedPreMeasureWait => 0,
            FeedState::FeedPreMeasureReservoir => 1,
            FeedState::FeedPreMeasureBowl => 2,
            FeedState::FeedRunSync => 3,
            FeedState::FeedRunA => 4,
            FeedState::FeedRunB => 5,
            FeedState::FeedRunC => 6,
            FeedState::FeedPostWait => 7,
            FeedState::FeedPostMeasureBowl => 8,
            FeedState::FeedPostMeasureReservoir => 9,
        };
        rep.header = "Feeding".into();
        rep.detail1 = report::progress_bar(progress);
        rep.large = true;
        rep
    }

    fn fill_weight_details(&self, rep: &mut StateReport) {
        rep.detail1 = report::weight_line(
            *self.telemetry.reservoir_mean.get(),
            *self.telemetry.reservoir_stddev.get(),
        );
        rep.detail2 = report::weight_line(
            *self.telemetry.bowl_mean.get(),
            *self.telemetry.bowl_stddev.get(),
        );
    }
}
