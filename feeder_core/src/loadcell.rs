//! Load-cell driver: noise-averaged, calibrated weight readings per
//! sensor channel over a non-blocking sample/poll protocol.

use feeder_traits::{Adc, SensorChannel};

/// Raw readings averaged per run. Fixed batch size rejects transient
/// mechanical and animal-induced noise.
pub const NUM_SAMPLES: usize = 32;

/// Calibration for one channel: raw→grams gain and tare baseline.
/// `tare_raw == None` marks a never-tared channel; its first completed
/// run self-calibrates.
#[derive(Debug, Clone, Copy)]
pub struct ChannelCal {
    pub gain_g_per_raw: f32,
    pub tare_raw: Option<i32>,
}

/// Per-channel calibration pair. Defaults come from the config
/// crate's factory seeds, which are the single source of the
/// reference unit's constants.
#[derive(Debug, Clone, Copy)]
pub struct LoadCellCal {
    pub reservoir: ChannelCal,
    pub bowl: ChannelCal,
}

impl Default for LoadCellCal {
    fn default() -> Self {
        feeder_config::Calibration::default().into()
    }
}

impl From<feeder_config::ChannelCal> for ChannelCal {
    fn from(c: feeder_config::ChannelCal) -> Self {
        Self {
            gain_g_per_raw: c.gain_g_per_raw,
            tare_raw: c.tare_raw,
        }
    }
}

impl From<feeder_config::Calibration> for LoadCellCal {
    fn from(c: feeder_config::Calibration) -> Self {
        Self {
            reservoir: c.reservoir.into(),
            bowl: c.bowl.into(),
        }
    }
}

impl LoadCellCal {
    fn channel_mut(&mut self, channel: SensorChannel) -> &mut ChannelCal {
        match channel {
            SensorChannel::Reservoir => &mut self.reservoir,
            SensorChannel::Bowl => &mut self.bowl,
        }
    }
}

/// Averaging load-cell front end over a raw weight-sensor ADC.
///
/// A run is armed with `start` and advanced by polling `update` from
/// the control loop; results stay stale until the next run completes.
pub struct LoadCell<A: Adc> {
    adc: A,
    cal: LoadCellCal,
    samples: [i32; NUM_SAMPLES],
    remaining: usize,
    channel: SensorChannel,
    apply_tare: bool,
    mean_g: f32,
    stddev_g: f32,
    mean_raw: i32,
}

impl<A: Adc> LoadCell<A> {
    pub fn new(adc: A, cal: LoadCellCal) -> Self {
        Self {
            adc,
            cal,
            samples: [0; NUM_SAMPLES],
            remaining: 0,
            channel: SensorChannel::Reservoir,
            apply_tare: false,
            mean_g: 0.0,
            stddev_g: 0.0,
            mean_raw: 0,
        }
    }

    /// Start averaging for the given channel, superseding any run in
    /// progress. With `tare`, this run's raw mean becomes the new tare
    /// baseline (so the run itself reads about zero grams).
    pub fn start(&mut self, channel: SensorChannel, tare: bool) {
        self.adc.select(channel);
        self.channel = channel;
        self.apply_tare = tare;
        self.remaining = NUM_SAMPLES;
    }

    /// Non-blocking poll; collects at most one sample per call.
    ///
    /// ADC errors are logged and the sample skipped; a persistently
    /// dead ADC surfaces through the controller's sensor timeout.
    pub fn update(&mut self) {
        if self.remaining == 0 {
            return;
        }
        let raw = match self.adc.poll() {
            Ok(Some(raw)) => raw,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!(error = %e, channel = ?self.channel, "adc poll failed");
                return;
            }
        };
        self.remaining -= 1;
        self.samples[self.remaining] = raw;
        if self.remaining > 0 {
            return;
        }

        // Integer mean (rounded) and population variance of the batch.
        let n = NUM_SAMPLES as i64;
        let mut accum: i64 = n / 2;
        for s in &self.samples {
            accum += i64::from(*s);
        }
        let mean_raw = (accum / n) as i32;
        let mut accum: i64 = n / 2;
        for s in &self.samples {
            let diff = i64::from(*s) - i64::from(mean_raw);
            accum += diff * diff;
        }
        let variance = accum as f32 / NUM_SAMPLES as f32;

        self.mean_raw = mean_raw;
        let cal = self.cal.channel_mut(self.channel);
        if self.apply_tare || cal.tare_raw.is_none() {
            cal.tare_raw = Some(mean_raw);
        }
        let tare = cal.tare_raw.unwrap_or(mean_raw);
        self.mean_g = (i64::from(mean_raw) - i64::from(tare)) as f32 * cal.gain_g_per_raw;
        self.stddev_g = variance.sqrt() * cal.gain_g_per_raw.abs();
        tracing::debug!(
            channel = ?self.channel,
            mean_raw,
            mean_g = self.mean_g,
            stddev_g = self.stddev_g,
            "loadcell run complete"
        );
    }

    /// True while samples remain in the current run.
    pub fn is_busy(&self) -> bool {
        self.remaining > 0
    }

    /// Mean of the last completed run (g).
    pub fn mean_g(&self) -> f32 {
        self.mean_g
    }

    /// Standard deviation of the last completed run (g).
    pub fn stddev_g(&self) -> f32 {
        self.stddev_g
    }

    /// Channel of the most recent run.
    pub fn channel(&self) -> SensorChannel {
        self.channel
    }

    /// Mean of the last completed run in raw measurement units.
    pub fn mean_raw(&self) -> i32 {
        self.mean_raw
    }

    /// Pre-seed the tare baseline for a channel (boot calibration).
    pub fn set_tare_raw(&mut self, channel: SensorChannel, raw: i32) {
        self.cal.channel_mut(channel).tare_raw = Some(raw);
    }
}
