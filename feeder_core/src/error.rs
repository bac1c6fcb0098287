//! Error taxonomy: sticky flags, prioritized alerts, build errors.

use thiserror::Error;

/// Severity level for an error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Okay,
    Warning,
    Error,
}

/// A reportable condition, ordered by priority (highest first).
/// Messages are capped at 20 characters for the display collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alert {
    /// Limit switch gave no feedback within the motor-run timeout.
    LimitSwitch,
    /// Load-cell readout produced no result within its timeout.
    SensorTimeout,
    /// Reservoir readings too noisy to trust.
    ReservoirNoisy,
    /// Bowl readings too noisy to trust.
    BowlNoisy,
    /// Reservoir and bowl deltas disagree beyond tolerance.
    SensorDisagree,
    /// Dispensed-weight estimate outside the plausible window.
    SensorUnreasonable,
    /// Power was lost since the last operator reset.
    PowerLoss,
    /// Repeated under-dispensing; feeding stopped.
    Jammed,
    /// Recent feeds dispensed too little; not yet escalated.
    JamSuspected,
    /// Reservoir weight below the refill threshold.
    ReservoirLow,
}

impl Alert {
    pub fn message(&self) -> &'static str {
        match self {
            Alert::LimitSwitch => "Motor timeout",
            Alert::SensorTimeout => "Sensor timeout",
            Alert::ReservoirNoisy => "Reservoir noisy",
            Alert::BowlNoisy => "Bowl noisy",
            Alert::SensorDisagree => "Sensor disagree",
            Alert::SensorUnreasonable => "Sensor sanity",
            Alert::PowerLoss => "Power loss",
            Alert::Jammed => "Jammed/empty",
            Alert::JamSuspected => "Jammed/empty?",
            Alert::ReservoirLow => "Reservoir low",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Alert::JamSuspected | Alert::ReservoirLow => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl core::fmt::Display for Alert {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.message())
    }
}

/// Highest-priority condition plus its severity; `None` means OKAY.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorReport {
    pub alert: Option<Alert>,
}

impl ErrorReport {
    pub fn severity(&self) -> Severity {
        self.alert.map_or(Severity::Okay, |a| a.severity())
    }

    /// Message for publishing; falls back to "No error".
    pub fn message(&self) -> &'static str {
        self.alert.map_or("No error", |a| a.message())
    }
}

/// Sticky fault flags. A transient glitch stays visible until the
/// operator acknowledges it via reset or enter-maintenance.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorFlags {
    /// Excessive standard deviation in reservoir weight readout.
    pub reservoir_noisy: bool,
    /// Excessive standard deviation in bowl weight readout.
    pub bowl_noisy: bool,
    /// Load-cell readout timed out.
    pub sensor_timeout: bool,
    /// Reservoir and bowl deltas disagreed during a feed.
    pub sensor_disagree: bool,
    /// Dispensed-weight estimate failed the sanity window.
    pub sensor_unreasonable: bool,
    /// Motor limit switch gave no feedback in time.
    pub limit_switch: bool,
    /// Power has been lost since the last reset.
    pub power_loss: bool,
}

impl ErrorFlags {
    /// Boot state: power is always assumed to have been lost.
    pub fn at_boot() -> Self {
        Self {
            power_loss: true,
            ..Self::default()
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Why weight sensing is untrusted, if it is. Any cause here puts
    /// feeding in limp mode (fixed assumed portion weight).
    pub fn limp_cause(&self) -> Option<Alert> {
        if self.sensor_timeout {
            Some(Alert::SensorTimeout)
        } else if self.reservoir_noisy {
            Some(Alert::ReservoirNoisy)
        } else if self.bowl_noisy {
            Some(Alert::BowlNoisy)
        } else if self.sensor_disagree {
            Some(Alert::SensorDisagree)
        } else if self.sensor_unreasonable {
            Some(Alert::SensorUnreasonable)
        } else {
            None
        }
    }
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing adc")]
    MissingAdc,
    #[error("missing motor")]
    MissingMotor,
    #[error("missing limit switch")]
    MissingLimitSwitch,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
