pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

/// Physical load-cell channel. Each channel has its own amplifier
/// configuration, tare offset, and gain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorChannel {
    Reservoir,
    Bowl,
}

/// Weight-sensor ADC with a non-blocking sample protocol.
///
/// `select` latches the amplifier configuration for a channel; the
/// first conversion after a switch belongs to the new channel. `poll`
/// returns `Ok(None)` when no conversion is ready yet and must never
/// block the control loop.
pub trait Adc {
    fn select(&mut self, channel: SensorChannel);

    fn poll(&mut self) -> Result<Option<i32>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Feed motor drive. `set_running` is idempotent; the controller
/// re-asserts the desired state every poll cycle.
pub trait Motor {
    fn set_running(&mut self, on: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Mechanical limit switch synchronizing one dispensing stroke.
/// `is_engaged` returns true while the cam holds the switch asserted.
pub trait LimitSwitch {
    fn is_engaged(&mut self) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;
}
