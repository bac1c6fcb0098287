//! Test doubles for the hardware traits. Kept public so integration
//! tests and the simulator front end can share them.

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use feeder_traits::{Adc, LimitSwitch, Motor, SensorChannel};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared knobs for [`SteadyAdc`], adjustable while the feeder owns
/// the ADC.
#[derive(Clone)]
pub struct SteadyLevels {
    pub reservoir_raw: Rc<Cell<i32>>,
    pub bowl_raw: Rc<Cell<i32>>,
    pub reservoir_noise: Rc<Cell<i32>>,
    pub bowl_noise: Rc<Cell<i32>>,
}

/// ADC returning a settable raw level per channel, with a deterministic
/// alternating-sign noise term so a batch's mean stays at the level
/// while its spread scales with the noise amplitude.
pub struct SteadyAdc {
    channel: SensorChannel,
    levels: SteadyLevels,
    flip: bool,
}

impl SteadyAdc {
    pub fn new(reservoir_raw: i32, bowl_raw: i32) -> (Self, SteadyLevels) {
        let levels = SteadyLevels {
            reservoir_raw: Rc::new(Cell::new(reservoir_raw)),
            bowl_raw: Rc::new(Cell::new(bowl_raw)),
            reservoir_noise: Rc::new(Cell::new(0)),
            bowl_noise: Rc::new(Cell::new(0)),
        };
        (
            Self {
                channel: SensorChannel::Reservoir,
                levels: levels.clone(),
                flip: false,
            },
            levels,
        )
    }
}

impl Adc for SteadyAdc {
    fn select(&mut self, channel: SensorChannel) {
        self.channel = channel;
    }

    fn poll(&mut self) -> Result<Option<i32>, BoxError> {
        let (raw, noise) = match self.channel {
            SensorChannel::Reservoir => (
                self.levels.reservoir_raw.get(),
                self.levels.reservoir_noise.get(),
            ),
            SensorChannel::Bowl => {
                (self.levels.bowl_raw.get(), self.levels.bowl_noise.get())
            }
        };
        self.flip = !self.flip;
        Ok(Some(if self.flip { raw + noise } else { raw - noise }))
    }
}

/// ADC replaying a fixed script of raw readings; returns `Ok(None)`
/// (conversion not ready) once the script is exhausted.
#[derive(Default)]
pub struct ScriptedAdc {
    pub readings: VecDeque<i32>,
    pub selected: Option<SensorChannel>,
}

impl ScriptedAdc {
    pub fn new(readings: impl IntoIterator<Item = i32>) -> Self {
        Self {
            readings: readings.into_iter().collect(),
            selected: None,
        }
    }
}

impl Adc for ScriptedAdc {
    fn select(&mut self, channel: SensorChannel) {
        self.selected = Some(channel);
    }

    fn poll(&mut self) -> Result<Option<i32>, BoxError> {
        Ok(self.readings.pop_front())
    }
}

/// Motor recording the last commanded state through a shared cell.
pub struct SpyMotor {
    running: Rc<Cell<bool>>,
}

impl SpyMotor {
    pub fn new() -> (Self, Rc<Cell<bool>>) {
        let running = Rc::new(Cell::new(false));
        (
            Self {
                running: running.clone(),
            },
            running,
        )
    }
}

impl Motor for SpyMotor {
    fn set_running(&mut self, on: bool) -> Result<(), BoxError> {
        self.running.set(on);
        Ok(())
    }
}

/// Motor whose driver always reports a fault.
pub struct FailingMotor;

impl Motor for FailingMotor {
    fn set_running(&mut self, _on: bool) -> Result<(), BoxError> {
        Err("motor driver fault".into())
    }
}

/// Limit switch whose engaged state is driven through a shared cell.
pub struct SharedSwitch {
    engaged: Rc<Cell<bool>>,
}

impl SharedSwitch {
    pub fn new(engaged: bool) -> (Self, Rc<Cell<bool>>) {
        let cell = Rc::new(Cell::new(engaged));
        (
            Self {
                engaged: cell.clone(),
            },
            cell,
        )
    }
}

impl LimitSwitch for SharedSwitch {
    fn is_engaged(&mut self) -> Result<bool, BoxError> {
        Ok(self.engaged.get())
    }
}

/// Limit switch whose input always reads as faulted.
pub struct FailingSwitch;

impl LimitSwitch for FailingSwitch {
    fn is_engaged(&mut self) -> Result<bool, BoxError> {
        Err("limit switch input fault".into())
    }
}
