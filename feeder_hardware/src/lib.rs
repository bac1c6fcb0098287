pub mod error;
#[cfg(feature = "hardware")]
pub mod gpio;
#[cfg(feature = "hardware")]
pub mod hx711;

use std::cell::RefCell;
use std::rc::Rc;

use feeder_traits::{Adc, LimitSwitch, Motor, SensorChannel};

/// Shared state of the simulated feeder mechanics.
///
/// Running the motor turns a cam that dispenses kibble from the
/// reservoir into the bowl and toggles the limit switch once per
/// revolution. One revolution takes about two seconds and moves about
/// nine grams, matching the reference unit.
#[derive(Debug)]
struct SimState {
    reservoir_g: f32,
    bowl_g: f32,
    cam_deg: f32,
    motor_on: bool,
    jammed: bool,
    switch_fault: bool,
    noise_state: u32,
}

impl SimState {
    fn tick(&mut self, dt_ms: u64) {
        if !self.motor_on {
            return;
        }
        let dt_s = dt_ms as f32 / 1000.0;
        self.cam_deg = (self.cam_deg + 180.0 * dt_s) % 360.0;
        if self.jammed {
            return;
        }
        let portion = (4.5 * dt_s).min(self.reservoir_g.max(0.0));
        self.reservoir_g -= portion;
        self.bowl_g += portion;
    }

    fn switch_engaged(&self) -> bool {
        !self.switch_fault && (90.0..270.0).contains(&self.cam_deg)
    }

    /// Small deterministic raw-count jitter (xorshift).
    fn noise(&mut self) -> i32 {
        let mut x = self.noise_state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.noise_state = x;
        (x % 5) as i32 - 2
    }
}

/// Simulated feeder rig: hands out ADC, motor, and limit-switch
/// endpoints that share one mechanical state. Advance the mechanics
/// with `tick` from the same loop that polls the controller.
#[derive(Clone)]
pub struct SimRig {
    state: Rc<RefCell<SimState>>,
    reservoir_gain: f32,
    reservoir_tare: i32,
    bowl_gain: f32,
    bowl_tare: i32,
}

impl SimRig {
    pub fn new(reservoir_g: f32, bowl_g: f32) -> Self {
        Self {
            state: Rc::new(RefCell::new(SimState {
                reservoir_g,
                bowl_g,
                cam_deg: 0.0,
                motor_on: false,
                jammed: false,
                switch_fault: false,
                noise_state: 0x2545_f491,
            })),
            reservoir_gain: -0.002_053_032_8,
            reservoir_tare: -754_589,
            bowl_gain: 0.003_227_107,
            bowl_tare: 31_485,
        }
    }

    /// Advance the mechanics by `dt_ms` of wall time.
    pub fn tick(&self, dt_ms: u64) {
        self.state.borrow_mut().tick(dt_ms);
    }

    /// Simulate an obstruction: the cam still turns but nothing drops.
    pub fn set_jammed(&self, jammed: bool) {
        self.state.borrow_mut().jammed = jammed;
    }

    /// Simulate a broken limit switch (never engages).
    pub fn set_switch_fault(&self, fault: bool) {
        self.state.borrow_mut().switch_fault = fault;
    }

    pub fn reservoir_g(&self) -> f32 {
        self.state.borrow().reservoir_g
    }

    pub fn bowl_g(&self) -> f32 {
        self.state.borrow().bowl_g
    }

    pub fn adc(&self) -> SimAdc {
        SimAdc {
            rig: self.clone(),
            channel: SensorChannel::Reservoir,
        }
    }

    pub fn motor(&self) -> SimMotor {
        SimMotor { rig: self.clone() }
    }

    pub fn limit_switch(&self) -> SimSwitch {
        SimSwitch { rig: self.clone() }
    }
}

/// Simulated weight-sensor ADC; a conversion is ready on every poll.
pub struct SimAdc {
    rig: SimRig,
    channel: SensorChannel,
}

impl Adc for SimAdc {
    fn select(&mut self, channel: SensorChannel) {
        self.channel = channel;
    }

    fn poll(&mut self) -> Result<Option<i32>, Box<dyn std::error::Error + Send + Sync>> {
        let mut st = self.rig.state.borrow_mut();
        let (grams, gain, tare) = match self.channel {
            SensorChannel::Reservoir => (st.reservoir_g, self.rig.reservoir_gain, self.rig.reservoir_tare),
            SensorChannel::Bowl => (st.bowl_g, self.rig.bowl_gain, self.rig.bowl_tare),
        };
        let raw = tare + (grams / gain) as i32 + st.noise();
        Ok(Some(raw))
    }
}

pub struct SimMotor {
    rig: SimRig,
}

impl Motor for SimMotor {
    fn set_running(&mut self, on: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut st = self.rig.state.borrow_mut();
        if st.motor_on != on {
            tracing::debug!(on, "sim motor");
        }
        st.motor_on = on;
        Ok(())
    }
}

pub struct SimSwitch {
    rig: SimRig,
}

impl LimitSwitch for SimSwitch {
    fn is_engaged(&mut self) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.rig.state.borrow().switch_engaged())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn motor_moves_kibble_from_reservoir_to_bowl() {
        let rig = SimRig::new(500.0, 10.0);
        rig.motor().set_running(true).unwrap();
        for _ in 0..20 {
            rig.tick(100);
        }
        assert!(rig.reservoir_g() < 500.0);
        assert!(rig.bowl_g() > 10.0);
        let total = rig.reservoir_g() + rig.bowl_g();
        assert!((total - 510.0).abs() < 1e-3);
    }

    // The cam turns at 180 deg/s and holds the switch over [90, 270).
    #[rstest]
    #[case::before_engage(400, false)]
    #[case::engaged(600, true)]
    #[case::released(1_600, false)]
    fn switch_follows_the_cam_angle(#[case] run_ms: u64, #[case] engaged: bool) {
        let rig = SimRig::new(500.0, 0.0);
        rig.motor().set_running(true).unwrap();
        rig.tick(run_ms);
        assert_eq!(rig.limit_switch().is_engaged().unwrap(), engaged);
    }

    #[test]
    fn jammed_rig_turns_without_dispensing() {
        let rig = SimRig::new(500.0, 0.0);
        rig.set_jammed(true);
        rig.motor().set_running(true).unwrap();
        rig.tick(2000);
        assert_eq!(rig.bowl_g(), 0.0);
    }

    #[test]
    fn adc_tracks_weight_through_calibration() {
        let rig = SimRig::new(400.0, 0.0);
        let mut adc = rig.adc();
        adc.select(SensorChannel::Reservoir);
        let raw = adc.poll().unwrap().unwrap();
        let grams = (raw - (-754_589)) as f32 * -0.002_053_032_8;
        assert!((grams - 400.0).abs() < 1.0, "got {grams}");
    }
}
