//! Shared test rig: feeder over the steady-level ADC, spy motor, and
//! shared-cell limit switch, stepped by a manual clock.
#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

use feeder_core::mocks::{SharedSwitch, SpyMotor, SteadyAdc, SteadyLevels};
use feeder_core::{ChannelCal, FeedCfg, FeedOutcome, FeedState, Feeder, LoadCellCal};
use feeder_traits::ManualClock;

pub struct Rig {
    pub feeder: Feeder<SteadyAdc, SpyMotor, SharedSwitch>,
    pub clock: ManualClock,
    pub levels: SteadyLevels,
    pub motor_on: Rc<Cell<bool>>,
    pub switch: Rc<Cell<bool>>,
}

/// 1 raw count = 1 g on both channels, zero tare.
pub fn unit_cal() -> LoadCellCal {
    LoadCellCal {
        reservoir: ChannelCal {
            gain_g_per_raw: 1.0,
            tare_raw: Some(0),
        },
        bowl: ChannelCal {
            gain_g_per_raw: 1.0,
            tare_raw: Some(0),
        },
    }
}

pub fn rig_with_cfg(reservoir_g: i32, bowl_g: i32, cfg: FeedCfg) -> Rig {
    let (adc, levels) = SteadyAdc::new(reservoir_g, bowl_g);
    let (motor, motor_on) = SpyMotor::new();
    let (switch, switch_cell) = SharedSwitch::new(false);
    let clock = ManualClock::new();
    let feeder = Feeder::builder()
        .with_adc(adc)
        .with_motor(motor)
        .with_limit_switch(switch)
        .with_clock(Box::new(clock.clone()))
        .with_calibration(unit_cal())
        .with_feed_cfg(cfg)
        .build()
        .unwrap();
    Rig {
        feeder,
        clock,
        levels,
        motor_on,
        switch: switch_cell,
    }
}

pub fn rig(reservoir_g: i32, bowl_g: i32) -> Rig {
    rig_with_cfg(reservoir_g, bowl_g, FeedCfg::default())
}

impl Rig {
    /// Advance the clock and run one poll-loop iteration.
    pub fn step(&mut self, ms: u64) {
        self.clock.advance_ms(ms);
        self.feeder.update().unwrap();
    }

    /// Step until the predicate holds; false if the budget runs out.
    pub fn step_until(
        &mut self,
        step_ms: u64,
        iters: usize,
        mut done: impl FnMut(&Feeder<SteadyAdc, SpyMotor, SharedSwitch>) -> bool,
    ) -> bool {
        for _ in 0..iters {
            self.step(step_ms);
            if done(&self.feeder) {
                return true;
            }
        }
        false
    }
}

/// Run one full feed cycle. With `switch_responds`, the limit switch
/// follows the cam (engage in run A, release in run B); otherwise it
/// stays released and the run times out open loop. `post` is applied
/// once when the cycle reaches the post-feed settle window, emulating
/// the kibble having moved.
pub fn run_feed_cycle(
    rig: &mut Rig,
    switch_responds: bool,
    post: impl FnOnce(&SteadyLevels),
) -> FeedOutcome {
    rig.feeder.feed();
    let mut post = Some(post);
    for _ in 0..20_000 {
        rig.step(10);
        match rig.feeder.state() {
            FeedState::FeedRunA if switch_responds => rig.switch.set(true),
            FeedState::FeedRunB if switch_responds => rig.switch.set(false),
            FeedState::FeedPostWait => {
                if let Some(apply) = post.take() {
                    apply(&rig.levels);
                }
            }
            FeedState::Idle => return rig.feeder.feed_report().outcome,
            _ => {}
        }
    }
    panic!("feed cycle did not finish");
}
