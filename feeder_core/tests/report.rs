//! Status screens and error reporting priority.

mod common;

use common::{rig, run_feed_cycle};
use feeder_core::{Alert, FeedState, Severity};

#[test]
fn boot_reports_power_loss_until_reset() {
    let mut rig = rig(1000, 10);
    assert_eq!(rig.feeder.error_report().alert, Some(Alert::PowerLoss));
    assert_eq!(rig.feeder.error_report().severity(), Severity::Error);

    // Measure the reservoir so the low-reservoir warning has fresh
    // data to look at, then acknowledge the boot.
    rig.feeder.enter_maintenance();
    assert!(rig.step_until(10, 200, |f| f.state() == FeedState::Idle));
    rig.feeder.reset();
    assert_eq!(rig.feeder.error_report().alert, None);
    assert_eq!(rig.feeder.error_report().severity(), Severity::Okay);
}

#[test]
fn low_reservoir_warns_after_reset() {
    let mut rig = rig(200, 10);
    rig.feeder.enter_maintenance();
    assert!(rig.step_until(10, 200, |f| f.state() == FeedState::Idle));
    rig.feeder.reset();
    assert_eq!(rig.feeder.error_report().alert, Some(Alert::ReservoirLow));
    assert_eq!(rig.feeder.error_report().severity(), Severity::Warning);
    assert_eq!(rig.feeder.error_report().message(), "Reservoir low");
}

#[test]
fn limit_switch_fault_outranks_sensor_faults() {
    let mut rig = rig(1000, 10);

    // Unresponsive switch and disagreeing sensors in the same feed.
    run_feed_cycle(&mut rig, false, |levels| {
        levels.reservoir_raw.set(991);
        levels.bowl_raw.set(11);
    });

    assert_eq!(rig.feeder.error_report().alert, Some(Alert::LimitSwitch));
}

#[test]
fn cooldown_screen_counts_down() {
    let mut rig = rig(1000, 10);
    rig.step(1_000);

    let report = rig.feeder.state_report();
    assert_eq!(report.header, "Cooldown");
    assert_eq!(report.detail1, "4:59");
    assert!(report.large);
}

#[test]
fn deficit_screen_shows_the_shortfall() {
    let mut rig = rig(1000, 10);
    // Suspend accrual so the shortfall stays put while stepping.
    rig.feeder.set_grams_per_day(0);
    rig.feeder.adjust_deficit(-5000);
    rig.step(10);

    let report = rig.feeder.state_report();
    assert_eq!(report.header, "Deficit");
    assert_eq!(report.detail1, "-5000mg");
    assert!(report.large);
}

#[test]
fn maintenance_screen_shows_both_weights() {
    let mut rig = rig(1000, 10);
    rig.feeder.enter_maintenance();
    assert!(rig.step_until(10, 200, |f| f.state() == FeedState::Idle));
    assert!(rig.step_until(10, 200, |f| f.state() == FeedState::Idle));

    let report = rig.feeder.state_report();
    assert_eq!(report.header, "Maintenance");
    assert!(report.detail1.contains("g +/-"));
    assert!(report.detail2.contains("g +/-"));
    assert!(!report.large);
}

#[test]
fn feeding_screen_shows_progress() {
    let mut rig = rig(1000, 10);
    rig.feeder.feed();
    rig.step(10);

    let report = rig.feeder.state_report();
    assert_eq!(report.header, "Feeding");
    assert_eq!(report.detail1, "----------");
    assert!(report.large);

    assert!(rig.step_until(10, 1_000, |f| {
        f.state() == FeedState::FeedRunSync
    }));
    assert_eq!(rig.feeder.state_report().detail1, "###-------");
}

#[test]
fn tare_screens_are_labelled() {
    let mut rig = rig(1000, 10);
    rig.feeder.tare_reservoir();
    assert_eq!(rig.feeder.state_report().header, "Tare reservoir");

    rig.feeder.tare_bowl();
    assert_eq!(rig.feeder.state_report().header, "Tare bowl");
}
