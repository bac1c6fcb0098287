//! Telemetry and status rendering on stdout.

use feeder_core::{ErrorReport, StateReport, Telemetry};
use serde_json::json;

fn emit(field: &str, value: serde_json::Value) {
    println!("{}", json!({ "field": field, "value": value }));
}

/// Drain pending telemetry updates. In JSON mode each update becomes
/// one JSONL record; otherwise the updates are consumed silently (the
/// status screen covers the interactive case).
pub fn emit_telemetry(t: &mut Telemetry, json: bool) {
    macro_rules! drain {
        ($field:ident, $name:literal, $conv:expr) => {
            if let Some(v) = t.$field.take_update() {
                if json {
                    emit($name, $conv(v));
                }
            }
        };
    }
    drain!(reservoir_mean, "reservoir_weight_g", |v: f32| json!(v));
    drain!(reservoir_stddev, "reservoir_weight_stddev_g", |v: f32| json!(v));
    drain!(bowl_mean, "bowl_weight_g", |v: f32| json!(v));
    drain!(bowl_stddev, "bowl_weight_stddev_g", |v: f32| json!(v));
    drain!(deficit_g, "deficit_g", |v: f32| json!(v));
    drain!(last_feed_g, "last_feed_g", |v: f32| json!(v));
    drain!(grams_per_day, "grams_per_day", |v: i32| json!(v));
    drain!(feeding, "feeding", |v: bool| json!(v));
    drain!(maintenance, "maintenance", |v: bool| json!(v));
    drain!(jammed, "jammed", |v: bool| json!(v));
    drain!(error, "error", |v: &str| json!(v));
}

/// Render one status screen the way the device display would show it.
pub fn print_report(rep: &StateReport, err: &ErrorReport) {
    if rep.large {
        println!("[{:<14}] {}", rep.header, rep.detail1);
    } else {
        println!("[{:<14}] {}  {}", rep.header, rep.detail1, rep.detail2);
    }
    if err.alert.is_some() {
        println!("{:>16} ! {}", "", err.message());
    }
}
