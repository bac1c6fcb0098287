#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core feeding logic (hardware-agnostic).
//!
//! This crate holds the feed controller: the dispensing state machine,
//! deficit-based scheduling, jam detection, the averaging load-cell
//! driver, and the prioritized error taxonomy. All hardware access
//! goes through the `feeder_traits` Adc/Motor/LimitSwitch traits, so
//! the whole controller runs unchanged against real pins, the
//! simulator, or test doubles.
//!
//! ## Architecture
//!
//! - **Load cell**: batch-averaged, calibrated weight readout
//!   (`loadcell` module)
//! - **Controller**: feed cycle state machine and scheduling
//!   (`feeder` module)
//! - **Errors**: sticky fault flags and prioritized alerts (`error`
//!   module)
//! - **Telemetry**: change/force-latched published values
//!   (`telemetry` module)
//! - **Reports**: structured status screens (`report` module)
//!
//! Weights are `f32` grams at the API; the deficit ledger is integer
//! milligrams for drift-free bookkeeping.

pub mod builder;
pub mod config;
pub mod error;
pub mod feeder;
pub mod loadcell;
pub mod mocks;
pub mod report;
pub mod status;
pub mod telemetry;

pub use builder::FeederBuilder;
pub use config::FeedCfg;
pub use error::{Alert, BuildError, ErrorFlags, ErrorReport, Result, Severity};
pub use feeder::{FeedBlock, FeedState, Feeder, MaintenanceMode};
pub use loadcell::{ChannelCal, LoadCell, LoadCellCal, NUM_SAMPLES};
pub use report::StateReport;
pub use status::{FeedOutcome, FeedReport};
pub use telemetry::{Published, Telemetry};
