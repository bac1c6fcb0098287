#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas for the feeder.
//!
//! `Config` and sub-structs are deserialized from TOML and validated.
//! Calibration values here are factory seeds only: the controller
//! assumes power was lost on every start and re-tares (or accepts
//! these defaults) at runtime. Nothing is written back.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Pins {
    /// HX711 data pin (DT)
    pub adc_dt: u8,
    /// HX711 clock pin (SCK)
    pub adc_sck: u8,
    /// Feed motor drive pin
    pub motor: u8,
    /// Auger limit switch input
    pub limit_switch: u8,
}

impl Default for Pins {
    fn default() -> Self {
        Self {
            adc_dt: 5,
            adc_sck: 6,
            motor: 13,
            limit_switch: 19,
        }
    }
}

/// Per-channel calibration seed: raw→grams gain plus an optional tare
/// baseline in raw counts. A missing tare forces self-calibration on
/// the channel's first averaging run.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct ChannelCal {
    /// grams per raw count; sign depends on load-cell orientation
    pub gain_g_per_raw: f32,
    /// tare zero in raw counts
    #[serde(default)]
    pub tare_raw: Option<i32>,
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Calibration {
    pub reservoir: ChannelCal,
    pub bowl: ChannelCal,
}

impl Default for Calibration {
    fn default() -> Self {
        // Factory constants measured on the reference unit.
        Self {
            reservoir: ChannelCal {
                gain_g_per_raw: -0.002_053_032_8,
                tare_raw: Some(-754_589),
            },
            bowl: ChannelCal {
                gain_g_per_raw: 0.003_227_107,
                tare_raw: Some(31_485),
            },
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Feeding {
    /// Daily ration target in grams (0 disables deficit accrual).
    pub grams_per_day: i32,
    /// Minimum time between feed attempts (ms).
    pub cooldown_ms: u64,
    /// Deficit level at which auto-feed becomes eligible (mg).
    pub deficit_threshold_mg: i32,
}

impl Default for Feeding {
    fn default() -> Self {
        Self {
            grams_per_day: 60,
            cooldown_ms: 5 * 60 * 1000,
            deficit_threshold_mg: 0,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub pins: Pins,
    pub calibration: Calibration,
    pub feeding: Feeding,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    /// Validate ranges that the deserializer cannot express.
    pub fn validate(&self) -> eyre::Result<()> {
        for (name, cal) in [
            ("reservoir", self.calibration.reservoir),
            ("bowl", self.calibration.bowl),
        ] {
            if !cal.gain_g_per_raw.is_finite() || cal.gain_g_per_raw == 0.0 {
                eyre::bail!("calibration.{name}.gain_g_per_raw must be finite and non-zero");
            }
        }
        if !(0..=150).contains(&self.feeding.grams_per_day) {
            eyre::bail!(
                "feeding.grams_per_day out of range 0..=150: {}",
                self.feeding.grams_per_day
            );
        }
        if self.feeding.cooldown_ms == 0 {
            eyre::bail!("feeding.cooldown_ms must be >= 1");
        }
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got {rot}");
        }
        Ok(())
    }
}
