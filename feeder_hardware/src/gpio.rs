//! GPIO-backed motor and limit-switch endpoints.

use feeder_traits::{LimitSwitch, Motor};
use rppal::gpio::{Gpio, InputPin, OutputPin};

use crate::error::{HwError, Result};

fn gpio() -> Result<Gpio> {
    Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))
}

/// Single-pin feed motor drive, active high.
pub struct GpioMotor {
    pin: OutputPin,
}

impl GpioMotor {
    pub fn open(pin: u8) -> Result<Self> {
        let mut pin = gpio()?
            .get(pin)
            .map_err(|e| HwError::Gpio(e.to_string()))?
            .into_output();
        pin.set_low();
        Ok(Self { pin })
    }
}

impl Motor for GpioMotor {
    fn set_running(
        &mut self,
        on: bool,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if on {
            self.pin.set_high();
        } else {
            self.pin.set_low();
        }
        Ok(())
    }
}

/// Cam limit switch on a pulled-up input; the switch pulls the line
/// high while engaged.
pub struct GpioSwitch {
    pin: InputPin,
}

impl GpioSwitch {
    pub fn open(pin: u8) -> Result<Self> {
        let pin = gpio()?
            .get(pin)
            .map_err(|e| HwError::Gpio(e.to_string()))?
            .into_input_pullup();
        Ok(Self { pin })
    }
}

impl LimitSwitch for GpioSwitch {
    fn is_engaged(
        &mut self,
    ) -> std::result::Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.pin.is_high())
    }
}
