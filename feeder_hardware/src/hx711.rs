use feeder_traits::{Adc, SensorChannel};
use tracing::trace;

use crate::error::{HwError, Result};

/// Gain pulses appended after each 24-bit read select the amplifier
/// configuration of the next conversion: 25 = channel A gain 128
/// (reservoir), 26 = channel B gain 32 (bowl).
fn gain_pulses(channel: SensorChannel) -> u8 {
    match channel {
        SensorChannel::Reservoir => 25,
        SensorChannel::Bowl => 26,
    }
}

/// Bit-banged HX711 driver wired to both load cells.
///
/// Polling protocol: a conversion is ready when DT is low; reading
/// clocks out 24 bits and programs the gain for the next conversion.
/// Never blocks waiting for DT.
pub struct Hx711 {
    dt: rppal::gpio::InputPin,
    sck: rppal::gpio::OutputPin,
    channel: SensorChannel,
    /// Conversions still carrying the previous channel's amplifier
    /// setting after a select; discarded.
    discard: u8,
}

impl Hx711 {
    /// Claim the DT/SCK pins by BCM number.
    pub fn open(dt_pin: u8, sck_pin: u8) -> Result<Self> {
        let gpio = rppal::gpio::Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
        let dt = gpio
            .get(dt_pin)
            .map_err(|e| HwError::Gpio(e.to_string()))?
            .into_input();
        let sck = gpio
            .get(sck_pin)
            .map_err(|e| HwError::Gpio(e.to_string()))?
            .into_output();
        Self::new(dt, sck)
    }

    pub fn new(dt_pin: rppal::gpio::InputPin, mut sck_pin: rppal::gpio::OutputPin) -> Result<Self> {
        sck_pin.set_low(); // clock idle low
        Ok(Self {
            dt: dt_pin,
            sck: sck_pin,
            channel: SensorChannel::Reservoir,
            discard: 1,
        })
    }

    fn read_bits(&mut self) -> i32 {
        let mut value: i32 = 0;
        for _ in 0..24 {
            self.sck.set_high();
            spin_delay_100ns();
            value = (value << 1) | i32::from(self.dt.is_high());
            self.sck.set_low();
            spin_delay_100ns();
        }
        for _ in 0..gain_pulses(self.channel) - 24 {
            self.sck.set_high();
            spin_delay_100ns();
            self.sck.set_low();
            spin_delay_100ns();
        }
        // Sign extend 24-bit
        if (value & 0x80_0000) != 0 {
            value |= !0xFF_FFFF;
        }
        value
    }
}

impl Adc for Hx711 {
    fn select(&mut self, channel: SensorChannel) {
        if self.channel != channel {
            self.channel = channel;
            // The next conversion still uses the old amplifier setting.
            self.discard = 1;
        }
    }

    fn poll(&mut self) -> std::result::Result<Option<i32>, Box<dyn std::error::Error + Send + Sync>> {
        if self.dt.is_high() {
            return Ok(None);
        }
        let value = self.read_bits();
        if self.discard > 0 {
            self.discard -= 1;
            trace!(raw = value, "hx711 discard after channel switch");
            return Ok(None);
        }
        trace!(raw = value, "hx711 raw read");
        Ok(Some(value))
    }
}

#[inline(always)]
fn spin_delay_100ns() {
    // A few CPU cycles is enough at HX711 clock rates.
    std::hint::spin_loop();
}
