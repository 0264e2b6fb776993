//! Raspberry Pi GPIO probe for the two monitored lines.
//!
//! Passive only: both pins stay inputs for the process lifetime; the probe
//! never drives the bus. Clock interrupts fire on the rising (data-valid)
//! edge, data interrupts on both edges, matching the `EdgeSource` contract.

use std::time::Duration;

use rppal::gpio::{Gpio, InputPin, Level as PinLevel, Trigger};

use crate::error::HwError;
use drywatch_traits::{BusLine, EdgeEvent, EdgeSource, Level};

fn level(l: PinLevel) -> Level {
    match l {
        PinLevel::High => Level::High,
        PinLevel::Low => Level::Low,
    }
}

pub struct GpioProbe {
    gpio: Gpio,
    scl: InputPin,
    sda: InputPin,
}

impl GpioProbe {
    pub fn new(scl_pin: u8, sda_pin: u8, pullup: bool) -> Result<Self, HwError> {
        let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;

        let get_input = |pin: u8| -> Result<InputPin, HwError> {
            let pin = gpio.get(pin).map_err(|e| HwError::Gpio(e.to_string()))?;
            Ok(if pullup {
                pin.into_input_pullup()
            } else {
                pin.into_input()
            })
        };

        let mut scl = get_input(scl_pin)?;
        let mut sda = get_input(sda_pin)?;

        scl.set_interrupt(Trigger::RisingEdge)
            .map_err(|e| HwError::Gpio(e.to_string()))?;
        sda.set_interrupt(Trigger::Both)
            .map_err(|e| HwError::Gpio(e.to_string()))?;

        tracing::info!(scl_pin, sda_pin, pullup, "gpio probe attached");
        Ok(Self { gpio, scl, sda })
    }
}

impl EdgeSource for GpioProbe {
    fn next_edge(
        &mut self,
        timeout: Duration,
    ) -> Result<Option<EdgeEvent>, Box<dyn std::error::Error + Send + Sync>> {
        let polled = self
            .gpio
            .poll_interrupts(&[&self.scl, &self.sda], false, Some(timeout))
            .map_err(|e| Box::new(HwError::Gpio(e.to_string())))?;

        let Some((pin, pin_level)) = polled else {
            return Ok(None);
        };

        let event = if pin.pin() == self.scl.pin() {
            EdgeEvent {
                line: BusLine::Clock,
                scl: level(pin_level),
                sda: level(self.sda.read()),
            }
        } else {
            EdgeEvent {
                line: BusLine::Data,
                scl: level(self.scl.read()),
                sda: level(pin_level),
            }
        };
        Ok(Some(event))
    }
}
