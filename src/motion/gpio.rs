//! PIR sensor on a Raspberry Pi GPIO pin.

use rppal::gpio::{Event, Gpio, InputPin, Trigger};
use tracing::{info, warn};

use super::{Edge, EdgeHandler, MotionSensor, SensorError};

/// A motion sensor wired to a BCM-numbered input pin with pull-down enabled.
pub struct GpioSensor {
    bcm: u8,
    pin: Option<InputPin>,
}

impl GpioSensor {
    pub fn open(bcm: u8) -> Result<Self, SensorError> {
        let pin = Gpio::new()?.get(bcm)?.into_input_pulldown();
        info!(pin = bcm, level = ?pin.read(), "motion sensor ready");

        Ok(Self {
            bcm,
            pin: Some(pin),
        })
    }
}

impl MotionSensor for GpioSensor {
    fn subscribe(&mut self, mut handler: EdgeHandler) -> Result<(), SensorError> {
        let pin = self.pin.as_mut().ok_or(SensorError::Released)?;

        pin.set_async_interrupt(Trigger::Both, None, move |event: Event| {
            let edge = match event.trigger {
                Trigger::RisingEdge => Edge::Rising,
                Trigger::FallingEdge => Edge::Falling,
                _ => return,
            };
            handler(edge);
        })?;

        info!(pin = self.bcm, "subscribed to motion edges");
        Ok(())
    }

    fn unsubscribe(&mut self) {
        let Some(mut pin) = self.pin.take() else {
            return;
        };

        if let Err(e) = pin.clear_async_interrupt() {
            warn!(pin = self.bcm, error = %e, "failed to clear motion interrupt");
        }
        info!(pin = self.bcm, "motion sensor released");
    }
}
