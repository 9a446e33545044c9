//! Motion sensor: a stream of high/low edges from a PIR detector.
//!
//! The controller subscribes once at startup and unsubscribes at shutdown.
//! Edges arrive on the sensor driver's own thread.

#[cfg(feature = "gpio")]
mod gpio;

#[cfg(feature = "gpio")]
pub use gpio::GpioSensor;

/// A transition reported by the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Inactive to active: motion detected now.
    Rising,
    /// Active to inactive.
    Falling,
}

/// Callback invoked once per edge.
pub type EdgeHandler = Box<dyn FnMut(Edge) + Send + 'static>;

/// Errors that can occur while talking to the sensor.
#[derive(Debug, thiserror::Error)]
pub enum SensorError {
    #[cfg(feature = "gpio")]
    #[error("GPIO error: {0}")]
    Gpio(#[from] rppal::gpio::Error),

    #[error("sensor has already been released")]
    Released,
}

/// A source of motion edges.
pub trait MotionSensor {
    /// Start delivering edges to `handler`.
    fn subscribe(&mut self, handler: EdgeHandler) -> Result<(), SensorError>;

    /// Stop delivering edges and release the hardware. Safe to call twice.
    fn unsubscribe(&mut self);
}
