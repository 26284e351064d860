//! Generic `RangeSensor` trait for distance-measuring hardware (ultrasonic
//! pingers, time-of-flight modules, …).

use proxguard_types::ProxError;

/// A device that produces one distance reading per call.
pub trait RangeSensor: Send {
    /// Stable identifier for this sensor, e.g. `"front_ultrasonic"`.
    fn id(&self) -> &str;

    /// Take one reading, in centimetres.
    ///
    /// Out-of-range values are returned as-is; filtering them is the
    /// tracker's job.
    ///
    /// # Errors
    ///
    /// Returns [`ProxError::SensorFault`] if no reading could be taken at
    /// all (echo timeout, bus error, …).
    fn measure(&mut self) -> Result<f64, ProxError>;
}
