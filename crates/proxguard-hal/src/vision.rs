//! Generic `VisionSensor` trait for camera pipelines that already reduce
//! frames to changed-region contours.

use proxguard_types::{MotionSummary, ProxError};

/// A camera pipeline that yields one [`MotionSummary`] per call.
pub trait VisionSensor: Send {
    /// Stable identifier for this pipeline, e.g. `"front_rgb"`.
    fn id(&self) -> &str;

    /// Capture the next frame and return its contour summary.
    ///
    /// # Errors
    ///
    /// Returns [`ProxError::SensorFault`] if the frame cannot be captured
    /// (device disconnected, buffer unavailable, …).
    fn sample(&mut self) -> Result<MotionSummary, ProxError>;
}
