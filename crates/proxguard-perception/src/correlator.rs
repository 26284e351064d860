//! [`SensorCorrelator`] – cross-sensor agreement gate.
//!
//! Keeps the last few ranging velocities and vision assessments side by
//! side. The two sensors are considered to agree that an object is
//! approaching when **any** ranging entry in the window closes faster than
//! the approach speed and **any** vision entry flags an approach. Matching
//! on "any" instead of "latest" tolerates one sensor leading the other by a
//! tick or two.

use proxguard_types::VisionAssessment;

use crate::config::CorrelatorConfig;
use crate::window::RollingWindow;

/// One ranging sample in the correlation window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeSample {
    pub distance_cm: f64,
    /// Instantaneous velocity from the previous tick, cm/s.
    pub velocity_cm_s: f64,
}

#[derive(Debug)]
pub struct SensorCorrelator {
    config: CorrelatorConfig,
    loop_interval_s: f64,
    ranging: RollingWindow<RangeSample>,
    vision: RollingWindow<VisionAssessment>,
}

impl SensorCorrelator {
    /// `loop_interval_s` is the nominal tick period used to turn a
    /// distance delta into a velocity.
    pub fn new(config: CorrelatorConfig, loop_interval_s: f64) -> Self {
        Self {
            ranging: RollingWindow::new(config.window),
            vision: RollingWindow::new(config.window),
            config,
            loop_interval_s,
        }
    }

    /// Record this tick's readings and return the instantaneous ranging
    /// velocity (cm/s, negative = approaching).
    ///
    /// Velocity is 0 when there is no previous reading (absent or exactly
    /// 0) or the loop interval is not positive. Any other pair of readings,
    /// including a current `0.0` dropout, goes through the formula.
    pub fn update(
        &mut self,
        distance_cm: f64,
        previous_distance_cm: Option<f64>,
        vision: VisionAssessment,
    ) -> f64 {
        let velocity = match previous_distance_cm {
            Some(prev) if prev != 0.0 && self.loop_interval_s > 0.0 => {
                (distance_cm - prev) / self.loop_interval_s
            }
            _ => 0.0,
        };

        self.ranging.push(RangeSample {
            distance_cm,
            velocity_cm_s: velocity,
        });
        self.vision.push(vision);
        velocity
    }

    /// `true` when both windows show an approach somewhere within them.
    pub fn is_correlated_approach(&self) -> bool {
        if self.ranging.is_empty() || self.vision.is_empty() {
            return false;
        }
        let limit = -self.config.approach_speed_cm_s;
        let ranging = self.ranging.iter().any(|s| s.velocity_cm_s < limit);
        let vision = self.vision.iter().any(|v| v.object_approaching);
        ranging && vision
    }

    pub fn reset(&mut self) {
        self.ranging.clear();
        self.vision.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn correlator() -> SensorCorrelator {
        SensorCorrelator::new(CorrelatorConfig::default(), 0.5)
    }

    fn vision(approaching: bool) -> VisionAssessment {
        VisionAssessment {
            object_approaching: approaching,
            ..Default::default()
        }
    }

    #[test]
    fn empty_windows_are_not_correlated() {
        assert!(!correlator().is_correlated_approach());
    }

    #[test]
    fn velocity_from_previous_reading() {
        let mut c = correlator();
        assert_eq!(c.update(60.0, None, vision(false)), 0.0);
        assert_eq!(c.update(50.0, Some(60.0), vision(false)), -20.0);
        assert_eq!(c.update(55.0, Some(50.0), vision(false)), 10.0);
        // A zero previous reading counts as no previous reading.
        assert_eq!(c.update(40.0, Some(0.0), vision(false)), 0.0);
    }

    #[test]
    fn dropout_to_zero_reads_as_fast_closing() {
        let mut c = correlator();
        c.update(40.0, None, vision(true));
        assert_eq!(c.update(0.0, Some(40.0), vision(true)), -80.0);
        assert!(c.is_correlated_approach());
    }

    #[test]
    fn ranging_alone_is_not_enough() {
        let mut c = correlator();
        c.update(60.0, None, vision(false));
        c.update(45.0, Some(60.0), vision(false));
        assert!(!c.is_correlated_approach());
    }

    #[test]
    fn vision_alone_is_not_enough() {
        let mut c = correlator();
        c.update(60.0, None, vision(true));
        c.update(60.0, Some(60.0), vision(true));
        assert!(!c.is_correlated_approach());
    }

    #[test]
    fn slow_closing_does_not_count() {
        let mut c = correlator();
        c.update(60.0, None, vision(true));
        // -10 cm/s is not strictly faster than the 10 cm/s threshold.
        c.update(55.0, Some(60.0), vision(true));
        assert!(!c.is_correlated_approach());
    }

    #[test]
    fn agreement_on_different_ticks_within_window() {
        let mut c = correlator();
        // Ranging sees the approach first...
        c.update(60.0, None, vision(false));
        c.update(45.0, Some(60.0), vision(false));
        // ...vision catches up a tick later while ranging holds still.
        c.update(45.0, Some(45.0), vision(true));
        assert!(c.is_correlated_approach());
    }

    #[test]
    fn qualifying_samples_age_out_of_window() {
        let mut c = correlator();
        c.update(60.0, None, vision(true));
        c.update(45.0, Some(60.0), vision(true));
        assert!(c.is_correlated_approach());

        // Three quiet ticks push both qualifying entries out.
        for _ in 0..3 {
            c.update(45.0, Some(45.0), vision(false));
        }
        assert!(!c.is_correlated_approach());
    }

    #[test]
    fn reset_clears_windows() {
        let mut c = correlator();
        c.update(60.0, None, vision(true));
        c.update(45.0, Some(60.0), vision(true));
        c.reset();
        assert!(!c.is_correlated_approach());
    }
}
