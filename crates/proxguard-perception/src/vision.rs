//! [`VisionProcessor`] – reduces a frame's contour list to a
//! [`VisionAssessment`].
//!
//! Contours at or below the minimum area are treated as noise; the same
//! floor is handed to the scorer for growth-from-nothing. The largest
//! remaining contour drives the owned [`ApproachScorer`]; motion is reported
//! when a valid contour exists and the changed fraction of the frame reaches
//! `magnitude_threshold`.

use proxguard_types::{MotionSummary, VisionAssessment};

use crate::approach::ApproachScorer;
use crate::config::{ApproachConfig, VisionConfig};

#[derive(Debug)]
pub struct VisionProcessor {
    config: VisionConfig,
    scorer: ApproachScorer,
}

impl VisionProcessor {
    pub fn new(config: VisionConfig, approach: ApproachConfig) -> Self {
        Self {
            scorer: ApproachScorer::new(approach, config.min_contour_area_px),
            config,
        }
    }

    /// Summarise one frame. Must be called exactly once per tick so the
    /// scorer's growth streak tracks frames, not calls.
    pub fn process(&mut self, summary: &MotionSummary) -> VisionAssessment {
        let largest = summary
            .contour_areas_px
            .iter()
            .copied()
            .filter(|a| *a > self.config.min_contour_area_px)
            .max()
            .unwrap_or(0);

        let magnitude = if summary.magnitude.is_finite() {
            summary.magnitude.clamp(0.0, 1.0)
        } else {
            0.0
        };

        let score = self.scorer.observe(largest);

        VisionAssessment {
            motion_detected: largest > 0 && magnitude >= self.config.magnitude_threshold,
            magnitude,
            largest_contour_px: largest,
            object_approaching: score.approaching,
            approach_confidence: score.confidence,
        }
    }

    pub fn scorer(&self) -> &ApproachScorer {
        &self.scorer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn processor() -> VisionProcessor {
        VisionProcessor::new(VisionConfig::default(), ApproachConfig::default())
    }

    fn frame(magnitude: f64, contours: &[u32]) -> MotionSummary {
        MotionSummary {
            magnitude,
            contour_areas_px: contours.to_vec(),
        }
    }

    #[test]
    fn small_contours_are_discarded() {
        let mut p = processor();
        let v = p.process(&frame(0.8, &[50, 120, 200]));
        assert_eq!(v.largest_contour_px, 0);
        assert!(!v.motion_detected);
    }

    #[test]
    fn largest_valid_contour_is_reported() {
        let mut p = processor();
        let v = p.process(&frame(0.5, &[250, 4000, 900]));
        assert_eq!(v.largest_contour_px, 4000);
        assert!(v.motion_detected);
        assert!((v.magnitude - 0.5).abs() < 1e-12);
    }

    #[test]
    fn weak_magnitude_is_not_motion() {
        let mut p = processor();
        let v = p.process(&frame(0.1, &[5000]));
        assert_eq!(v.largest_contour_px, 5000);
        assert!(!v.motion_detected);
    }

    #[test]
    fn magnitude_clamped_to_unit_interval() {
        let mut p = processor();
        assert_eq!(p.process(&frame(3.0, &[])).magnitude, 1.0);
        assert_eq!(p.process(&frame(-1.0, &[])).magnitude, 0.0);
        assert_eq!(p.process(&frame(f64::NAN, &[])).magnitude, 0.0);
    }

    #[test]
    fn scorer_floor_follows_vision_floor() {
        let vision = VisionConfig {
            min_contour_area_px: 500,
            ..VisionConfig::default()
        };
        let mut p = VisionProcessor::new(vision, ApproachConfig::default());
        p.process(&frame(0.5, &[450]));
        assert_eq!(p.scorer().streak(), 0);
        let v = p.process(&frame(0.5, &[600]));
        assert_eq!(v.largest_contour_px, 600);
        assert_eq!(p.scorer().streak(), 1);
    }

    #[test]
    fn growing_contours_flag_approach() {
        let mut p = processor();
        let out: Vec<VisionAssessment> = [1000, 1200, 1450, 1700]
            .iter()
            .map(|a| p.process(&frame(0.6, &[*a, 300])))
            .collect();
        assert!(!out[2].object_approaching);
        assert!(out[3].object_approaching);
        assert_eq!(out[3].approach_confidence, 1.0);
        assert_eq!(p.scorer().streak(), 3);
    }
}
