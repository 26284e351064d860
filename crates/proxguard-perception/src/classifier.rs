//! [`EventClassifier`] – maps one tick's fused measurements onto exactly
//! one [`EventType`].
//!
//! Rules are evaluated in priority order and the first match wins:
//!
//! | Priority | Event | Condition |
//! |---|---|---|
//! | 1 | `collision_warning` | sensors correlated **and** distance < `distance_close_cm` |
//! | 2 | `distance_alert` | distance < `distance_alert_cm` |
//! | 3 | `object_approaching` | vision flags an approach |
//! | 4 | `motion_detected` | vision reports motion |
//! | 5 | `normal` | otherwise |
//!
//! Reason strings are advisory only; nothing downstream parses them.

use chrono::{DateTime, Utc};
use proxguard_types::{Event, EventPayload, EventType, VisionAssessment};

use crate::config::ClassifierConfig;
use crate::tracker::round2;

#[derive(Debug, Clone)]
pub struct EventClassifier {
    config: ClassifierConfig,
    approach_speed_cm_s: f64,
    sensor_id: String,
}

impl EventClassifier {
    /// `approach_speed_cm_s` is the correlator's closing-speed threshold;
    /// it only decides whether the closing-speed reason is added.
    pub fn new(
        config: ClassifierConfig,
        approach_speed_cm_s: f64,
        sensor_id: impl Into<String>,
    ) -> Self {
        Self {
            config,
            approach_speed_cm_s,
            sensor_id: sensor_id.into(),
        }
    }

    pub fn sensor_id(&self) -> &str {
        &self.sensor_id
    }

    /// Build the event for this tick, stamped with the current time.
    ///
    /// `sequence_num` is owned by the caller and passed through unchanged.
    pub fn classify(
        &self,
        distance_cm: f64,
        velocity_cm_s: f64,
        vision: &VisionAssessment,
        correlated: bool,
        sequence_num: u64,
    ) -> Event {
        self.classify_at(distance_cm, velocity_cm_s, vision, correlated, sequence_num, Utc::now())
    }

    pub fn classify_at(
        &self,
        distance_cm: f64,
        velocity_cm_s: f64,
        vision: &VisionAssessment,
        correlated: bool,
        sequence_num: u64,
        timestamp: DateTime<Utc>,
    ) -> Event {
        let (event_type, reasons) = self.decide(distance_cm, velocity_cm_s, vision, correlated);

        Event {
            sensor_id: self.sensor_id.clone(),
            event_type,
            payload: EventPayload {
                distance_cm,
                velocity_cm_s: round2(velocity_cm_s),
                camera_magnitude: vision.magnitude,
                camera_approaching: vision.object_approaching,
                approach_confidence: vision.approach_confidence,
                largest_contour_px: vision.largest_contour_px,
                correlated,
                severity: None,
                ttc_seconds: None,
                object_confirmed: false,
                reasons,
            },
            timestamp,
            sequence_num,
        }
    }

    fn decide(
        &self,
        distance: f64,
        velocity: f64,
        vision: &VisionAssessment,
        correlated: bool,
    ) -> (EventType, Vec<String>) {
        let cfg = &self.config;
        let mut reasons = Vec::new();

        if correlated && distance < cfg.distance_close_cm {
            reasons.push("Both camera and ultrasonic confirm object approaching".to_string());
            if distance < cfg.distance_alert_cm {
                reasons.push(format!("Object close at {distance}cm"));
            }
            if velocity < -self.approach_speed_cm_s {
                reasons.push(format!("Closing speed: {:.1} cm/s", velocity.abs()));
            }
            return (EventType::CollisionWarning, reasons);
        }

        if distance < cfg.distance_alert_cm {
            reasons.push(format!("Object detected at {distance}cm"));
            if velocity < 0.0 {
                reasons.push(format!("Approaching at {:.1} cm/s", velocity.abs()));
            }
            return (EventType::DistanceAlert, reasons);
        }

        if vision.object_approaching {
            reasons.push(format!(
                "Camera confirmed approaching object (confidence: {:.2})",
                vision.approach_confidence
            ));
            if vision.largest_contour_px > 0 {
                reasons.push(format!("Contour size: {}px", vision.largest_contour_px));
            }
            return (EventType::ObjectApproaching, reasons);
        }

        if vision.motion_detected {
            reasons.push(format!("Motion detected (magnitude: {:.2})", vision.magnitude));
            return (EventType::MotionDetected, reasons);
        }

        (EventType::Normal, reasons)
    }
}
