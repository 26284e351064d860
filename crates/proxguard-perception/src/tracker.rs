//! Distance tracking with persistence filtering and hysteresis.
//!
//! [`DistanceTracker`] turns a stream of raw ranging readings into a severity
//! tier. Each call to [`DistanceTracker::update`]:
//!
//! 1. Rejects noise (non-positive or beyond the maximum range).
//! 2. Requires `persistence_min` consecutive valid readings before it trusts
//!    an object.
//! 3. Estimates velocity over the whole history window (oldest to newest).
//! 4. Predicts time-to-collision while the object is closing.
//! 5. Picks the most severe tier whose distance, TTC or velocity trigger
//!    fired.
//! 6. Holds `Critical` / `Warning` open while the object stays inside the
//!    hysteresis band above the trigger distance.
//!
//! # Example
//!
//! ```rust
//! use std::time::{Duration, Instant};
//! use proxguard_perception::config::TrackerConfig;
//! use proxguard_perception::tracker::DistanceTracker;
//! use proxguard_types::AlertState;
//!
//! let mut tracker = DistanceTracker::new(TrackerConfig::default());
//! let t0 = Instant::now();
//!
//! tracker.update_at(10.0, t0);
//! tracker.update_at(10.0, t0 + Duration::from_millis(500));
//! let assessment = tracker.update_at(10.0, t0 + Duration::from_secs(1));
//!
//! assert!(assessment.object_confirmed());
//! assert_eq!(assessment.severity(), Some(AlertState::Critical));
//! ```

use std::time::Instant;

use proxguard_types::{AlertState, EventPayload};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::TrackerConfig;
use crate::window::RollingWindow;

/// Approach speeds below this (cm/s) are treated as stationary for TTC.
const MIN_TTC_SPEED_CM_S: f64 = 1.0;

// ────────────────────────────────────────────────────────────────────────────
// Assessment
// ────────────────────────────────────────────────────────────────────────────

/// Result of a single [`DistanceTracker::update`] call.
///
/// Callers match on the variant instead of probing optional fields; the
/// accessor methods give the flat view used when building events.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TrackerAssessment {
    /// The reading was out of range and discarded.
    Filtered { raw_distance_cm: f64 },
    /// A valid reading, but not enough consecutive ones yet.
    Unconfirmed {
        distance_cm: f64,
        readings: u32,
        required: u32,
    },
    /// A confirmed object with a full kinematic assessment.
    Confirmed {
        distance_cm: f64,
        /// Negative = approaching.
        velocity_cm_s: f64,
        ttc_seconds: Option<f64>,
        severity: AlertState,
        reasons: Vec<String>,
    },
}

impl TrackerAssessment {
    pub fn object_detected(&self) -> bool {
        !matches!(self, TrackerAssessment::Filtered { .. })
    }

    pub fn object_confirmed(&self) -> bool {
        matches!(self, TrackerAssessment::Confirmed { .. })
    }

    pub fn distance_cm(&self) -> f64 {
        match self {
            TrackerAssessment::Filtered { raw_distance_cm } => *raw_distance_cm,
            TrackerAssessment::Unconfirmed { distance_cm, .. }
            | TrackerAssessment::Confirmed { distance_cm, .. } => *distance_cm,
        }
    }

    /// Velocity in cm/s; 0 unless the object is confirmed.
    pub fn velocity_cm_s(&self) -> f64 {
        match self {
            TrackerAssessment::Confirmed { velocity_cm_s, .. } => *velocity_cm_s,
            _ => 0.0,
        }
    }

    pub fn ttc_seconds(&self) -> Option<f64> {
        match self {
            TrackerAssessment::Confirmed { ttc_seconds, .. } => *ttc_seconds,
            _ => None,
        }
    }

    /// The active tier, or `None` when no alert is raised.
    pub fn severity(&self) -> Option<AlertState> {
        match self {
            TrackerAssessment::Confirmed { severity, .. } if *severity != AlertState::None => {
                Some(*severity)
            }
            _ => None,
        }
    }

    /// Copy the tracker's view into an event payload built by the
    /// classifier.
    pub fn annotate(&self, payload: &mut EventPayload) {
        payload.severity = self.severity();
        payload.ttc_seconds = self.ttc_seconds();
        payload.object_confirmed = self.object_confirmed();
    }

    /// Human-readable explanation of the assessment, in evaluation order.
    pub fn reasons(&self) -> Vec<String> {
        match self {
            TrackerAssessment::Filtered { .. } => {
                vec!["No valid reading, filtered as noise".to_string()]
            }
            TrackerAssessment::Unconfirmed {
                readings, required, ..
            } => vec![format!(
                "Object detected but unconfirmed ({readings}/{required} readings)"
            )],
            TrackerAssessment::Confirmed { reasons, .. } => reasons.clone(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// DistanceTracker
// ────────────────────────────────────────────────────────────────────────────

/// Stateful severity estimator for a single ranging sensor.
///
/// Owns its reading history, its consecutive-valid counter and the current
/// [`AlertState`]; the state carries across calls, which is what makes
/// hysteresis possible.
#[derive(Debug)]
pub struct DistanceTracker {
    config: TrackerConfig,
    history: RollingWindow<(Instant, f64)>,
    consecutive_valid: u32,
    alert: AlertState,
}

impl DistanceTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            history: RollingWindow::new(config.history_size),
            config,
            consecutive_valid: 0,
            alert: AlertState::None,
        }
    }

    /// Feed a reading taken now.
    pub fn update(&mut self, raw_distance_cm: f64) -> TrackerAssessment {
        self.update_at(raw_distance_cm, Instant::now())
    }

    /// Feed a reading taken at `now`. Instants must be non-decreasing.
    pub fn update_at(&mut self, raw_distance_cm: f64, now: Instant) -> TrackerAssessment {
        // NaN fails the range check below as well.
        if !(raw_distance_cm > 0.0 && raw_distance_cm <= self.config.distance_max_cm) {
            debug!(raw_distance_cm, "reading filtered as noise");
            self.consecutive_valid = 0;
            self.transition(AlertState::None, raw_distance_cm);
            return TrackerAssessment::Filtered {
                raw_distance_cm: round2(raw_distance_cm),
            };
        }

        self.consecutive_valid = self.consecutive_valid.saturating_add(1);
        self.history.push((now, raw_distance_cm));

        if self.consecutive_valid < self.config.persistence_min {
            return TrackerAssessment::Unconfirmed {
                distance_cm: round2(raw_distance_cm),
                readings: self.consecutive_valid,
                required: self.config.persistence_min,
            };
        }

        let velocity = self.velocity();
        let ttc = time_to_collision(raw_distance_cm, velocity);
        let (computed, reasons) = self.classify(raw_distance_cm, velocity, ttc);
        let (severity, reasons) = self.apply_hysteresis(computed, reasons, raw_distance_cm);
        self.transition(severity, raw_distance_cm);

        TrackerAssessment::Confirmed {
            distance_cm: round2(raw_distance_cm),
            velocity_cm_s: round2(velocity),
            ttc_seconds: ttc.map(round2),
            severity,
            reasons,
        }
    }

    /// The tier carried into the next update.
    pub fn alert_state(&self) -> AlertState {
        self.alert
    }

    pub fn consecutive_valid(&self) -> u32 {
        self.consecutive_valid
    }

    /// Forget all history and clear the alert.
    pub fn reset(&mut self) {
        self.history.clear();
        self.consecutive_valid = 0;
        self.alert = AlertState::None;
    }

    /// Velocity in cm/s between the oldest and newest reading in the window.
    fn velocity(&self) -> f64 {
        let (Some(&(t_old, d_old)), Some(&(t_new, d_new))) =
            (self.history.oldest(), self.history.newest())
        else {
            return 0.0;
        };
        let dt = t_new.saturating_duration_since(t_old).as_secs_f64();
        if dt == 0.0 {
            return 0.0;
        }
        (d_new - d_old) / dt
    }

    /// Most-severe-first tier selection. Every trigger that fired for the
    /// winning tier contributes a reason.
    fn classify(&self, distance: f64, velocity: f64, ttc: Option<f64>) -> (AlertState, Vec<String>) {
        let cfg = &self.config;
        let mut reasons = Vec::new();

        let ttc_below = |limit: f64| ttc.filter(|t| *t < limit);

        let crit_dist = distance < cfg.distance_critical_cm;
        let crit_ttc = ttc_below(cfg.ttc_critical_s);
        let crit_vel = velocity < cfg.velocity_critical_cm_s;
        if crit_dist || crit_ttc.is_some() || crit_vel {
            if crit_dist {
                reasons.push(format!(
                    "Object at {distance:.1}cm (critical zone < {}cm)",
                    cfg.distance_critical_cm
                ));
            }
            if let Some(t) = crit_ttc {
                reasons.push(format!("Collision predicted in {t:.2}s"));
            }
            if crit_vel {
                reasons.push(format!("Rapid approach at {:.1} cm/s", velocity.abs()));
            }
            return (AlertState::Critical, reasons);
        }

        let warn_dist = distance < cfg.distance_warning_cm;
        let warn_ttc = ttc_below(cfg.ttc_warning_s);
        let warn_vel = velocity < cfg.velocity_warning_cm_s;
        if warn_dist || warn_ttc.is_some() || warn_vel {
            if warn_dist {
                reasons.push(format!(
                    "Object at {distance:.1}cm (warning zone < {}cm)",
                    cfg.distance_warning_cm
                ));
            }
            if let Some(t) = warn_ttc {
                reasons.push(format!("Collision predicted in {t:.2}s"));
            }
            if warn_vel {
                reasons.push(format!("Fast approach at {:.1} cm/s", velocity.abs()));
            }
            return (AlertState::Warning, reasons);
        }

        if velocity < cfg.velocity_caution_cm_s {
            reasons.push(format!("Object approaching at {:.1} cm/s", velocity.abs()));
            if let Some(t) = ttc {
                reasons.push(format!("Estimated arrival in {t:.1}s"));
            }
            return (AlertState::Caution, reasons);
        }

        (AlertState::None, reasons)
    }

    /// Hold the previous tier open while the object is still inside its
    /// hysteresis band. Never escalates.
    ///
    /// `Warning` is only held when the new tier is exactly `None`; a drop to
    /// `Caution` is accepted as-is.
    fn apply_hysteresis(
        &self,
        computed: AlertState,
        reasons: Vec<String>,
        distance: f64,
    ) -> (AlertState, Vec<String>) {
        let cfg = &self.config;
        match (self.alert, computed) {
            (AlertState::Critical, c)
                if c != AlertState::Critical
                    && distance < cfg.distance_critical_cm + cfg.hysteresis_critical_cm =>
            {
                (
                    AlertState::Critical,
                    vec![format!(
                        "Object still within critical hysteresis zone ({distance:.1}cm)"
                    )],
                )
            }
            (AlertState::Warning, AlertState::None)
                if distance < cfg.distance_warning_cm + cfg.hysteresis_warning_cm =>
            {
                (
                    AlertState::Warning,
                    vec![format!(
                        "Object still within warning hysteresis zone ({distance:.1}cm)"
                    )],
                )
            }
            _ => (computed, reasons),
        }
    }

    fn transition(&mut self, next: AlertState, distance_cm: f64) {
        if next != self.alert {
            info!(from = %self.alert, to = %next, distance_cm, "alert state changed");
        }
        self.alert = next;
    }
}

/// Seconds until contact at the current closing speed, or `None` when the
/// object is receding or effectively stationary.
fn time_to_collision(distance: f64, velocity: f64) -> Option<f64> {
    if velocity >= 0.0 {
        return None;
    }
    let speed = velocity.abs();
    if speed < MIN_TTC_SPEED_CM_S {
        return None;
    }
    Some(distance / speed)
}

pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    /// Feed `(seconds since start, distance)` pairs and return every
    /// assessment.
    fn feed(tracker: &mut DistanceTracker, t0: Instant, readings: &[(f64, f64)]) -> Vec<TrackerAssessment> {
        readings
            .iter()
            .map(|&(s, d)| tracker.update_at(d, t0 + Duration::from_secs_f64(s)))
            .collect()
    }

    fn tracker() -> DistanceTracker {
        DistanceTracker::new(TrackerConfig::default())
    }

    #[test]
    fn three_valid_readings_required_for_confirmation() {
        let mut t = tracker();
        let out = feed(&mut t, Instant::now(), &[(0.0, 70.0), (0.5, 70.0), (1.0, 70.0)]);

        assert!(out[0].object_detected());
        assert!(!out[0].object_confirmed());
        assert_eq!(out[0].reasons(), vec!["Object detected but unconfirmed (1/3 readings)"]);
        assert!(!out[1].object_confirmed());
        assert!(out[2].object_confirmed());
        assert_eq!(out[2].severity(), None);
    }

    #[test]
    fn filtered_reading_resets_persistence() {
        let mut t = tracker();
        let t0 = Instant::now();
        feed(&mut t, t0, &[(0.0, 70.0), (0.5, 70.0)]);
        assert_eq!(t.consecutive_valid(), 2);

        let filtered = t.update_at(0.0, t0 + Duration::from_secs(1));
        assert!(!filtered.object_detected());
        assert_eq!(t.consecutive_valid(), 0);

        let next = t.update_at(70.0, t0 + Duration::from_secs_f64(1.5));
        assert_eq!(
            next,
            TrackerAssessment::Unconfirmed {
                distance_cm: 70.0,
                readings: 1,
                required: 3
            }
        );
    }

    #[test]
    fn out_of_range_readings_are_noise() {
        let mut t = tracker();
        for raw in [0.0, -3.0, 100.5, 400.0, f64::NAN] {
            let a = t.update(raw);
            assert!(!a.object_detected());
            assert!(!a.object_confirmed());
            assert_eq!(a.velocity_cm_s(), 0.0);
            assert_eq!(a.ttc_seconds(), None);
            assert!(a.reasons()[0].contains("filtered as noise"));
        }
        // Exactly the maximum range is still valid.
        assert!(t.update(100.0).object_detected());
    }

    #[test]
    fn noise_clears_active_alert() {
        let mut t = tracker();
        feed(&mut t, Instant::now(), &[(0.0, 10.0), (0.5, 10.0), (1.0, 10.0)]);
        assert_eq!(t.alert_state(), AlertState::Critical);
        t.update(0.0);
        assert_eq!(t.alert_state(), AlertState::None);
    }

    #[test]
    fn rapid_closing_sequences_are_critical() {
        // Velocity well below -80 cm/s over the history window.
        let sequences: [&[f64]; 3] = [
            &[100.0, 90.0, 80.0],
            &[95.0, 70.0, 45.0],
            &[99.0, 97.0, 95.0, 93.0, 91.0],
        ];
        for seq in sequences {
            let mut t = tracker();
            let t0 = Instant::now();
            let readings: Vec<(f64, f64)> =
                seq.iter().enumerate().map(|(i, d)| (i as f64 * 0.02, *d)).collect();
            let last = feed(&mut t, t0, &readings).pop().unwrap();
            assert!(last.velocity_cm_s() < -80.0, "{seq:?}");
            assert_eq!(last.severity(), Some(AlertState::Critical), "{seq:?}");
            assert!(last.reasons().iter().any(|r| r.starts_with("Rapid approach")));
        }
    }

    #[test]
    fn velocity_uses_full_window_not_last_pair() {
        let mut t = tracker();
        let out = feed(
            &mut t,
            Instant::now(),
            &[(0.0, 90.0), (0.5, 80.0), (1.0, 80.0)],
        );
        // (80 - 90) / 1.0 s, although the last two readings are equal.
        assert!((out[2].velocity_cm_s() + 10.0).abs() < 1e-9);
    }

    #[test]
    fn identical_timestamps_give_zero_velocity() {
        let mut t = tracker();
        let t0 = Instant::now();
        let out = feed(&mut t, t0, &[(0.0, 90.0), (0.0, 60.0), (0.0, 50.0)]);
        assert_eq!(out[2].velocity_cm_s(), 0.0);
        assert_eq!(out[2].ttc_seconds(), None);
    }

    #[test]
    fn ttc_only_when_closing() {
        let mut receding = tracker();
        let out = feed(&mut receding, Instant::now(), &[(0.0, 60.0), (0.5, 65.0), (1.0, 70.0)]);
        assert!(out[2].velocity_cm_s() > 0.0);
        assert_eq!(out[2].ttc_seconds(), None);

        let mut closing = tracker();
        let out = feed(&mut closing, Instant::now(), &[(0.0, 90.0), (0.5, 85.0), (1.0, 80.0)]);
        let v = out[2].velocity_cm_s();
        assert!((v + 10.0).abs() < 1e-9);
        let ttc = out[2].ttc_seconds().unwrap();
        assert!((ttc - 80.0 / 10.0).abs() < 0.01);
    }

    #[test]
    fn slow_drift_has_no_ttc() {
        let mut t = tracker();
        let out = feed(&mut t, Instant::now(), &[(0.0, 70.0), (0.5, 69.8), (1.0, 69.6)]);
        assert!(out[2].velocity_cm_s() < 0.0);
        assert_eq!(out[2].ttc_seconds(), None);
    }

    #[test]
    fn only_winning_tier_triggers_are_reported() {
        let mut t = tracker();
        // 30 cm closing at 45 cm/s: ttc = 0.67 s, so critical wins and the
        // warning-tier distance trigger is not listed.
        let out = feed(&mut t, Instant::now(), &[(0.0, 75.0), (0.5, 52.5), (1.0, 30.0)]);
        let last = &out[2];
        assert_eq!(last.severity(), Some(AlertState::Critical));
        assert_eq!(last.reasons(), vec!["Collision predicted in 0.67s"]);
    }

    #[test]
    fn warning_reports_every_fired_trigger() {
        let mut t = tracker();
        let out = feed(&mut t, Instant::now(), &[(0.0, 70.0), (1.0, 52.5), (2.0, 35.0)]);
        let last = &out[2];
        // v = -17.5, ttc = 2.0 -> warning by distance and TTC.
        assert_eq!(last.severity(), Some(AlertState::Warning));
        let reasons = last.reasons();
        assert_eq!(reasons.len(), 2);
        assert!(reasons[0].contains("warning zone < 40cm"));
        assert_eq!(reasons[1], "Collision predicted in 2.00s");
    }

    #[test]
    fn caution_fires_on_velocity_only() {
        let mut t = tracker();
        // v = -20 cm/s, distance 80, ttc 4 s.
        let out = feed(&mut t, Instant::now(), &[(0.0, 100.0), (0.5, 90.0), (1.0, 80.0)]);
        let last = &out[2];
        assert_eq!(last.severity(), Some(AlertState::Caution));
        assert_eq!(
            last.reasons(),
            vec!["Object approaching at 20.0 cm/s", "Estimated arrival in 4.0s"]
        );
    }

    #[test]
    fn critical_held_inside_hysteresis_band() {
        let mut t = tracker();
        let t0 = Instant::now();
        feed(&mut t, t0, &[(0.0, 10.0), (0.5, 10.0), (1.0, 10.0)]);
        assert_eq!(t.alert_state(), AlertState::Critical);

        // 18 cm < 15 + 5: still critical.
        let held = t.update_at(18.0, t0 + Duration::from_secs_f64(1.5));
        assert_eq!(held.severity(), Some(AlertState::Critical));
        assert_eq!(
            held.reasons(),
            vec!["Object still within critical hysteresis zone (18.0cm)"]
        );

        // 25 cm is outside the band.
        let released = t.update_at(25.0, t0 + Duration::from_secs(2));
        assert_ne!(released.severity(), Some(AlertState::Critical));
        assert_eq!(released.severity(), Some(AlertState::Warning));
    }

    #[test]
    fn warning_held_until_band_cleared() {
        let mut t = tracker();
        let t0 = Instant::now();
        feed(&mut t, t0, &[(0.0, 35.0), (0.5, 35.0), (1.0, 35.0)]);
        assert_eq!(t.alert_state(), AlertState::Warning);

        // Receding to 45 cm computes no tier but is inside 40 + 8.
        let held = t.update_at(45.0, t0 + Duration::from_secs_f64(1.5));
        assert_eq!(held.severity(), Some(AlertState::Warning));
        assert!(held.reasons()[0].contains("warning hysteresis zone"));

        let cleared = t.update_at(50.0, t0 + Duration::from_secs(2));
        assert_eq!(cleared.severity(), None);
        assert_eq!(t.alert_state(), AlertState::None);
    }

    #[test]
    fn warning_dropping_to_caution_is_not_held() {
        let mut t = DistanceTracker::new(TrackerConfig {
            history_size: 2,
            ..TrackerConfig::default()
        });
        let t0 = Instant::now();
        feed(&mut t, t0, &[(0.0, 95.0), (1.0, 95.0), (2.0, 95.0)]);

        // v = -32.5, ttc = 1.92 s -> warning by TTC.
        let warn = t.update_at(62.5, t0 + Duration::from_secs(3));
        assert_eq!(warn.severity(), Some(AlertState::Warning));

        // v = -15.5, ttc = 3.03 s -> caution, even though 47 cm is inside
        // the warning hysteresis band.
        let caution = t.update_at(47.0, t0 + Duration::from_secs(4));
        assert_eq!(caution.severity(), Some(AlertState::Caution));
    }

    #[test]
    fn hysteresis_never_escalates() {
        let mut t = tracker();
        let t0 = Instant::now();
        feed(&mut t, t0, &[(0.0, 60.0), (0.5, 60.0), (1.0, 60.0)]);
        assert_eq!(t.alert_state(), AlertState::None);
        // 18 cm is inside the critical band, but the tracker was never
        // critical: the computed warning stands.
        let a = t.update_at(18.0, t0 + Duration::from_secs(30));
        assert_eq!(a.severity(), Some(AlertState::Warning));
        assert_ne!(a.severity(), Some(AlertState::Critical));
    }

    #[test]
    fn assessment_values_rounded_to_two_places() {
        let mut t = tracker();
        let out = feed(&mut t, Instant::now(), &[(0.0, 90.0), (0.3, 85.0), (0.9, 80.123)]);
        let last = &out[2];
        assert_eq!(last.distance_cm(), 80.12);
        let v = last.velocity_cm_s();
        assert_eq!(v, (v * 100.0).round() / 100.0);
    }

    #[test]
    fn reset_clears_state() {
        let mut t = tracker();
        feed(&mut t, Instant::now(), &[(0.0, 10.0), (0.5, 10.0), (1.0, 10.0)]);
        t.reset();
        assert_eq!(t.alert_state(), AlertState::None);
        assert_eq!(t.consecutive_valid(), 0);
        assert!(!t.update(10.0).object_confirmed());
    }

    #[test]
    fn annotate_copies_tracker_fields() {
        let mut t = tracker();
        let out = feed(&mut t, Instant::now(), &[(0.0, 100.0), (0.5, 90.0), (1.0, 80.0)]);
        let mut payload = EventPayload::default();
        out[2].annotate(&mut payload);
        assert_eq!(payload.severity, Some(AlertState::Caution));
        assert_eq!(payload.ttc_seconds, Some(4.0));
        assert!(payload.object_confirmed);

        let mut payload = EventPayload::default();
        out[0].annotate(&mut payload);
        assert_eq!(payload.severity, None);
        assert!(!payload.object_confirmed);
    }

    #[test]
    fn assessment_serializes_with_status_tag() {
        let a = TrackerAssessment::Filtered { raw_distance_cm: 0.0 };
        let v = serde_json::to_value(&a).unwrap();
        assert_eq!(v["status"], "filtered");
    }
}
