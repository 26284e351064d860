//! Tunable thresholds for the fusion core.
//!
//! Every value can be overridden from the `[fusion]` table of the CLI
//! configuration file; any field left out falls back to its default.
//!
//! ```toml
//! [fusion]
//! loop_interval_s = 0.5
//!
//! [fusion.tracker]
//! distance_critical_cm = 12.0
//!
//! [fusion.approach]
//! confirm_streak = 4
//! ```

use serde::{Deserialize, Serialize};

/// Default contour area floor, in pixels.
pub const DEFAULT_MIN_CONTOUR_AREA_PX: u32 = 200;

/// Default closing speed (cm/s) at which ranging counts as approaching.
pub const DEFAULT_APPROACH_SPEED_CM_S: f64 = 10.0;

/// Thresholds used by [`DistanceTracker`][crate::tracker::DistanceTracker].
///
/// Distances in centimetres, velocities in cm/s (negative = closing),
/// times in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub distance_critical_cm: f64,
    pub distance_warning_cm: f64,
    /// Readings above this are treated as noise.
    pub distance_max_cm: f64,
    pub hysteresis_critical_cm: f64,
    pub hysteresis_warning_cm: f64,
    pub velocity_caution_cm_s: f64,
    pub velocity_warning_cm_s: f64,
    pub velocity_critical_cm_s: f64,
    pub ttc_warning_s: f64,
    pub ttc_critical_s: f64,
    /// Consecutive valid readings required before an object is confirmed.
    pub persistence_min: u32,
    pub history_size: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            distance_critical_cm: 15.0,
            distance_warning_cm: 40.0,
            distance_max_cm: 100.0,
            hysteresis_critical_cm: 5.0,
            hysteresis_warning_cm: 8.0,
            velocity_caution_cm_s: -15.0,
            velocity_warning_cm_s: -40.0,
            velocity_critical_cm_s: -80.0,
            ttc_warning_s: 3.0,
            ttc_critical_s: 1.0,
            persistence_min: 3,
            history_size: 5,
        }
    }
}

/// Thresholds used by [`ApproachScorer`][crate::approach::ApproachScorer].
///
/// The area floor for growth-from-nothing is not here: it is
/// [`VisionConfig::min_contour_area_px`], handed to the scorer by
/// [`VisionProcessor`][crate::vision::VisionProcessor].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApproachConfig {
    pub history_size: usize,
    /// `newest / oldest` contour ratio that counts as growth.
    pub growth_threshold: f64,
    pub confirm_streak: u32,
}

impl Default for ApproachConfig {
    fn default() -> Self {
        Self {
            history_size: 5,
            growth_threshold: 1.15,
            confirm_streak: 3,
        }
    }
}

/// Thresholds used by [`VisionProcessor`][crate::vision::VisionProcessor].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Contours at or below this area are noise. Also the scorer's floor.
    pub min_contour_area_px: u32,
    pub magnitude_threshold: f64,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            min_contour_area_px: DEFAULT_MIN_CONTOUR_AREA_PX,
            magnitude_threshold: 0.3,
        }
    }
}

/// Parameters of [`SensorCorrelator`][crate::correlator::SensorCorrelator].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelatorConfig {
    pub window: usize,
    /// Closing speed (positive, cm/s) above which the ranging stream counts
    /// as approaching. The classifier words its closing-speed reason
    /// against the same value.
    pub approach_speed_cm_s: f64,
}

impl Default for CorrelatorConfig {
    fn default() -> Self {
        Self {
            window: 3,
            approach_speed_cm_s: DEFAULT_APPROACH_SPEED_CM_S,
        }
    }
}

/// Thresholds used by [`EventClassifier`][crate::classifier::EventClassifier].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub distance_alert_cm: f64,
    pub distance_close_cm: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            distance_alert_cm: 50.0,
            distance_close_cm: 50.0,
        }
    }
}

/// Complete fusion-core configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// Nominal tick period in seconds.
    pub loop_interval_s: f64,
    pub tracker: TrackerConfig,
    pub approach: ApproachConfig,
    pub vision: VisionConfig,
    pub correlator: CorrelatorConfig,
    pub classifier: ClassifierConfig,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            loop_interval_s: 0.5,
            tracker: TrackerConfig::default(),
            approach: ApproachConfig::default(),
            vision: VisionConfig::default(),
            correlator: CorrelatorConfig::default(),
            classifier: ClassifierConfig::default(),
        }
    }
}
