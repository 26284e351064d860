use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Severity tier owned by the distance tracker.
///
/// Ordered from least to most severe so tiers can be compared directly
/// (`AlertState::Critical > AlertState::Warning`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertState {
    #[default]
    None,
    Caution,
    Warning,
    Critical,
}

impl std::fmt::Display for AlertState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertState::None => write!(f, "none"),
            AlertState::Caution => write!(f, "caution"),
            AlertState::Warning => write!(f, "warning"),
            AlertState::Critical => write!(f, "critical"),
        }
    }
}

/// Contour-level output of the frame-differencing stage, one per frame.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MotionSummary {
    /// Fraction of the frame that changed, in `[0, 1]`.
    #[serde(default)]
    pub magnitude: f64,
    /// Areas of every changed region, in pixels, unfiltered.
    #[serde(default)]
    pub contour_areas_px: Vec<u32>,
}

/// Per-tick summary of the vision stream.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VisionAssessment {
    pub motion_detected: bool,
    /// Fraction of the frame that changed, in `[0, 1]`.
    pub magnitude: f64,
    /// Area of the largest valid contour in pixels (0 when none).
    pub largest_contour_px: u32,
    pub object_approaching: bool,
    /// In `[0, 1]`.
    pub approach_confidence: f64,
}

/// The five mutually exclusive event categories, highest priority last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Normal,
    MotionDetected,
    ObjectApproaching,
    DistanceAlert,
    CollisionWarning,
}

impl EventType {
    /// Wire label, e.g. `"collision_warning"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Normal => "normal",
            EventType::MotionDetected => "motion_detected",
            EventType::ObjectApproaching => "object_approaching",
            EventType::DistanceAlert => "distance_alert",
            EventType::CollisionWarning => "collision_warning",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Measurement snapshot carried by every [`Event`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EventPayload {
    pub distance_cm: f64,
    pub velocity_cm_s: f64,
    pub camera_magnitude: f64,
    pub camera_approaching: bool,
    pub approach_confidence: f64,
    pub largest_contour_px: u32,
    pub correlated: bool,
    /// Tracker severity; `None` until the tracker has confirmed an object.
    #[serde(default)]
    pub severity: Option<AlertState>,
    #[serde(default)]
    pub ttc_seconds: Option<f64>,
    #[serde(default)]
    pub object_confirmed: bool,
    /// Advisory, human-readable justification strings.
    pub reasons: Vec<String>,
}

/// One classified proximity event. Exactly one is emitted per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// e.g., "pi_sensor_01"
    pub sensor_id: String,
    pub event_type: EventType,
    pub payload: EventPayload,
    pub timestamp: DateTime<Utc>,
    /// Starts at 1 and increases by one every tick.
    pub sequence_num: u64,
}

/// Workspace error type spanning acquisition faults, delivery failures and
/// configuration problems. The fusion core itself never returns it.
#[derive(Error, Debug, Serialize, Deserialize)]
pub enum ProxError {
    #[error("Sensor Fault on {component}: {details}")]
    SensorFault { component: String, details: String },

    #[error("Transport Error: {0}")]
    Transport(String),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Serialization Error: {0}")]
    Serialization(String),
}
