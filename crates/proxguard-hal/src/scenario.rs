//! Replay files.
//!
//! A scenario is a TOML document with one `[[tick]]` table per loop tick:
//!
//! ```toml
//! [[tick]]
//! distance_cm = 60.0
//!
//! [[tick]]
//! distance_cm = 48.0
//! magnitude = 0.5
//! contours = [1200, 240]
//! ```
//!
//! Missing `magnitude` / `contours` mean an empty frame.

use std::fs;
use std::path::Path;

use proxguard_types::{MotionSummary, ProxError};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::sim::{ScriptedRangeSensor, ScriptedVisionSensor};

/// One tick of recorded (or synthetic) sensor output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioTick {
    pub distance_cm: f64,
    #[serde(default)]
    pub magnitude: f64,
    #[serde(default)]
    pub contours: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(rename = "tick", default)]
    pub ticks: Vec<ScenarioTick>,
}

impl Scenario {
    /// Parse a scenario from TOML text.
    pub fn from_toml_str(raw: &str) -> Result<Self, ProxError> {
        toml::from_str(raw).map_err(|e| ProxError::Config(format!("invalid scenario: {e}")))
    }

    /// Load a scenario file from disk.
    pub fn load(path: &Path) -> Result<Self, ProxError> {
        let raw = fs::read_to_string(path).map_err(|e| {
            ProxError::Config(format!("failed to read scenario {}: {e}", path.display()))
        })?;
        let scenario = Self::from_toml_str(&raw)?;
        info!(path = %path.display(), ticks = scenario.ticks.len(), "scenario loaded");
        Ok(scenario)
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    /// Split into a ranging script and a vision script of equal length.
    pub fn into_sensors(self) -> (ScriptedRangeSensor, ScriptedVisionSensor) {
        let (readings, frames): (Vec<f64>, Vec<MotionSummary>) = self
            .ticks
            .into_iter()
            .map(|t| {
                (
                    t.distance_cm,
                    MotionSummary {
                        magnitude: t.magnitude,
                        contour_areas_px: t.contours,
                    },
                )
            })
            .unzip();
        (
            ScriptedRangeSensor::new("scenario_range", readings),
            ScriptedVisionSensor::new("scenario_vision", frames),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RangeSensor, VisionSensor};

    const SAMPLE: &str = r#"
        [[tick]]
        distance_cm = 60.0

        [[tick]]
        distance_cm = 48.0
        magnitude = 0.5
        contours = [1200, 240]
    "#;

    #[test]
    fn parses_ticks_with_defaults() {
        let s = Scenario::from_toml_str(SAMPLE).unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s.ticks[0].magnitude, 0.0);
        assert!(s.ticks[0].contours.is_empty());
        assert_eq!(s.ticks[1].contours, vec![1200, 240]);
    }

    #[test]
    fn empty_document_is_empty_scenario() {
        let s = Scenario::from_toml_str("").unwrap();
        assert!(s.is_empty());
    }

    #[test]
    fn malformed_document_is_config_error() {
        let err = Scenario::from_toml_str("[[tick]]\ndistance_cm = \"far\"").unwrap_err();
        assert!(matches!(err, ProxError::Config(_)));
    }

    #[test]
    fn load_from_disk_and_split() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("approach.toml");
        std::fs::write(&path, SAMPLE).expect("write scenario");

        let (mut range, mut vision) = Scenario::load(&path).unwrap().into_sensors();
        assert_eq!(range.measure().unwrap(), 60.0);
        assert_eq!(range.measure().unwrap(), 48.0);
        assert!(vision.sample().unwrap().contour_areas_px.is_empty());
        assert_eq!(vision.sample().unwrap().magnitude, 0.5);
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = Scenario::load(Path::new("/nonexistent/scenario.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read scenario"));
    }
}
