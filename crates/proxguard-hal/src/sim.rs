//! Simulated drivers for headless runs and CI without physical sensors.
//!
//! - [`ScriptedRangeSensor`] / [`ScriptedVisionSensor`] replay a fixed
//!   sequence and then hold the last value.
//! - [`SimApproach`] generates a matching pair of scripts for a target that
//!   idles, then closes at a constant speed.
//!
//! # Example
//!
//! ```rust
//! use proxguard_hal::sim::SimApproach;
//! use proxguard_hal::{RangeSensor, VisionSensor};
//!
//! let (mut range, mut vision) = SimApproach::default().into_sensors(10);
//! let d = range.measure().expect("scripted sensor has readings");
//! let frame = vision.sample().expect("scripted sensor has frames");
//! assert!(d > 0.0);
//! assert!(frame.contour_areas_px.is_empty());
//! ```

use proxguard_types::{MotionSummary, ProxError};

use crate::range::RangeSensor;
use crate::scenario::{Scenario, ScenarioTick};
use crate::vision::VisionSensor;

// ────────────────────────────────────────────────────────────────────────────
// Scripted ranging
// ────────────────────────────────────────────────────────────────────────────

/// Replays a list of readings; once exhausted, repeats the last one.
pub struct ScriptedRangeSensor {
    id: String,
    readings: Vec<f64>,
    cursor: usize,
}

impl ScriptedRangeSensor {
    pub fn new(id: impl Into<String>, readings: Vec<f64>) -> Self {
        Self {
            id: id.into(),
            readings,
            cursor: 0,
        }
    }
}

impl RangeSensor for ScriptedRangeSensor {
    fn id(&self) -> &str {
        &self.id
    }

    fn measure(&mut self) -> Result<f64, ProxError> {
        let value = next_scripted(&self.readings, &mut self.cursor).copied();
        value.ok_or_else(|| ProxError::SensorFault {
            component: self.id.clone(),
            details: "no scripted readings".to_string(),
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Scripted vision
// ────────────────────────────────────────────────────────────────────────────

/// Replays a list of motion summaries; once exhausted, repeats the last one.
pub struct ScriptedVisionSensor {
    id: String,
    frames: Vec<MotionSummary>,
    cursor: usize,
}

impl ScriptedVisionSensor {
    pub fn new(id: impl Into<String>, frames: Vec<MotionSummary>) -> Self {
        Self {
            id: id.into(),
            frames,
            cursor: 0,
        }
    }
}

impl VisionSensor for ScriptedVisionSensor {
    fn id(&self) -> &str {
        &self.id
    }

    fn sample(&mut self) -> Result<MotionSummary, ProxError> {
        let frame = next_scripted(&self.frames, &mut self.cursor).cloned();
        frame.ok_or_else(|| ProxError::SensorFault {
            component: self.id.clone(),
            details: "no scripted frames".to_string(),
        })
    }
}

fn next_scripted<'a, T>(items: &'a [T], cursor: &mut usize) -> Option<&'a T> {
    let item = items.get(*cursor).or_else(|| items.last());
    if *cursor < items.len() {
        *cursor += 1;
    }
    item
}

// ────────────────────────────────────────────────────────────────────────────
// Synthetic approach
// ────────────────────────────────────────────────────────────────────────────

/// A target that sits still for `idle_ticks`, then closes by
/// `closing_cm_per_tick` every tick until it reaches `stop_cm`.
///
/// The vision side reports one contour whose area is inversely
/// proportional to distance (`contour_scale / distance`), and a fixed
/// `moving_magnitude` while the target moves.
#[derive(Debug, Clone, PartialEq)]
pub struct SimApproach {
    pub start_cm: f64,
    pub stop_cm: f64,
    pub closing_cm_per_tick: f64,
    pub idle_ticks: usize,
    pub contour_scale: f64,
    pub moving_magnitude: f64,
}

impl Default for SimApproach {
    fn default() -> Self {
        Self {
            start_cm: 90.0,
            stop_cm: 8.0,
            closing_cm_per_tick: 7.5,
            idle_ticks: 4,
            contour_scale: 120_000.0,
            moving_magnitude: 0.45,
        }
    }
}

impl SimApproach {
    /// Render the first `ticks` ticks as a [`Scenario`].
    pub fn scenario(&self, ticks: usize) -> Scenario {
        let mut distance = self.start_cm;
        let ticks = (0..ticks)
            .map(|i| {
                let moving = i >= self.idle_ticks && distance > self.stop_cm;
                if moving {
                    distance = (distance - self.closing_cm_per_tick).max(self.stop_cm);
                }
                let contours = if moving && distance > 0.0 {
                    vec![(self.contour_scale / distance).round() as u32]
                } else {
                    Vec::new()
                };
                ScenarioTick {
                    distance_cm: distance,
                    magnitude: if moving { self.moving_magnitude } else { 0.0 },
                    contours,
                }
            })
            .collect();
        Scenario { ticks }
    }

    /// Build a matching pair of scripted sensors for `ticks` ticks.
    pub fn into_sensors(self, ticks: usize) -> (ScriptedRangeSensor, ScriptedVisionSensor) {
        self.scenario(ticks).into_sensors()
    }
}
