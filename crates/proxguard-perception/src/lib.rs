//! `proxguard-perception` – the proximity fusion core.
//!
//! Turns two noisy per-tick measurement streams (a ranging distance and a
//! vision motion summary) into one classified proximity event. Everything in
//! this crate is synchronous and free of I/O; acquisition and delivery live
//! in `proxguard-hal` and `proxguard-runtime`.
//!
//! # Modules
//!
//! - [`tracker`] – [`DistanceTracker`][tracker::DistanceTracker]: persistence
//!   filtering, window velocity, time-to-collision and a hysteresis-based
//!   severity state machine.
//! - [`approach`] – [`ApproachScorer`][approach::ApproachScorer]: growth
//!   streak detector over largest-contour areas.
//! - [`vision`] – [`VisionProcessor`][vision::VisionProcessor]: reduces a
//!   frame's contours to a [`VisionAssessment`][proxguard_types::VisionAssessment].
//! - [`correlator`] – [`SensorCorrelator`][correlator::SensorCorrelator]:
//!   gate that fires when both sensors report an approach within a short
//!   window.
//! - [`classifier`] – [`EventClassifier`][classifier::EventClassifier]:
//!   priority-ordered mapping onto the five event categories.
//! - [`window`] – [`RollingWindow`][window::RollingWindow]: the bounded FIFO
//!   every component keeps its history in.
//! - [`config`] – tunable thresholds with serde defaults.

pub mod approach;
pub mod classifier;
pub mod config;
pub mod correlator;
pub mod tracker;
pub mod vision;
pub mod window;

pub use approach::{ApproachScore, ApproachScorer};
pub use classifier::EventClassifier;
pub use config::FusionConfig;
pub use correlator::SensorCorrelator;
pub use tracker::{DistanceTracker, TrackerAssessment};
pub use vision::VisionProcessor;
pub use window::RollingWindow;
