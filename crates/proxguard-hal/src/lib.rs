//! `proxguard-hal` – acquisition seams.
//!
//! The fusion core never talks to hardware. Drivers implement the traits in
//! this crate and the runtime only ever sees the traits, so a GPIO-backed
//! ultrasonic driver, a replay file or a synthetic target are
//! interchangeable.
//!
//! # Modules
//!
//! - [`range`] – [`RangeSensor`][range::RangeSensor]: scalar distance per
//!   tick.
//! - [`vision`] – [`VisionSensor`][vision::VisionSensor]: contour-level
//!   [`MotionSummary`][proxguard_types::MotionSummary] per tick.
//! - [`sim`] – scripted drivers and [`SimApproach`][sim::SimApproach], a
//!   synthetic closing target, for headless runs and CI.
//! - [`scenario`] – [`Scenario`][scenario::Scenario]: TOML replay files.

pub mod range;
pub mod scenario;
pub mod sim;
pub mod vision;

pub use range::RangeSensor;
pub use scenario::{Scenario, ScenarioTick};
pub use sim::{ScriptedRangeSensor, ScriptedVisionSensor, SimApproach};
pub use vision::VisionSensor;
