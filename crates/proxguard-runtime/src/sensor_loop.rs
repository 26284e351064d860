//! [`SensorLoop`] – the fixed-period acquisition / fusion / emission cycle.
//!
//! Each tick runs, in order:
//!
//! 1. **Acquire** – one blocking range reading and one vision summary. A
//!    failed acquisition is logged and replaced by the noise sentinel (`0.0`
//!    distance, empty frame).
//! 2. **Track** – the reading goes through the [`DistanceTracker`].
//! 3. **See** – the frame goes through the [`VisionProcessor`].
//! 4. **Correlate** – both feed the [`SensorCorrelator`], which returns the
//!    instantaneous velocity and the agreement flag.
//! 5. **Classify** – the [`EventClassifier`] builds the event; the tracker
//!    assessment is attached to its payload.
//! 6. **Emit** – the event goes to the [`EventSink`]. Failure is logged and
//!    the event dropped.
//!
//! All state lives in the loop itself and is only touched from the thread
//! calling [`SensorLoop::tick`].
//!
//! # Example
//!
//! ```rust
//! use proxguard_hal::SimApproach;
//! use proxguard_perception::FusionConfig;
//! use proxguard_runtime::sensor_loop::SensorLoop;
//! use proxguard_runtime::transport::MemorySink;
//!
//! let (range, vision) = SimApproach::default().into_sensors(8);
//! let sink = MemorySink::new();
//! let mut sensor_loop = SensorLoop::new(
//!     &FusionConfig::default(),
//!     "pi_sensor_01",
//!     Box::new(range),
//!     Box::new(vision),
//!     Box::new(sink.clone()),
//! );
//!
//! let report = sensor_loop.tick();
//! assert_eq!(report.event.sequence_num, 1);
//! assert_eq!(sink.events().len(), 1);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use proxguard_hal::{RangeSensor, VisionSensor};
use proxguard_perception::{
    DistanceTracker, EventClassifier, FusionConfig, SensorCorrelator, TrackerAssessment,
    VisionProcessor,
};
use proxguard_types::{Event, MotionSummary, VisionAssessment};
use tracing::{debug, info_span, warn};

use crate::transport::EventSink;

/// Distance reported to the fusion core when ranging fails.
pub const NOISE_SENTINEL_CM: f64 = 0.0;

/// Everything one tick produced.
#[derive(Debug, Clone)]
pub struct TickReport {
    pub event: Event,
    pub tracker: TrackerAssessment,
    pub vision: VisionAssessment,
    /// `false` when the sink rejected the event.
    pub delivered: bool,
}

pub struct SensorLoop {
    range: Box<dyn RangeSensor>,
    camera: Box<dyn VisionSensor>,
    sink: Box<dyn EventSink>,
    tracker: DistanceTracker,
    vision: VisionProcessor,
    correlator: SensorCorrelator,
    classifier: EventClassifier,
    interval: Duration,
    sequence: u64,
    previous_distance: Option<f64>,
}

impl SensorLoop {
    pub fn new(
        config: &FusionConfig,
        sensor_id: impl Into<String>,
        range: Box<dyn RangeSensor>,
        camera: Box<dyn VisionSensor>,
        sink: Box<dyn EventSink>,
    ) -> Self {
        Self {
            range,
            camera,
            sink,
            tracker: DistanceTracker::new(config.tracker.clone()),
            vision: VisionProcessor::new(config.vision.clone(), config.approach.clone()),
            correlator: SensorCorrelator::new(config.correlator.clone(), config.loop_interval_s),
            classifier: EventClassifier::new(
                config.classifier.clone(),
                config.correlator.approach_speed_cm_s,
                sensor_id,
            ),
            // Negative or non-finite intervals degrade to back-to-back ticks.
            interval: Duration::try_from_secs_f64(config.loop_interval_s)
                .unwrap_or(Duration::ZERO),
            sequence: 0,
            previous_distance: None,
        }
    }

    /// Sequence number of the most recent event (0 before the first tick).
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn sink_name(&self) -> &str {
        self.sink.name()
    }

    /// Run one tick timestamped now.
    pub fn tick(&mut self) -> TickReport {
        self.tick_at(Instant::now())
    }

    /// Run one tick with a caller-supplied acquisition instant.
    pub fn tick_at(&mut self, now: Instant) -> TickReport {
        self.sequence += 1;
        let span = info_span!("tick", sequence = self.sequence);
        let _entered = span.enter();

        let distance = self.acquire_distance();
        let frame = self.acquire_frame();

        let tracker = self.tracker.update_at(distance, now);
        let vision = self.vision.process(&frame);
        let velocity = self
            .correlator
            .update(distance, self.previous_distance, vision);
        let correlated = self.correlator.is_correlated_approach();
        self.previous_distance = Some(distance);

        let mut event =
            self.classifier
                .classify(distance, velocity, &vision, correlated, self.sequence);
        tracker.annotate(&mut event.payload);
        debug!(
            event_type = %event.event_type,
            distance_cm = distance,
            velocity_cm_s = event.payload.velocity_cm_s,
            correlated,
            "tick classified"
        );

        let delivered = match self.sink.send(&event) {
            Ok(()) => true,
            Err(e) => {
                warn!(sink = self.sink.name(), error = %e, "event dropped");
                false
            }
        };

        TickReport {
            event,
            tracker,
            vision,
            delivered,
        }
    }

    /// Tick until `shutdown` is set or `max_ticks` ticks have run, sleeping
    /// out the remainder of the interval after each one. Returns the number
    /// of ticks executed.
    pub fn run<F>(&mut self, shutdown: &AtomicBool, max_ticks: Option<u64>, mut on_tick: F) -> u64
    where
        F: FnMut(&TickReport),
    {
        let mut ticks = 0u64;
        while !shutdown.load(Ordering::SeqCst) {
            let started = Instant::now();
            let report = self.tick_at(started);
            on_tick(&report);
            ticks += 1;

            if max_ticks.is_some_and(|max| ticks >= max) {
                break;
            }
            if let Some(rest) = self.interval.checked_sub(started.elapsed()) {
                thread::sleep(rest);
            }
        }
        ticks
    }

    fn acquire_distance(&mut self) -> f64 {
        match self.range.measure() {
            Ok(d) => d,
            Err(e) => {
                warn!(sensor = self.range.id(), error = %e, "range acquisition failed");
                NOISE_SENTINEL_CM
            }
        }
    }

    fn acquire_frame(&mut self) -> MotionSummary {
        match self.camera.sample() {
            Ok(frame) => frame,
            Err(e) => {
                warn!(sensor = self.camera.id(), error = %e, "vision acquisition failed");
                MotionSummary::default()
            }
        }
    }
}
