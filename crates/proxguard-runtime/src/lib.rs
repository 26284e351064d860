//! `proxguard-runtime` – the tick loop that drives the fusion core.
//!
//! # Modules
//!
//! - [`sensor_loop`] – [`SensorLoop`][sensor_loop::SensorLoop]: acquires one
//!   range reading and one vision frame per tick, runs them through the
//!   perception pipeline, and hands the classified event to a sink.
//! - [`transport`] – the [`EventSink`][transport::EventSink] seam with
//!   [`HttpSink`][transport::HttpSink] (POST to the signing service),
//!   [`LogSink`][transport::LogSink] and
//!   [`MemorySink`][transport::MemorySink].
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: global
//!   `tracing` subscriber with an optional OTLP span exporter.

pub mod sensor_loop;
pub mod telemetry;
pub mod transport;

pub use sensor_loop::{NOISE_SENTINEL_CM, SensorLoop, TickReport};
pub use telemetry::{TracerProviderGuard, init_tracing};
pub use transport::{DEFAULT_SEND_TIMEOUT, EventSink, HttpSink, LogSink, MemorySink};
