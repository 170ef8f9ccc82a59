//! Observability module for monitoring the search engine.
//!
//! This module provides counters for queries, degradations and cache use, and
//! a timer that logs operation durations through `tracing`.

pub mod metrics;

pub use metrics::{SearchMetrics, Timer};
