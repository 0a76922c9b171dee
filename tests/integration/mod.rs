//! Integration test suite for the kernel.
//!
//! These tests drive the public API end to end: submissions, scheduler
//! steps, status snapshots and shutdown.
//!
//! # Test Categories
//!
//! - `scenarios`: The reference dispatch/progress/shutdown walkthroughs
//! - `scheduling`: FIFO, fairness and offline-node behaviour across steps
//! - `cli`: The `dtk` binary driven over stdin

mod fixtures;

mod scenarios;
mod scheduling;
