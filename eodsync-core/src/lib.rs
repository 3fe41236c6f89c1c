//! EodSync Core — daily end-of-day sync and retroactive adjustment pipeline.
//!
//! This crate contains the whole session pipeline:
//! - Domain types (EOD rows, snapshot rows, corporate actions, ISIN identifiers)
//! - Exchange feed trait with a blocking NSE implementation
//! - Per-instrument CSV series store and the ISIN↔symbol map
//! - Holiday calendar with a yearly cache
//! - Corporate-action store with a 7-day refresh cadence and free-text parsing
//! - Session sync engine (snapshot merge, rename tracking, archive)
//! - Adjustment engine (split/bonus rescaling, compute-then-commit batch)
//! - Rollback coordinator and session cursor
//!
//! One run processes trading dates one at a time until it catches up with
//! wall-clock today; any fatal error rolls the in-flight date back and halts.

pub mod actions;
pub mod adjust;
pub mod calendar;
pub mod cleanup;
pub mod config;
pub mod cursor;
pub mod domain;
pub mod feed;
pub mod pipeline;
pub mod rollback;
pub mod store;
pub mod sync;
