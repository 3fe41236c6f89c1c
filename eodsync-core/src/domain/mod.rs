//! Domain types shared across the pipeline.

pub mod action;
pub mod bar;
pub mod snapshot;

pub use action::CorporateAction;
pub use bar::EodRow;
pub use snapshot::{Isin, SnapshotRow};
