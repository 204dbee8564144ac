//! Domain types for the Skillstack learning tracker.
//!
//! Pure data and logic only: goals, logged activities, the field-edit
//! vocabulary consumed by the sync store, and client-side aggregate
//! insights. No I/O happens in this crate.

pub mod activity;
pub mod error;
pub mod goal;
pub mod insights;
pub mod types;
