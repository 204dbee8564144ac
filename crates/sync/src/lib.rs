//! Sync client for the Skillstack REST API.
//!
//! Provides the typed HTTP client ([`api::HttpLearningApi`]), wire-format
//! mapping, bearer-token storage, and [`store::GoalSyncStore`] -- the
//! optimistically-updated local mirror of the user's goals and
//! activities.

pub mod api;
pub mod config;
pub mod error;
pub mod events;
pub mod session;
pub mod store;
pub mod wire;
