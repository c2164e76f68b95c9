//! Student risk scoring and intervention tracking.
//!
//! [`risk::RiskScorer`] turns a semester's academic, attendance and behavior
//! records into a capped composite score and a [`models::RiskTier`].
//! [`interventions::InterventionTracker`] paces remediation plans against
//! their timeline. Both run synchronously over the collaborator traits in
//! [`store`]. [`db`] adapts them to Postgres.

pub mod access;
pub mod db;
pub mod error;
pub mod interventions;
pub mod models;
pub mod notify;
pub mod numeric;
pub mod recommend;
pub mod report;
pub mod risk;
pub mod roster;
pub mod store;

pub use error::{Error, Result};
