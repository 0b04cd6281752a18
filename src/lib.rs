//! Governance metrics for open-source projects.
//!
//! Contribution-inequality measures (entropy, Gini, bus factor, top-k
//! share), weighted Viable System Model health, Ostrom principle scoring
//! from governance artifacts, archetype classification
//! (federation / stadium / club / toy) and the rank statistics used to
//! check that archetypes differ.

pub mod batch;
pub mod classify;
pub mod config;
pub mod error;
pub mod metrics;
pub mod ostrom;
pub mod report;
pub mod stats;
pub mod types;
pub mod vsm;

pub use error::{GovernanceError, Result};
pub use metrics::MetricsRecord;
pub use types::project::{CategoryLabel, ContributionDistribution, GovernanceProject};
