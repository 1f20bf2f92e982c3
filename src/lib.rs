//! PeerLink Match - explainable seeker-to-helper matching for peer support
//!
//! The engine scores every helper in a pool against one seeker by combining
//! embedding similarity with structured feature comparisons, then ranks the
//! pool with a deterministic tie-break. Every score comes with the unweighted
//! per-factor breakdown that produced it.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{MatchError, MatchResult, Matcher, Predictor, Scorer, similarity::similarity};
pub use crate::models::{HelperProfile, MatchMode, Profile, RankedMatch, ScoreBreakdown, ScoringWeights, SeekerProfile};
