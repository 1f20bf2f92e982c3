// Core algorithm exports
pub mod error;
pub mod features;
pub mod matcher;
pub mod scoring;
pub mod similarity;

pub use error::MatchError;
pub use features::{
    availability_overlap, conversation_style_match, coping_style_match, experience_overlap,
    reliability_trust,
};
pub use matcher::{MatchResult, Matcher};
pub use scoring::{
    calculate_match_score, compute_breakdown, HeuristicScorer, LearnedScorer, Predictor, Scorer,
    FEATURE_COUNT,
};
pub use similarity::similarity;
