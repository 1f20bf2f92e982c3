// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    AvailabilityWindow, ConversationStyle, CopingStyle, DistressLevel, EnergyLevel, HelperProfile,
    MatchMode, Profile, RankedMatch, ScoreBreakdown, ScoringWeights, SeekerProfile,
    ThemeIntensity, FEATURE_NAMES, MINUTES_PER_DAY,
};
pub use requests::{FindMatchesRequest, ScorePairRequest};
pub use responses::{ErrorResponse, FindMatchesResponse, HealthResponse, HelperSummary, MatchView, ScorePairResponse};
