use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::models::domain::{MatchMode, Profile};

/// Request to rank a helper pool for one seeker
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FindMatchesRequest {
    pub seeker: Profile,
    #[validate(length(max = 10000))]
    #[serde(default)]
    pub helpers: Vec<Profile>,
    /// Non-positive values yield an empty result
    #[serde(default, alias = "topK")]
    pub top_k: Option<i64>,
    #[serde(default)]
    pub mode: MatchMode,
}

/// Request to explain the score of a single pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorePairRequest {
    pub seeker: Profile,
    pub helper: Profile,
    #[serde(default)]
    pub mode: MatchMode,
}
