use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use crate::models::domain::{HelperProfile, MatchMode, RankedMatch, ScoreBreakdown};
use crate::services::CacheStats;

/// Helper fields echoed back with a match; embeddings are left out
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelperSummary {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_narrative: Option<String>,
    pub themes_experience: BTreeMap<String, f64>,
    pub reliability_score: f64,
    pub response_rate: f64,
    pub completion_rate: f64,
    pub support_strengths: BTreeMap<String, f64>,
}

impl From<&HelperProfile> for HelperSummary {
    fn from(helper: &HelperProfile) -> Self {
        Self {
            id: helper.id.clone(),
            experience_narrative: helper.experience_narrative.clone(),
            themes_experience: helper.themes_experience.clone(),
            reliability_score: helper.reliability_score,
            response_rate: helper.response_rate,
            completion_rate: helper.completion_rate,
            support_strengths: helper.support_strengths.clone(),
        }
    }
}

/// One ranked match as returned over the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchView {
    pub rank: usize,
    pub helper_id: String,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
    pub helper: HelperSummary,
}

impl MatchView {
    pub fn from_ranked(rank: usize, ranked: &RankedMatch<'_>) -> Self {
        Self {
            rank,
            helper_id: ranked.helper_id.to_string(),
            score: ranked.score,
            breakdown: ranked.breakdown,
            helper: HelperSummary::from(ranked.helper),
        }
    }
}

/// Response for find matches endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindMatchesResponse {
    pub request_id: uuid::Uuid,
    pub seeker_id: String,
    pub mode: MatchMode,
    pub matches: Vec<MatchView>,
    pub total_candidates: usize,
}

/// Response for single pair scoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorePairResponse {
    pub seeker_id: String,
    pub helper_id: String,
    pub mode: MatchMode,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub embedding_model: String,
    pub learned_scorer: bool,
    /// Present when embeddings go through the in-memory cache
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding_cache: Option<CacheStats>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
