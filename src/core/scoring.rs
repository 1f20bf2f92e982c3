use crate::core::error::MatchError;
use crate::core::features::{
    availability_overlap, conversation_style_match, coping_style_match, experience_overlap,
    reliability_trust,
};
use crate::core::similarity::similarity;
use crate::models::{HelperProfile, ScoreBreakdown, ScoringWeights, SeekerProfile, FEATURE_NAMES};
use std::fmt;
use std::sync::Arc;

/// Externally trained model behind the learned scoring mode
///
/// Receives the component scores in [`FEATURE_NAMES`] order and returns a
/// match score. How the model was trained is none of the engine's business.
pub trait Predictor: Send + Sync {
    fn predict(&self, features: &[f64]) -> f64;
}

/// Strategy that turns a breakdown into one final score in [0, 1]
pub trait Scorer: Send + Sync {
    fn combine(&self, breakdown: &ScoreBreakdown) -> Result<f64, MatchError>;
}

/// Fixed convex combination of the component scores
#[derive(Debug, Clone, Copy)]
pub struct HeuristicScorer {
    weights: ScoringWeights,
}

impl HeuristicScorer {
    pub fn new(weights: ScoringWeights) -> Result<Self, MatchError> {
        weights.check().map_err(MatchError::InvalidWeights)?;
        Ok(Self { weights })
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }
}

impl Default for HeuristicScorer {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
        }
    }
}

impl Scorer for HeuristicScorer {
    fn combine(&self, breakdown: &ScoreBreakdown) -> Result<f64, MatchError> {
        let total: f64 = breakdown
            .features()
            .iter()
            .zip(self.weights.as_array())
            .map(|(score, weight)| score * weight)
            .sum();

        Ok(total.clamp(0.0, 1.0))
    }
}

/// Delegates scoring to a [`Predictor`]
#[derive(Clone)]
pub struct LearnedScorer {
    model: Arc<dyn Predictor>,
}

impl LearnedScorer {
    pub fn new(model: Arc<dyn Predictor>) -> Self {
        Self { model }
    }
}

impl fmt::Debug for LearnedScorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LearnedScorer").finish_non_exhaustive()
    }
}

impl Scorer for LearnedScorer {
    fn combine(&self, breakdown: &ScoreBreakdown) -> Result<f64, MatchError> {
        let prediction = self.model.predict(&breakdown.features());
        if !prediction.is_finite() {
            return Err(MatchError::InvalidPrediction(prediction));
        }
        Ok(prediction.clamp(0.0, 1.0))
    }
}

/// Compute every component score for a seeker/helper pair
///
/// The values are reported as-is: never weighted, never rescaled.
pub fn compute_breakdown(
    seeker: &SeekerProfile,
    helper: &HelperProfile,
) -> Result<ScoreBreakdown, MatchError> {
    let breakdown = ScoreBreakdown {
        emotional_similarity: similarity(&seeker.embedding, &helper.embedding)?,
        experience_overlap: experience_overlap(&seeker.themes, &helper.themes_experience),
        coping_style_match: coping_style_match(
            &seeker.coping_style_preference,
            &helper.coping_style_expertise,
        ),
        conversation_style_match: conversation_style_match(
            &seeker.conversation_preference,
            &helper.conversation_style,
        ),
        availability_overlap: availability_overlap(
            &seeker.availability_windows,
            &helper.availability_windows,
        ),
        reliability_score: reliability_trust(helper),
    };

    // NaN survives every clamp above, so unvalidated input shows up here
    if let Some((name, value)) = breakdown.labeled().find(|(_, v)| !v.is_finite()) {
        return Err(MatchError::malformed(
            &helper.id,
            format!("{} is not a number ({}) for seeker {}", name, value, seeker.id),
        ));
    }

    Ok(breakdown)
}

/// Score one pair with the given strategy
pub fn calculate_match_score(
    seeker: &SeekerProfile,
    helper: &HelperProfile,
    scorer: &dyn Scorer,
) -> Result<(f64, ScoreBreakdown), MatchError> {
    let breakdown = compute_breakdown(seeker, helper)?;
    let score = scorer.combine(&breakdown)?;
    Ok((score, breakdown))
}

/// Number of features handed to a [`Predictor`]
pub const FEATURE_COUNT: usize = FEATURE_NAMES.len();
