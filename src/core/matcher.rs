use crate::core::error::MatchError;
use crate::core::scoring::{calculate_match_score, HeuristicScorer, LearnedScorer, Predictor, Scorer};
use crate::models::{HelperProfile, MatchMode, RankedMatch, ScoreBreakdown, ScoringWeights, SeekerProfile};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::sync::Arc;

/// Result of the matching process
#[derive(Debug)]
pub struct MatchResult<'a> {
    pub matches: Vec<RankedMatch<'a>>,
    pub total_candidates: usize,
}

/// Matching engine entry point
///
/// Holds the heuristic weights and, optionally, a learned model. The scoring
/// mode is chosen per call; nothing is mutated between calls, so one
/// `Matcher` can be shared freely across threads.
#[derive(Debug, Clone)]
pub struct Matcher {
    heuristic: HeuristicScorer,
    learned: Option<LearnedScorer>,
}

impl Matcher {
    pub fn new(weights: ScoringWeights) -> Result<Self, MatchError> {
        Ok(Self {
            heuristic: HeuristicScorer::new(weights)?,
            learned: None,
        })
    }

    pub fn with_default_weights() -> Self {
        Self {
            heuristic: HeuristicScorer::default(),
            learned: None,
        }
    }

    /// Attach a learned model for [`MatchMode::Learned`] calls
    pub fn with_predictor(mut self, model: Arc<dyn Predictor>) -> Self {
        self.learned = Some(LearnedScorer::new(model));
        self
    }

    pub fn weights(&self) -> &ScoringWeights {
        self.heuristic.weights()
    }

    pub fn has_learned_scorer(&self) -> bool {
        self.learned.is_some()
    }

    /// Resolve the scoring strategy for a mode
    ///
    /// Learned mode without a model is an error; there is no silent fallback
    /// to the heuristic.
    pub fn scorer(&self, mode: MatchMode) -> Result<&dyn Scorer, MatchError> {
        match mode {
            MatchMode::Heuristic => Ok(&self.heuristic),
            MatchMode::Learned => self
                .learned
                .as_ref()
                .map(|scorer| scorer as &dyn Scorer)
                .ok_or(MatchError::ScorerUnavailable),
        }
    }

    /// Score a single seeker/helper pair
    pub fn score(
        &self,
        seeker: &SeekerProfile,
        helper: &HelperProfile,
        mode: MatchMode,
    ) -> Result<(f64, ScoreBreakdown), MatchError> {
        calculate_match_score(seeker, helper, self.scorer(mode)?)
    }

    /// Rank every helper in the pool for a seeker and keep the best `top_k`
    ///
    /// Every candidate is scored (in parallel); none are pruned early. Ties on
    /// score are broken by higher `reliability_score`, then by ascending
    /// helper id, so the output order is fully deterministic.
    ///
    /// # Errors
    /// Any per-candidate failure (dimension mismatch, malformed profile,
    /// learned scorer problems) fails the whole call.
    pub fn rank<'a>(
        &self,
        seeker: &SeekerProfile,
        helpers: &'a [HelperProfile],
        top_k: usize,
        mode: MatchMode,
    ) -> Result<MatchResult<'a>, MatchError> {
        let total_candidates = helpers.len();
        let scorer = self.scorer(mode)?;

        if top_k == 0 || helpers.is_empty() {
            return Ok(MatchResult {
                matches: Vec::new(),
                total_candidates,
            });
        }

        let mut matches: Vec<RankedMatch<'a>> = helpers
            .par_iter()
            .map(|helper| {
                let (score, breakdown) = calculate_match_score(seeker, helper, scorer)?;
                Ok(RankedMatch {
                    score,
                    helper_id: helper.id.as_str(),
                    breakdown,
                    helper,
                })
            })
            .collect::<Result<_, MatchError>>()?;

        matches.sort_by(compare_ranked);
        matches.truncate(top_k);

        tracing::debug!(
            seeker_id = %seeker.id,
            ?mode,
            returned = matches.len(),
            total_candidates,
            "ranked helper pool"
        );

        Ok(MatchResult {
            matches,
            total_candidates,
        })
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_weights()
    }
}

/// Score descending, then reliability descending, then id ascending
fn compare_ranked(a: &RankedMatch<'_>, b: &RankedMatch<'_>) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.helper.reliability_score.total_cmp(&a.helper.reliability_score))
        .then_with(|| a.helper_id.cmp(b.helper_id))
}
