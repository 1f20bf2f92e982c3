use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::config::{MatchingSettings, ProviderKind, Settings};
use crate::core::{MatchError, Matcher};
use crate::models::{
    ErrorResponse, FindMatchesRequest, FindMatchesResponse, HealthResponse, MatchView,
    ScorePairRequest, ScorePairResponse, ScoringWeights,
};
use crate::services::{
    CachedEmbeddings, EmbeddingError, EmbeddingProvider, HashEmbeddings, IngestError,
    LinearModel, ModelError, OpenAiEmbeddings, ProfileIngestor,
};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while building the application state
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Embedding provider: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Learned model: {0}")]
    Model(#[from] ModelError),

    #[error("Matcher: {0}")]
    Matcher(#[from] MatchError),
}

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub matcher: Matcher,
    pub ingestor: ProfileIngestor,
    pub default_top_k: usize,
    pub max_top_k: usize,
}

impl AppState {
    pub fn new(matcher: Matcher, ingestor: ProfileIngestor, matching: &MatchingSettings) -> Self {
        Self {
            matcher,
            ingestor,
            default_top_k: matching.default_top_k.unwrap_or(5),
            max_top_k: matching.max_top_k.unwrap_or(100),
        }
    }

    /// Wire up the embedding provider, the matcher and its optional model
    pub fn from_settings(settings: &Settings) -> Result<Self, StartupError> {
        let embeddings = &settings.embeddings;

        let provider: Arc<dyn EmbeddingProvider> = match embeddings.provider {
            ProviderKind::OpenAi => {
                let remote = OpenAiEmbeddings::with_model(
                    embeddings
                        .base_url
                        .clone()
                        .unwrap_or_else(|| OpenAiEmbeddings::DEFAULT_BASE_URL.to_string()),
                    embeddings.api_key.clone().unwrap_or_default(),
                    embeddings
                        .model
                        .clone()
                        .unwrap_or_else(|| "text-embedding-3-small".to_string()),
                    embeddings.dimension,
                )?;
                Arc::new(CachedEmbeddings::new(
                    remote,
                    embeddings.cache_size.unwrap_or(10_000),
                    embeddings.cache_ttl_secs.unwrap_or(3600),
                ))
            }
            ProviderKind::Hash => Arc::new(HashEmbeddings::new(embeddings.dimension)),
        };

        tracing::info!(
            "Embedding provider: {} ({} dimensions)",
            provider.model_name(),
            provider.dimension()
        );

        let mut matcher = Matcher::new(ScoringWeights::from(&settings.scoring.weights))?;
        if let Some(path) = &settings.scoring.learned_model_path {
            matcher = matcher.with_predictor(Arc::new(LinearModel::load(path)?));
        }

        Ok(Self::new(
            matcher,
            ProfileIngestor::new(provider),
            &settings.matching,
        ))
    }

    /// Resolve the requested `top_k`: default when absent, capped, never negative
    fn top_k(&self, requested: Option<i64>) -> usize {
        match requested {
            None => self.default_top_k,
            Some(k) if k <= 0 => 0,
            Some(k) => (k as u64).min(self.max_top_k as u64) as usize,
        }
    }
}

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/matches/find", web::post().to(find_matches))
        .route("/matches/score", web::post().to(score_pair));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        embedding_model: state.ingestor.provider().model_name().to_string(),
        learned_scorer: state.matcher.has_learned_scorer(),
        embedding_cache: state.ingestor.provider().cache_stats(),
    })
}

/// Find matches endpoint
///
/// POST /api/v1/matches/find
///
/// Request body:
/// ```json
/// {
///   "seeker": { "role": "seeker", "id": "string", ... },
///   "helpers": [{ "role": "helper", "id": "string", ... }],
///   "top_k": 5,
///   "mode": "heuristic|learned"
/// }
/// ```
async fn find_matches(
    state: web::Data<AppState>,
    req: web::Json<FindMatchesRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for find_matches request: {:?}", errors);
        return error_response(400, "Validation failed", errors.to_string());
    }

    let FindMatchesRequest { seeker, helpers, top_k, mode } = req.into_inner();
    let top_k = state.top_k(top_k);

    tracing::info!(
        "Finding matches for seeker: {}, pool: {}, top_k: {}, mode: {:?}",
        seeker.id(),
        helpers.len(),
        top_k,
        mode
    );

    let seeker = match state.ingestor.seeker(seeker).await {
        Ok(seeker) => seeker,
        Err(e) => return ingest_error_response(&e),
    };
    let helpers = match state.ingestor.helpers(helpers).await {
        Ok(helpers) => helpers,
        Err(e) => return ingest_error_response(&e),
    };

    // Ranking is CPU bound; keep it off the async workers
    let matcher = state.matcher.clone();
    let seeker_id = seeker.id.clone();
    let ranked = web::block(move || {
        matcher.rank(&seeker, &helpers, top_k, mode).map(|result| {
            let views: Vec<MatchView> = result
                .matches
                .iter()
                .enumerate()
                .map(|(i, ranked)| MatchView::from_ranked(i + 1, ranked))
                .collect();
            (views, result.total_candidates)
        })
    })
    .await;

    let (matches, total_candidates) = match ranked {
        Ok(Ok(ranked)) => ranked,
        Ok(Err(e)) => {
            tracing::warn!("Matching failed for seeker {}: {}", seeker_id, e);
            return match_error_response(&e);
        }
        Err(e) => {
            tracing::error!("Matching task failed for seeker {}: {}", seeker_id, e);
            return error_response(500, "Matching task failed", e.to_string());
        }
    };

    tracing::info!(
        "Returning {} matches for seeker {} (from {} candidates)",
        matches.len(),
        seeker_id,
        total_candidates
    );

    HttpResponse::Ok().json(FindMatchesResponse {
        request_id: uuid::Uuid::new_v4(),
        seeker_id,
        mode,
        matches,
        total_candidates,
    })
}

/// Score a single seeker/helper pair
///
/// POST /api/v1/matches/score
async fn score_pair(
    state: web::Data<AppState>,
    req: web::Json<ScorePairRequest>,
) -> impl Responder {
    let ScorePairRequest { seeker, helper, mode } = req.into_inner();

    let seeker = match state.ingestor.seeker(seeker).await {
        Ok(seeker) => seeker,
        Err(e) => return ingest_error_response(&e),
    };
    let helper = match state.ingestor.helper(helper).await {
        Ok(helper) => helper,
        Err(e) => return ingest_error_response(&e),
    };

    match state.matcher.score(&seeker, &helper, mode) {
        Ok((score, breakdown)) => HttpResponse::Ok().json(ScorePairResponse {
            seeker_id: seeker.id,
            helper_id: helper.id,
            mode,
            score,
            breakdown,
        }),
        Err(e) => match_error_response(&e),
    }
}

fn error_response(status_code: u16, error: &str, message: String) -> HttpResponse {
    let status = actix_web::http::StatusCode::from_u16(status_code)
        .unwrap_or(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR);

    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code,
    })
}

fn match_error_response(err: &MatchError) -> HttpResponse {
    let (status, error) = match err {
        MatchError::MalformedProfile { .. } => (400, "Malformed profile"),
        MatchError::DimensionMismatch { .. } => (422, "Embedding dimension mismatch"),
        MatchError::ScorerUnavailable => (409, "Learned scorer unavailable"),
        MatchError::InvalidWeights(_) | MatchError::InvalidPrediction(_) => (500, "Scoring failed"),
    };
    error_response(status, error, err.to_string())
}

fn ingest_error_response(err: &IngestError) -> HttpResponse {
    match err {
        IngestError::Profile(e) => {
            tracing::info!("Rejected profile: {}", e);
            match_error_response(e)
        }
        IngestError::Embedding { .. } => {
            tracing::error!("{}", err);
            error_response(502, "Embedding provider failed", err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};
    use serde_json::json;

    fn state() -> AppState {
        AppState::new(
            Matcher::with_default_weights(),
            ProfileIngestor::new(Arc::new(HashEmbeddings::new(64))),
            &MatchingSettings::default(),
        )
    }

    fn seeker() -> serde_json::Value {
        json!({
            "role": "seeker",
            "id": "sarah",
            "vent_text": "overwhelmed with finals, exam anxiety, I feel alone",
            "themes": [
                {"name": "Exam Stress", "intensity": 0.95},
                {"name": "Loneliness", "intensity": 0.8}
            ],
            "coping_style_preference": {
                "problem_focused": 0.3, "emotion_focused": 0.8, "social_support": 0.9,
                "avoidant": 0.1, "meaning_making": 0.4
            },
            "conversation_preference": {
                "direct_advice": 0.3, "reflective_listening": 0.9,
                "collaborative_problem_solving": 0.5, "validation_focused": 0.8
            },
            "energy_level": "depleted",
            "distress_level": "High",
            "urgency": 0.85
        })
    }

    fn helper(id: &str, exam: f64, loneliness: f64) -> serde_json::Value {
        json!({
            "role": "helper",
            "id": id,
            "experience_narrative": "exam anxiety in college, I felt alone",
            "themes_experience": {"Exam Stress": exam, "Loneliness": loneliness},
            "coping_style_expertise": {
                "problem_focused": 0.6, "emotion_focused": 0.9, "social_support": 0.8,
                "avoidant": 0.2, "meaning_making": 0.7
            },
            "conversation_style": {
                "direct_advice": 0.3, "reflective_listening": 0.95,
                "collaborative_problem_solving": 0.6, "validation_focused": 0.9
            },
            "energy_level": "moderate",
            "energy_consistency": 0.85,
            "reliability_score": 0.9,
            "response_rate": 0.9,
            "completion_rate": 0.9
        })
    }

    #[actix_web::test]
    async fn test_top_k_resolution() {
        let state = state();
        assert_eq!(state.top_k(None), 5);
        assert_eq!(state.top_k(Some(-3)), 0);
        assert_eq!(state.top_k(Some(1_000)), 100);
        assert_eq!(state.top_k(Some(2)), 2);
    }

    #[actix_web::test]
    async fn test_find_matches_endpoint() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state()))
                .configure(crate::routes::configure_routes),
        )
        .await;

        let body = json!({
            "seeker": seeker(),
            "helpers": [helper("jordan", 0.2, 0.3), helper("alex", 0.95, 0.7)],
            "top_k": 5
        });
        let req = test::TestRequest::post()
            .uri("/api/v1/matches/find")
            .set_json(&body)
            .to_request();

        let resp: FindMatchesResponse = test::call_and_read_body_json(&app, req).await;

        assert_eq!(resp.seeker_id, "sarah");
        assert_eq!(resp.total_candidates, 2);
        assert_eq!(resp.matches.len(), 2);
        assert_eq!(resp.matches[0].helper_id, "alex");
        assert_eq!(resp.matches[0].rank, 1);
    }

    #[actix_web::test]
    async fn test_learned_mode_without_model_conflicts() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state()))
                .configure(crate::routes::configure_routes),
        )
        .await;

        let body = json!({
            "seeker": seeker(),
            "helpers": [helper("alex", 0.95, 0.7)],
            "mode": "learned"
        });
        let req = test::TestRequest::post()
            .uri("/api/v1/matches/find")
            .set_json(&body)
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 409);
    }

    #[actix_web::test]
    async fn test_dimension_mismatch_is_unprocessable() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state()))
                .configure(crate::routes::configure_routes),
        )
        .await;

        let mut seeker = seeker();
        seeker["embedding"] = json!(vec![0.1; 64]);
        let mut helper = helper("alex", 0.95, 0.7);
        helper["embedding"] = json!(vec![0.1; 128]);

        let req = test::TestRequest::post()
            .uri("/api/v1/matches/score")
            .set_json(json!({"seeker": seeker, "helper": helper}))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 422);
    }

    #[actix_web::test]
    async fn test_health_check() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state()))
                .configure(crate::routes::configure_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/v1/health").to_request();
        let resp: HealthResponse = test::call_and_read_body_json(&app, req).await;

        assert_eq!(resp.status, "healthy");
        assert_eq!(resp.embedding_model, "fnv1a-hash");
        assert!(!resp.learned_scorer);
        assert!(resp.embedding_cache.is_none());
    }

    #[actix_web::test]
    async fn test_health_reports_cache_stats() {
        let cached = CachedEmbeddings::new(HashEmbeddings::new(64), 100, 60);
        let state = AppState::new(
            Matcher::with_default_weights(),
            ProfileIngestor::new(Arc::new(cached)),
            &MatchingSettings::default(),
        );
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(crate::routes::configure_routes),
        )
        .await;

        let body = json!({
            "seeker": seeker(),
            "helpers": [helper("alex", 0.95, 0.7), helper("jordan", 0.2, 0.3)]
        });
        for _ in 0..2 {
            let req = test::TestRequest::post()
                .uri("/api/v1/matches/find")
                .set_json(&body)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert!(resp.status().is_success());
        }

        let req = test::TestRequest::get().uri("/api/v1/health").to_request();
        let resp: HealthResponse = test::call_and_read_body_json(&app, req).await;

        // Second request is served entirely from the cache
        let stats = resp.embedding_cache.unwrap();
        assert_eq!(stats.miss_count, 3);
        assert_eq!(stats.hit_count, 3);
    }

    #[actix_web::test]
    async fn test_score_pair_endpoint() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state()))
                .configure(crate::routes::configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/matches/score")
            .set_json(json!({"seeker": seeker(), "helper": helper("alex", 0.95, 0.7)}))
            .to_request();

        let resp: ScorePairResponse = test::call_and_read_body_json(&app, req).await;

        assert_eq!(resp.helper_id, "alex");
        assert!((0.0..=1.0).contains(&resp.score));
        assert!((resp.breakdown.reliability_score - 0.9).abs() < 1e-9);
    }

    #[actix_web::test]
    async fn test_out_of_range_profile_is_bad_request() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state()))
                .configure(crate::routes::configure_routes),
        )
        .await;

        let mut helper = helper("alex", 0.95, 0.7);
        helper["response_rate"] = json!(1.4);

        let req = test::TestRequest::post()
            .uri("/api/v1/matches/find")
            .set_json(json!({"seeker": seeker(), "helpers": [helper]}))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 400);
    }
}
