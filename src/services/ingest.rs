use crate::core::MatchError;
use crate::models::{HelperProfile, Profile, SeekerProfile};
use crate::services::embeddings::{EmbeddingError, EmbeddingProvider};
use std::sync::Arc;
use thiserror::Error;
use validator::Validate;

/// Errors raised while turning request profiles into engine input
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Profile(#[from] MatchError),

    #[error("Failed to embed text for {id}: {source}")]
    Embedding {
        id: String,
        #[source]
        source: EmbeddingError,
    },
}

/// Validates incoming profiles and fills in missing embeddings
///
/// This is the only place free text is embedded. Profiles leave here
/// immutable and ready for the matcher.
#[derive(Clone)]
pub struct ProfileIngestor {
    provider: Arc<dyn EmbeddingProvider>,
}

impl ProfileIngestor {
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &dyn EmbeddingProvider {
        self.provider.as_ref()
    }

    pub async fn seeker(&self, profile: Profile) -> Result<SeekerProfile, IngestError> {
        let mut seeker = into_seeker(profile)?;

        if seeker.embedding.is_empty() {
            let text = embeddable_text(&seeker.id, seeker.vent_text.as_deref())?;
            seeker.embedding = self.embed(&seeker.id, text).await?;
        }
        Ok(seeker)
    }

    pub async fn helper(&self, profile: Profile) -> Result<HelperProfile, IngestError> {
        let mut helper = into_helper(profile)?;

        if helper.embedding.is_empty() {
            let text = embeddable_text(&helper.id, helper.experience_narrative.as_deref())?;
            helper.embedding = self.embed(&helper.id, text).await?;
        }
        Ok(helper)
    }

    /// Ingest a helper pool, rejecting duplicate ids
    ///
    /// Every profile is validated before any text is embedded. Narratives of
    /// helpers without an embedding go to the provider in one batch.
    pub async fn helpers(&self, profiles: Vec<Profile>) -> Result<Vec<HelperProfile>, IngestError> {
        let mut helpers: Vec<HelperProfile> = Vec::with_capacity(profiles.len());
        let mut seen = std::collections::HashSet::with_capacity(profiles.len());

        for profile in profiles {
            if !seen.insert(profile.id().to_string()) {
                return Err(MatchError::malformed(profile.id(), "duplicate helper id").into());
            }
            helpers.push(into_helper(profile)?);
        }

        let pending: Vec<usize> = helpers
            .iter()
            .enumerate()
            .filter(|(_, helper)| helper.embedding.is_empty())
            .map(|(i, _)| i)
            .collect();

        if !pending.is_empty() {
            let texts = pending
                .iter()
                .map(|&i| {
                    let helper = &helpers[i];
                    embeddable_text(&helper.id, helper.experience_narrative.as_deref()).map(str::to_string)
                })
                .collect::<Result<Vec<String>, MatchError>>()?;

            let batch_id = match pending.as_slice() {
                [only] => helpers[*only].id.clone(),
                _ => format!("batch of {} helpers", pending.len()),
            };
            let embeddings = self
                .provider
                .embed_batch(&texts)
                .await
                .map_err(|source| IngestError::Embedding { id: batch_id.clone(), source })?;

            if embeddings.len() != pending.len() {
                return Err(IngestError::Embedding {
                    id: batch_id,
                    source: EmbeddingError::InvalidResponse(format!(
                        "Expected {} embeddings, got {}",
                        pending.len(),
                        embeddings.len()
                    )),
                });
            }

            for (i, embedding) in pending.into_iter().zip(embeddings) {
                helpers[i].embedding = embedding;
            }
        }

        tracing::debug!("Ingested {} helper profiles", helpers.len());
        Ok(helpers)
    }

    async fn embed(&self, id: &str, text: &str) -> Result<Vec<f32>, IngestError> {
        self.provider
            .embed(text)
            .await
            .map_err(|source| IngestError::Embedding {
                id: id.to_string(),
                source,
            })
    }
}

fn into_seeker(profile: Profile) -> Result<SeekerProfile, MatchError> {
    check(&profile)?;
    match profile {
        Profile::Seeker(seeker) => Ok(seeker),
        Profile::Helper(helper) => Err(MatchError::malformed(helper.id, "expected role seeker, got helper")),
    }
}

fn into_helper(profile: Profile) -> Result<HelperProfile, MatchError> {
    check(&profile)?;
    match profile {
        Profile::Helper(helper) => Ok(helper),
        Profile::Seeker(seeker) => Err(MatchError::malformed(seeker.id, "expected role helper, got seeker")),
    }
}

fn embeddable_text<'a>(id: &str, text: Option<&'a str>) -> Result<&'a str, MatchError> {
    text.map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| MatchError::malformed(id, "profile has neither an embedding nor text to embed"))
}

/// Structural validation shared by both roles
fn check(profile: &Profile) -> Result<(), MatchError> {
    profile
        .validate()
        .map_err(|errors| MatchError::malformed(profile.id(), errors.to_string()))?;

    let embedding = match profile {
        Profile::Seeker(seeker) => &seeker.embedding,
        Profile::Helper(helper) => &helper.embedding,
    };
    if embedding.iter().any(|v| !v.is_finite()) {
        return Err(MatchError::malformed(profile.id(), "embedding contains non-finite values"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::embeddings::HashEmbeddings;
    use serde_json::json;

    fn ingestor() -> ProfileIngestor {
        ProfileIngestor::new(Arc::new(HashEmbeddings::new(32)))
    }

    fn seeker_json() -> serde_json::Value {
        json!({
            "role": "seeker",
            "id": "sarah",
            "vent_text": "overwhelmed with finals and feeling alone",
            "themes": [{"name": "Exam Stress", "intensity": 0.95}],
            "coping_style_preference": {
                "problem_focused": 0.3, "emotion_focused": 0.8, "social_support": 0.9,
                "avoidant": 0.1, "meaning_making": 0.4
            },
            "conversation_preference": {
                "direct_advice": 0.3, "reflective_listening": 0.9,
                "collaborative_problem_solving": 0.5, "validation_focused": 0.8
            },
            "availability_windows": [{"day": "Mon", "start_minute": 1080, "end_minute": 1200}],
            "energy_level": "depleted",
            "distress_level": "high",
            "urgency": 0.85
        })
    }

    fn helper_json(id: &str) -> serde_json::Value {
        json!({
            "role": "helper",
            "id": id,
            "experience_narrative": "I struggled with exam anxiety throughout college",
            "themes_experience": {"Exam Stress": 0.95},
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
            "reliability_score": 0.92,
            "response_rate": 0.95,
            "completion_rate": 0.88
        })
    }

    #[tokio::test]
    async fn test_seeker_text_is_embedded() {
        let profile: Profile = serde_json::from_value(seeker_json()).unwrap();
        let seeker = ingestor().seeker(profile).await.unwrap();
        assert_eq!(seeker.embedding.len(), 32);
    }

    #[tokio::test]
    async fn test_supplied_embedding_is_kept() {
        let mut value = seeker_json();
        value["embedding"] = json!([1.0, 0.0]);
        let profile: Profile = serde_json::from_value(value).unwrap();
        let seeker = ingestor().seeker(profile).await.unwrap();
        assert_eq!(seeker.embedding, vec![1.0, 0.0]);
    }

    #[tokio::test]
    async fn test_wrong_role_rejected() {
        let profile: Profile = serde_json::from_value(helper_json("alex")).unwrap();
        let err = ingestor().seeker(profile).await.unwrap_err();
        assert!(matches!(err, IngestError::Profile(MatchError::MalformedProfile { .. })));
    }

    #[tokio::test]
    async fn test_out_of_range_rejected() {
        let mut value = helper_json("alex");
        value["reliability_score"] = json!(1.5);
        let profile: Profile = serde_json::from_value(value).unwrap();
        let err = ingestor().helper(profile).await.unwrap_err();
        assert!(matches!(err, IngestError::Profile(MatchError::MalformedProfile { ref id, .. }) if id == "alex"));
    }

    #[tokio::test]
    async fn test_missing_text_and_embedding_rejected() {
        let mut value = helper_json("alex");
        value.as_object_mut().unwrap().remove("experience_narrative");
        let profile: Profile = serde_json::from_value(value).unwrap();
        assert!(ingestor().helper(profile).await.is_err());
    }

    #[tokio::test]
    async fn test_duplicate_helper_ids_rejected() {
        let profiles = vec![
            serde_json::from_value(helper_json("alex")).unwrap(),
            serde_json::from_value(helper_json("alex")).unwrap(),
        ];
        assert!(ingestor().helpers(profiles).await.is_err());
    }

    struct BatchCounting {
        inner: HashEmbeddings,
        single_calls: std::sync::atomic::AtomicUsize,
        batch_calls: std::sync::atomic::AtomicUsize,
    }

    #[async_trait::async_trait]
    impl EmbeddingProvider for BatchCounting {
        fn dimension(&self) -> usize {
            self.inner.dimension()
        }

        fn model_name(&self) -> &str {
            "batch-counting"
        }

        async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
            self.single_calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            self.inner.embed_text(text)
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            self.batch_calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            texts.iter().map(|t| self.inner.embed_text(t)).collect()
        }
    }

    #[tokio::test]
    async fn test_helper_pool_embedded_in_one_batch() {
        let provider = Arc::new(BatchCounting {
            inner: HashEmbeddings::new(32),
            single_calls: Default::default(),
            batch_calls: Default::default(),
        });
        let ingestor = ProfileIngestor::new(provider.clone());

        let mut with_embedding = helper_json("sam");
        with_embedding["embedding"] = json!(vec![0.5; 32]);

        let profiles = vec![
            serde_json::from_value(helper_json("alex")).unwrap(),
            serde_json::from_value(with_embedding).unwrap(),
            serde_json::from_value(helper_json("jordan")).unwrap(),
        ];
        let helpers = ingestor.helpers(profiles).await.unwrap();

        assert_eq!(helpers.len(), 3);
        assert!(helpers.iter().all(|h| h.embedding.len() == 32));
        assert_eq!(helpers[1].embedding, vec![0.5; 32]);
        assert_eq!(provider.batch_calls.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert_eq!(provider.single_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }
}
