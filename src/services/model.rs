use crate::core::{Predictor, FEATURE_COUNT};
use crate::models::FEATURE_NAMES;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur loading a learned model
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Failed to read model file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse model: {0}")]
    Parse(String),

    #[error("Model features {found:?} do not match engine features {expected:?}")]
    FeatureMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Link {
    #[default]
    Identity,
    Logistic,
}

/// Linear model over the match features, exported by an offline trainer
///
/// ```json
/// {
///   "feature_names": ["emotional_similarity", "..."],
///   "coefficients": [1.2, ...],
///   "intercept": -0.4,
///   "link": "logistic"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModel {
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
    #[serde(default)]
    pub link: Link,
}

impl LinearModel {
    /// Load from a `.json` or `.toml` file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;

        let model: LinearModel = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(&raw).map_err(|e| ModelError::Parse(e.to_string()))?,
            _ => serde_json::from_str(&raw).map_err(|e| ModelError::Parse(e.to_string()))?,
        };

        model.check()?;
        tracing::info!("Loaded learned model from {} ({:?} link)", path.display(), model.link);
        Ok(model)
    }

    /// Feature names and coefficient count must line up with the engine
    pub fn check(&self) -> Result<(), ModelError> {
        if self.feature_names.iter().map(String::as_str).ne(FEATURE_NAMES.iter().copied()) {
            return Err(ModelError::FeatureMismatch {
                expected: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
                found: self.feature_names.clone(),
            });
        }
        if self.coefficients.len() != FEATURE_COUNT {
            return Err(ModelError::Parse(format!(
                "expected {} coefficients, got {}",
                FEATURE_COUNT,
                self.coefficients.len()
            )));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ModelError::Parse("coefficients must be finite".to_string()));
        }
        Ok(())
    }
}

impl Predictor for LinearModel {
    fn predict(&self, features: &[f64]) -> f64 {
        let z = self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(c, x)| c * x)
                .sum::<f64>();

        match self.link {
            Link::Identity => z,
            Link::Logistic => 1.0 / (1.0 + (-z).exp()),
        }
    }
}
