use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::{Validate, ValidationError, ValidationErrors};

/// Minutes in one day; availability windows never cross midnight
pub const MINUTES_PER_DAY: u16 = 1440;

/// Coping style dimensions
///
/// Seekers express these as a preference, helpers as expertise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct CopingStyle {
    #[validate(range(min = 0.0, max = 1.0))]
    pub problem_focused: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub emotion_focused: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub social_support: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub avoidant: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub meaning_making: f64,
}

impl CopingStyle {
    pub const DIMENSIONS: usize = 5;

    pub fn as_array(&self) -> [f64; Self::DIMENSIONS] {
        [
            self.problem_focused,
            self.emotion_focused,
            self.social_support,
            self.avoidant,
            self.meaning_making,
        ]
    }
}

/// Conversation style dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct ConversationStyle {
    #[validate(range(min = 0.0, max = 1.0))]
    pub direct_advice: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub reflective_listening: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub collaborative_problem_solving: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub validation_focused: f64,
}

impl ConversationStyle {
    pub const DIMENSIONS: usize = 4;

    pub fn as_array(&self) -> [f64; Self::DIMENSIONS] {
        [
            self.direct_advice,
            self.reflective_listening,
            self.collaborative_problem_solving,
            self.validation_focused,
        ]
    }
}

/// A weekly recurring availability interval
///
/// Minutes are counted from midnight of `day`; `end_minute` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_window_order"))]
pub struct AvailabilityWindow {
    pub day: Weekday,
    #[validate(range(max = 1440))]
    pub start_minute: u16,
    #[validate(range(max = 1440))]
    pub end_minute: u16,
}

impl AvailabilityWindow {
    pub fn new(day: Weekday, start_minute: u16, end_minute: u16) -> Self {
        Self { day, start_minute, end_minute }
    }

    /// Position of this window on the minute-of-week axis
    pub fn week_range(&self) -> (u32, u32) {
        let offset = self.day.num_days_from_monday() * MINUTES_PER_DAY as u32;
        (
            offset + self.start_minute as u32,
            offset + self.end_minute as u32,
        )
    }
}

fn validate_window_order(window: &AvailabilityWindow) -> Result<(), ValidationError> {
    if window.start_minute >= window.end_minute {
        return Err(ValidationError::new("window_start_after_end"));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergyLevel {
    #[serde(alias = "Depleted")]
    Depleted,
    #[serde(alias = "Low")]
    Low,
    #[serde(alias = "Moderate")]
    Moderate,
    #[serde(alias = "High")]
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistressLevel {
    #[serde(alias = "Low")]
    Low,
    #[serde(alias = "Moderate")]
    Moderate,
    #[serde(alias = "High")]
    High,
    #[serde(alias = "Severe")]
    Severe,
}

/// A theme the seeker is currently dealing with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ThemeIntensity {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(range(min = 0.0, max = 1.0))]
    pub intensity: f64,
}

impl ThemeIntensity {
    pub fn new(name: impl Into<String>, intensity: f64) -> Self {
        Self { name: name.into(), intensity }
    }
}

/// Profile of someone asking for support
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SeekerProfile {
    #[validate(length(min = 1))]
    pub id: String,
    #[serde(default)]
    pub embedding: Vec<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vent_text: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub themes: Vec<ThemeIntensity>,
    #[validate(nested)]
    pub coping_style_preference: CopingStyle,
    #[validate(nested)]
    pub conversation_preference: ConversationStyle,
    #[serde(default)]
    #[validate(nested)]
    pub availability_windows: Vec<AvailabilityWindow>,
    pub energy_level: EnergyLevel,
    pub distress_level: DistressLevel,
    #[validate(range(min = 0.0, max = 1.0))]
    pub urgency: f64,
}

/// Profile of someone offering support from lived experience
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct HelperProfile {
    #[validate(length(min = 1))]
    pub id: String,
    #[serde(default)]
    pub embedding: Vec<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience_narrative: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_unit_map"))]
    pub themes_experience: BTreeMap<String, f64>,
    #[validate(nested)]
    pub coping_style_expertise: CopingStyle,
    #[validate(nested)]
    pub conversation_style: ConversationStyle,
    #[serde(default)]
    #[validate(nested)]
    pub availability_windows: Vec<AvailabilityWindow>,
    pub energy_level: EnergyLevel,
    #[validate(range(min = 0.0, max = 1.0))]
    pub energy_consistency: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub reliability_score: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub response_rate: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub completion_rate: f64,
    #[serde(default)]
    #[validate(custom(function = "validate_unit_map"))]
    pub support_strengths: BTreeMap<String, f64>,
}

fn validate_unit_map(map: &BTreeMap<String, f64>) -> Result<(), ValidationError> {
    for (name, value) in map {
        if name.is_empty() {
            return Err(ValidationError::new("empty_key"));
        }
        if !(0.0..=1.0).contains(value) {
            let mut err = ValidationError::new("out_of_unit_range");
            err.add_param("key".into(), name);
            return Err(err);
        }
    }
    Ok(())
}

/// A profile tagged with its role
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Profile {
    Seeker(SeekerProfile),
    Helper(HelperProfile),
}

impl Profile {
    pub fn id(&self) -> &str {
        match self {
            Profile::Seeker(seeker) => &seeker.id,
            Profile::Helper(helper) => &helper.id,
        }
    }

    pub fn role(&self) -> &'static str {
        match self {
            Profile::Seeker(_) => "seeker",
            Profile::Helper(_) => "helper",
        }
    }
}

impl Validate for Profile {
    fn validate(&self) -> Result<(), ValidationErrors> {
        match self {
            Profile::Seeker(seeker) => seeker.validate(),
            Profile::Helper(helper) => helper.validate(),
        }
    }
}

/// Which scoring strategy combines the component scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    #[default]
    Heuristic,
    Learned,
}

/// Names of the scored components, in feature-vector order
pub const FEATURE_NAMES: [&str; 6] = [
    "emotional_similarity",
    "experience_overlap",
    "coping_style_match",
    "conversation_style_match",
    "availability_overlap",
    "reliability_score",
];

/// Unweighted component scores behind a final match score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub emotional_similarity: f64,
    pub experience_overlap: f64,
    pub coping_style_match: f64,
    pub conversation_style_match: f64,
    pub availability_overlap: f64,
    pub reliability_score: f64,
}

impl ScoreBreakdown {
    /// Flatten into the fixed order given by [`FEATURE_NAMES`]
    pub fn features(&self) -> [f64; 6] {
        [
            self.emotional_similarity,
            self.experience_overlap,
            self.coping_style_match,
            self.conversation_style_match,
            self.availability_overlap,
            self.reliability_score,
        ]
    }

    pub fn labeled(&self) -> impl Iterator<Item = (&'static str, f64)> {
        FEATURE_NAMES.into_iter().zip(self.features())
    }
}

/// Heuristic scoring weights; a convex combination over the components
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub emotional_similarity: f64,
    pub experience_overlap: f64,
    pub coping_style_match: f64,
    pub conversation_style_match: f64,
    pub availability_overlap: f64,
    pub reliability_score: f64,
}

impl ScoringWeights {
    pub fn as_array(&self) -> [f64; 6] {
        [
            self.emotional_similarity,
            self.experience_overlap,
            self.coping_style_match,
            self.conversation_style_match,
            self.availability_overlap,
            self.reliability_score,
        ]
    }

    pub fn sum(&self) -> f64 {
        self.as_array().iter().sum()
    }

    /// Check the weights form a convex combination
    pub fn check(&self) -> Result<(), String> {
        for (name, weight) in FEATURE_NAMES.iter().zip(self.as_array()) {
            if !weight.is_finite() || weight < 0.0 {
                return Err(format!("weight {} must be a non-negative number, got {}", name, weight));
            }
        }
        let sum = self.sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(format!("weights must sum to 1.0, got {}", sum));
        }
        Ok(())
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            emotional_similarity: 0.30,
            experience_overlap: 0.25,
            coping_style_match: 0.15,
            conversation_style_match: 0.10,
            availability_overlap: 0.10,
            reliability_score: 0.10,
        }
    }
}

/// One ranked candidate, borrowing the helper from the pool
#[derive(Debug, Clone)]
pub struct RankedMatch<'a> {
    pub score: f64,
    pub helper_id: &'a str,
    pub breakdown: ScoreBreakdown,
    pub helper: &'a HelperProfile,
}
