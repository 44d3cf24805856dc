//! Rule-based recommendations
//!
//! A table keyed by dominant emotion selects a base list of 0-3 items. Two
//! overrides are then composed in front of it and the result is truncated:
//!
//! ```text
//! final = take(limit, [wellness_item?, stability_item?, ...base])
//! ```
//!
//! When both overrides fire, base items beyond the limit are dropped.

use crate::config::AnalyticsConfig;
use crate::types::{Emotion, MoodPrediction, Recommendation, RecommendationKind, EMOTION_COUNT};

/// Happy content is only produced above this confidence
pub const HAPPY_CONFIDENCE_GATE: f64 = 0.7;

/// Sad content is only produced above this confidence
pub const SAD_CONFIDENCE_GATE: f64 = 0.6;

/// Produces the base list for a dominant emotion at a given confidence
pub type BaseRule = fn(confidence: f64) -> Vec<Recommendation>;

/// Base rules indexed by canonical emotion
#[derive(Clone, Copy)]
pub struct RuleTable {
    rules: [BaseRule; EMOTION_COUNT],
}

/// Default rule table; disgusted shares the general rule with neutral
pub const DEFAULT_RULES: RuleTable = RuleTable {
    rules: [
        happy_rule,
        sad_rule,
        angry_rule,
        fearful_rule,
        general_rule,
        surprised_rule,
        general_rule,
    ],
};

impl Default for RuleTable {
    fn default() -> Self {
        DEFAULT_RULES
    }
}

impl RuleTable {
    /// Replace the rule for one emotion
    pub fn with_rule(mut self, emotion: Emotion, rule: BaseRule) -> Self {
        self.rules[emotion as usize] = rule;
        self
    }

    pub fn base_for(&self, emotion: Emotion, confidence: f64) -> Vec<Recommendation> {
        (self.rules[emotion as usize])(confidence)
    }
}

fn happy_rule(confidence: f64) -> Vec<Recommendation> {
    if confidence <= HAPPY_CONFIDENCE_GATE {
        return Vec::new();
    }
    vec![
        Recommendation::new(
            RecommendationKind::Maintain,
            "Keep the Positive Energy",
            "Share your joy with others through meaningful connections",
            "Call someone you care about",
            "10-15 min",
            "📞",
        ),
        Recommendation::new(
            RecommendationKind::Creative,
            "Channel Your Energy",
            "Use this positive state for productive activities",
            "Work on a personal project or hobby",
            "30+ min",
            "🎨",
        ),
    ]
}

fn sad_rule(confidence: f64) -> Vec<Recommendation> {
    if confidence <= SAD_CONFIDENCE_GATE {
        return Vec::new();
    }
    vec![
        Recommendation::new(
            RecommendationKind::Support,
            "Gentle Self-Care",
            "Be kind to yourself during this time",
            "Take a warm shower or practice deep breathing",
            "15-20 min",
            "🛁",
        ),
        Recommendation::new(
            RecommendationKind::Connection,
            "Reach Out",
            "Human connection can provide comfort",
            "Text a trusted friend or family member",
            "5-10 min",
            "💬",
        ),
        Recommendation::new(
            RecommendationKind::Mindfulness,
            "Mindful Moment",
            "Ground yourself in the present",
            "Try a 5-minute guided meditation",
            "5 min",
            "🧘",
        ),
    ]
}

fn angry_rule(_confidence: f64) -> Vec<Recommendation> {
    vec![
        Recommendation::new(
            RecommendationKind::Release,
            "Physical Release",
            "Channel anger into movement",
            "Take a brisk walk or do some stretches",
            "10-20 min",
            "🚶",
        ),
        Recommendation::new(
            RecommendationKind::Cooling,
            "Cool Down Period",
            "Give yourself time to process",
            "Step away and take 10 deep breaths",
            "2-5 min",
            "❄️",
        ),
        Recommendation::new(
            RecommendationKind::Expression,
            "Express Safely",
            "Write down your thoughts",
            "Journal about what triggered the anger",
            "10-15 min",
            "📝",
        ),
    ]
}

fn surprised_rule(_confidence: f64) -> Vec<Recommendation> {
    vec![
        Recommendation::new(
            RecommendationKind::Process,
            "Process the Moment",
            "Take time to understand what happened",
            "Reflect on the situation calmly",
            "5-10 min",
            "🤔",
        ),
        Recommendation::new(
            RecommendationKind::Adaptation,
            "Adapt and Learn",
            "Use surprise as a learning opportunity",
            "Consider what this teaches you",
            "10 min",
            "💡",
        ),
    ]
}

fn fearful_rule(_confidence: f64) -> Vec<Recommendation> {
    vec![
        Recommendation::new(
            RecommendationKind::Grounding,
            "Grounding Exercise",
            "Focus on your immediate environment",
            "Name 5 things you can see, 4 you can touch, 3 you can hear",
            "3-5 min",
            "🌱",
        ),
        Recommendation::new(
            RecommendationKind::Safety,
            "Create Safety",
            "Move to a comfortable, safe space",
            "Go somewhere you feel secure",
            "5 min",
            "🏠",
        ),
        Recommendation::new(
            RecommendationKind::Breathing,
            "Calm Breathing",
            "Regulate your nervous system",
            "Practice 4-7-8 breathing technique",
            "5-10 min",
            "🫁",
        ),
    ]
}

fn general_rule(_confidence: f64) -> Vec<Recommendation> {
    vec![
        Recommendation::new(
            RecommendationKind::Awareness,
            "Emotional Check-In",
            "Tune into how you're really feeling",
            "Spend a moment identifying your emotions",
            "3-5 min",
            "🎯",
        ),
        Recommendation::new(
            RecommendationKind::Engagement,
            "Gentle Activity",
            "Engage in something mildly pleasant",
            "Listen to music or look at nature",
            "10-15 min",
            "🎵",
        ),
    ]
}

fn stability_override() -> Recommendation {
    Recommendation::new(
        RecommendationKind::Stability,
        "Build Routine",
        "Emotions seem fluctuating - establish grounding",
        "Create a simple 5-minute daily routine",
        "5 min",
        "⚖️",
    )
}

fn wellness_override() -> Recommendation {
    Recommendation::new(
        RecommendationKind::Wellness,
        "Basic Self-Care",
        "Focus on fundamental needs first",
        "Ensure you're hydrated and have eaten",
        "5 min",
        "💚",
    )
}

/// Composes base rules with wellness and stability overrides
pub struct RecommendationEngine {
    config: AnalyticsConfig,
    rules: RuleTable,
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new(AnalyticsConfig::default())
    }
}

impl RecommendationEngine {
    pub fn new(config: AnalyticsConfig) -> Self {
        Self {
            config,
            rules: RuleTable::default(),
        }
    }

    /// Use a custom rule table
    pub fn with_rules(config: AnalyticsConfig, rules: RuleTable) -> Self {
        Self { config, rules }
    }

    /// Ordered recommendations; the first item has the highest priority
    pub fn recommend(
        &self,
        dominant: Emotion,
        confidence: f64,
        wellness: f64,
        stability: f64,
    ) -> Vec<Recommendation> {
        let base = self.rules.base_for(dominant, confidence);
        let wellness_item =
            (wellness < self.config.low_wellness_threshold).then(wellness_override);
        let stability_item =
            (stability < self.config.low_stability_threshold).then(stability_override);

        tracing::debug!(
            dominant = %dominant,
            confidence,
            base = base.len(),
            wellness_override = wellness_item.is_some(),
            stability_override = stability_item.is_some(),
            "selected recommendations"
        );

        wellness_item
            .into_iter()
            .chain(stability_item)
            .chain(base)
            .take(self.config.recommendation_limit)
            .collect()
    }

    /// Single onboarding item for a user with no history
    pub fn getting_started() -> Vec<Recommendation> {
        vec![Recommendation::new(
            RecommendationKind::Start,
            "Begin Your Journey",
            "Start using the emotion detector to build insights",
            "Use the Live Detection feature",
            "2-3 min",
            "🚀",
        )]
    }

    /// Human-readable observations about a prediction
    pub fn insights(&self, prediction: &MoodPrediction) -> Vec<String> {
        let mut insights = Vec::new();

        if prediction.confidence > 0.7 {
            insights.push(format!(
                "Your emotions are clearly trending toward {} feelings",
                prediction.dominant_emotion
            ));
        } else if prediction.confidence > 0.4 {
            insights.push(format!(
                "You're experiencing moderate {} emotions",
                prediction.dominant_emotion
            ));
        } else {
            insights.push("Your emotions are quite mixed - this is normal!".to_string());
        }

        if prediction.stability_score > 0.7 {
            insights.push("Your emotional state is quite stable".to_string());
        } else if prediction.stability_score < self.config.low_stability_threshold {
            insights.push(
                "Your emotions have been fluctuating - consider what might be causing changes"
                    .to_string(),
            );
        }

        if prediction.wellness_score > 0.7 {
            insights.push("Your overall emotional wellness looks positive".to_string());
        } else if prediction.wellness_score < self.config.low_wellness_threshold {
            insights.push("Consider focusing on self-care and support".to_string());
        }

        insights
    }

    /// Insight shown when there is no history yet
    pub fn getting_started_insight() -> String {
        "Not enough data yet - start by using the emotion detector!".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Trend;
    use pretty_assertions::assert_eq;

    fn kinds(list: &[Recommendation]) -> Vec<RecommendationKind> {
        list.iter().map(|r| r.kind).collect()
    }

    #[test]
    fn test_both_overrides_truncate_base() {
        let engine = RecommendationEngine::default();
        let list = engine.recommend(Emotion::Sad, 0.8, 0.2, 0.2);

        assert_eq!(
            kinds(&list),
            vec![
                RecommendationKind::Wellness,
                RecommendationKind::Stability,
                RecommendationKind::Support,
                RecommendationKind::Connection,
            ]
        );
    }

    #[test]
    fn test_single_override_goes_first() {
        let engine = RecommendationEngine::default();
        let list = engine.recommend(Emotion::Angry, 0.5, 0.9, 0.3);

        assert_eq!(
            kinds(&list),
            vec![
                RecommendationKind::Stability,
                RecommendationKind::Release,
                RecommendationKind::Cooling,
                RecommendationKind::Expression,
            ]
        );
    }

    #[test]
    fn test_no_overrides() {
        let engine = RecommendationEngine::default();
        let list = engine.recommend(Emotion::Fearful, 0.5, 0.6, 0.8);
        assert_eq!(
            kinds(&list),
            vec![
                RecommendationKind::Grounding,
                RecommendationKind::Safety,
                RecommendationKind::Breathing,
            ]
        );
    }

    #[test]
    fn test_happy_below_gate_yields_no_base_items() {
        let engine = RecommendationEngine::default();
        assert!(engine.recommend(Emotion::Happy, 0.7, 0.9, 0.9).is_empty());

        let list = engine.recommend(Emotion::Happy, 0.71, 0.9, 0.9);
        assert_eq!(
            kinds(&list),
            vec![RecommendationKind::Maintain, RecommendationKind::Creative]
        );

        // overrides still apply below the gate
        let list = engine.recommend(Emotion::Happy, 0.5, 0.1, 0.9);
        assert_eq!(kinds(&list), vec![RecommendationKind::Wellness]);
    }

    #[test]
    fn test_sad_gate() {
        let engine = RecommendationEngine::default();
        assert!(engine.recommend(Emotion::Sad, 0.6, 0.5, 0.9).is_empty());
        assert_eq!(engine.recommend(Emotion::Sad, 0.61, 0.5, 0.9).len(), 3);
    }

    #[test]
    fn test_neutral_and_disgusted_share_rule() {
        let engine = RecommendationEngine::default();
        let neutral = engine.recommend(Emotion::Neutral, 0.5, 0.5, 0.9);
        let disgusted = engine.recommend(Emotion::Disgusted, 0.5, 0.5, 0.9);
        assert_eq!(neutral, disgusted);
        assert_eq!(
            kinds(&neutral),
            vec![RecommendationKind::Awareness, RecommendationKind::Engagement]
        );
    }

    #[test]
    fn test_custom_rule_table() {
        fn quiet(_: f64) -> Vec<Recommendation> {
            Vec::new()
        }
        let rules = RuleTable::default().with_rule(Emotion::Angry, quiet);
        let engine = RecommendationEngine::with_rules(AnalyticsConfig::default(), rules);
        assert!(engine.recommend(Emotion::Angry, 0.9, 0.9, 0.9).is_empty());
    }

    #[test]
    fn test_insights() {
        let engine = RecommendationEngine::default();
        let prediction = MoodPrediction {
            dominant_emotion: Emotion::Happy,
            confidence: 0.8,
            trend: Trend::Stable,
            wellness_score: 0.9,
            stability_score: 0.3,
            data_points: 6,
        };
        assert_eq!(
            engine.insights(&prediction),
            vec![
                "Your emotions are clearly trending toward happy feelings".to_string(),
                "Your emotions have been fluctuating - consider what might be causing changes"
                    .to_string(),
                "Your overall emotional wellness looks positive".to_string(),
            ]
        );
    }
}
