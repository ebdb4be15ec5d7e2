//! crates/study_assistant_core/src/features.rs
//!
//! The catalogue of AI transformations: the feature kinds, the typed result
//! each one produces, and the `Feature` trait tying a kind to its prompt and
//! its normalizer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::normalize::{self, NormalizeError};
use crate::prompts;

/// Upper bound shared by every "how many items" request parameter.
pub const MAX_REQUESTED_ITEMS: usize = 20;
pub const DEFAULT_MAX_POINTS: usize = 10;
pub const DEFAULT_NUMBER_OF_QUESTIONS: usize = 5;
pub const DEFAULT_NUMBER_OF_CARDS: usize = 10;
pub const MAX_QUESTION_CHARS: usize = 500;

//=========================================================================================
// Feature Kinds
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeatureType {
    Summarize,
    BulletPoints,
    Quiz,
    Insights,
    Flashcards,
    Glossary,
    RelatedTopics,
    Question,
}

impl FeatureType {
    pub const ALL: [FeatureType; 8] = [
        FeatureType::Summarize,
        FeatureType::BulletPoints,
        FeatureType::Quiz,
        FeatureType::Insights,
        FeatureType::Flashcards,
        FeatureType::Glossary,
        FeatureType::RelatedTopics,
        FeatureType::Question,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FeatureType::Summarize => "summarize",
            FeatureType::BulletPoints => "bullet-points",
            FeatureType::Quiz => "quiz",
            FeatureType::Insights => "insights",
            FeatureType::Flashcards => "flashcards",
            FeatureType::Glossary => "glossary",
            FeatureType::RelatedTopics => "related-topics",
            FeatureType::Question => "question",
        }
    }
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown feature type '{0}'")]
pub struct UnknownFeatureType(pub String);

impl FromStr for FeatureType {
    type Err = UnknownFeatureType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FeatureType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownFeatureType(s.to_string()))
    }
}

//=========================================================================================
// Typed Results
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResult {
    pub summary: String,
    pub word_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulletPointsResult {
    pub bullet_points: Vec<String>,
    /// Count before truncation to the requested maximum.
    pub total_points: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question: String,
    /// Always exactly four entries.
    pub options: Vec<String>,
    /// Index into `options`, in `0..=3`.
    pub correct_answer: u8,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub questions: Vec<QuizQuestion>,
    pub total_questions: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsResult {
    pub insights: Vec<String>,
    pub main_theme: String,
    pub target_audience: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    pub front: String,
    pub back: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardsResult {
    pub flashcards: Vec<Flashcard>,
    pub total_cards: usize,
}

/// Three-level rating used by glossary importance and answer confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    High,
    Medium,
    Low,
}

impl Level {
    /// Case-insensitive match against `high`, `medium` and `low`.
    pub fn parse_loose(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Level::High),
            "medium" => Some(Level::Medium),
            "low" => Some(Level::Low),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlossaryTerm {
    pub term: String,
    pub definition: String,
    pub importance: Level,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlossaryResult {
    pub terms: Vec<GlossaryTerm>,
    pub total_terms: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedTopic {
    pub topic: String,
    pub relevance: String,
    pub search_query: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedTopicsResult {
    pub topics: Vec<RelatedTopic>,
    pub prerequisites: Vec<String>,
    pub advanced_topics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResult {
    pub answer: String,
    pub confidence: Level,
    pub relevant_quotes: Vec<String>,
}

//=========================================================================================
// The Feature Trait
//=========================================================================================

/// One AI transformation: how to ask the model, and how to read its reply.
pub trait Feature: Send + Sync {
    type Output: Serialize + Send;

    const KIND: FeatureType;

    /// Builds the full instruction string for `content`.
    fn prompt(&self, content: &str) -> String;

    /// Turns the model's raw reply into a schema-valid result.
    fn normalize(&self, raw: &str) -> Result<Self::Output, NormalizeError>;

    /// The user's question, recorded alongside the activity when present.
    fn question(&self) -> Option<&str> {
        None
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Summarize;

#[derive(Debug, Clone, Copy)]
pub struct BulletPoints {
    pub max_points: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct Quiz {
    pub number_of_questions: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Insights;

#[derive(Debug, Clone, Copy)]
pub struct Flashcards {
    pub number_of_cards: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Glossary;

#[derive(Debug, Clone, Copy, Default)]
pub struct RelatedTopics;

#[derive(Debug, Clone)]
pub struct AskQuestion {
    pub question: String,
}

impl Default for BulletPoints {
    fn default() -> Self {
        Self { max_points: DEFAULT_MAX_POINTS }
    }
}

impl Default for Quiz {
    fn default() -> Self {
        Self { number_of_questions: DEFAULT_NUMBER_OF_QUESTIONS }
    }
}

impl Default for Flashcards {
    fn default() -> Self {
        Self { number_of_cards: DEFAULT_NUMBER_OF_CARDS }
    }
}

impl Feature for Summarize {
    type Output = SummaryResult;
    const KIND: FeatureType = FeatureType::Summarize;

    fn prompt(&self, content: &str) -> String {
        prompts::summarize(content)
    }

    fn normalize(&self, raw: &str) -> Result<SummaryResult, NormalizeError> {
        Ok(normalize::summary(raw))
    }
}

impl Feature for BulletPoints {
    type Output = BulletPointsResult;
    const KIND: FeatureType = FeatureType::BulletPoints;

    fn prompt(&self, content: &str) -> String {
        prompts::bullet_points(content, self.max_points)
    }

    fn normalize(&self, raw: &str) -> Result<BulletPointsResult, NormalizeError> {
        Ok(normalize::bullet_points(raw, self.max_points))
    }
}

impl Feature for Quiz {
    type Output = QuizResult;
    const KIND: FeatureType = FeatureType::Quiz;

    fn prompt(&self, content: &str) -> String {
        prompts::quiz(content, self.number_of_questions)
    }

    fn normalize(&self, raw: &str) -> Result<QuizResult, NormalizeError> {
        normalize::quiz(raw, self.number_of_questions)
    }
}

impl Feature for Insights {
    type Output = InsightsResult;
    const KIND: FeatureType = FeatureType::Insights;

    fn prompt(&self, content: &str) -> String {
        prompts::insights(content)
    }

    fn normalize(&self, raw: &str) -> Result<InsightsResult, NormalizeError> {
        normalize::insights(raw)
    }
}

impl Feature for Flashcards {
    type Output = FlashcardsResult;
    const KIND: FeatureType = FeatureType::Flashcards;

    fn prompt(&self, content: &str) -> String {
        prompts::flashcards(content, self.number_of_cards)
    }

    fn normalize(&self, raw: &str) -> Result<FlashcardsResult, NormalizeError> {
        normalize::flashcards(raw, self.number_of_cards)
    }
}

impl Feature for Glossary {
    type Output = GlossaryResult;
    const KIND: FeatureType = FeatureType::Glossary;

    fn prompt(&self, content: &str) -> String {
        prompts::glossary(content)
    }

    fn normalize(&self, raw: &str) -> Result<GlossaryResult, NormalizeError> {
        normalize::glossary(raw)
    }
}

impl Feature for RelatedTopics {
    type Output = RelatedTopicsResult;
    const KIND: FeatureType = FeatureType::RelatedTopics;

    fn prompt(&self, content: &str) -> String {
        prompts::related_topics(content)
    }

    fn normalize(&self, raw: &str) -> Result<RelatedTopicsResult, NormalizeError> {
        normalize::related_topics(raw)
    }
}

impl Feature for AskQuestion {
    type Output = AnswerResult;
    const KIND: FeatureType = FeatureType::Question;

    fn prompt(&self, content: &str) -> String {
        prompts::ask_question(content, &self.question)
    }

    fn normalize(&self, raw: &str) -> Result<AnswerResult, NormalizeError> {
        normalize::answer(raw)
    }

    fn question(&self) -> Option<&str> {
        Some(&self.question)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_type_names_round_trip_through_from_str() {
        for kind in FeatureType::ALL {
            assert_eq!(kind.as_str().parse::<FeatureType>().unwrap(), kind);
        }
        assert!("translate".parse::<FeatureType>().is_err());
    }

    #[test]
    fn feature_type_serializes_as_kebab_case() {
        let json = serde_json::to_string(&FeatureType::RelatedTopics).unwrap();
        assert_eq!(json, "\"related-topics\"");
    }

    #[test]
    fn level_parsing_ignores_case_and_padding() {
        assert_eq!(Level::parse_loose(" High "), Some(Level::High));
        assert_eq!(Level::parse_loose("MEDIUM"), Some(Level::Medium));
        assert_eq!(Level::parse_loose("critical"), None);
    }

    #[test]
    fn ask_question_records_the_question() {
        let feature = AskQuestion { question: "Why?".to_string() };
        assert_eq!(feature.question(), Some("Why?"));
        assert_eq!(Quiz::default().question(), None);
    }
}
