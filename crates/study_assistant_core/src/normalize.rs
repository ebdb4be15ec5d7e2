//! crates/study_assistant_core/src/normalize.rs
//!
//! The Response Normalizer. Model replies are free-form text that usually,
//! but not always, contain a JSON payload. Each feature's reply is reduced
//! to a validated, typed result here, or rejected with a `NormalizeError`.
//!
//! Extraction looks for the first `{` (object features) or `[` (array
//! features) and scans forward to its matching closer, skipping brackets
//! inside JSON strings. When that span does not parse, the scan restarts at
//! the next opener. Bullet points also pass over arrays that hold no usable
//! strings, such as citation markers. Individual list entries that fail validation are
//! dropped; a list that had entries but keeps none of them is an error,
//! while an empty list is a valid result.

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::sync::LazyLock;

use crate::features::{
    AnswerResult, BulletPointsResult, Flashcard, FlashcardsResult, FeatureType, GlossaryResult,
    GlossaryTerm, InsightsResult, Level, QuizQuestion, QuizResult, RelatedTopic,
    RelatedTopicsResult, SummaryResult,
};

const MIN_INSIGHTS: usize = 5;
const MAX_INSIGHTS: usize = 7;
const QUIZ_OPTION_COUNT: usize = 4;
const DEFAULT_FLASHCARD_CATEGORY: &str = "General";

static BULLET_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-•*]\s*").expect("bullet marker pattern is valid"));

//=========================================================================================
// Errors
//=========================================================================================

#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("no JSON {expected} found in the {feature} response")]
    NoPayload {
        feature: FeatureType,
        expected: PayloadShape,
    },
    #[error("the {feature} response is not valid JSON: {source}")]
    InvalidJson {
        feature: FeatureType,
        #[source]
        source: serde_json::Error,
    },
    #[error("the {feature} response is missing `{field}` or it has the wrong type")]
    MissingField {
        feature: FeatureType,
        field: &'static str,
    },
    #[error("the {feature} response has no valid entries in `{field}`")]
    NoValidEntries {
        feature: FeatureType,
        field: &'static str,
    },
    #[error("the {feature} response has {found} valid `{field}`, at least {min} are required")]
    TooFewEntries {
        feature: FeatureType,
        field: &'static str,
        found: usize,
        min: usize,
    },
    #[error("the {feature} response has an invalid `{field}`")]
    InvalidField {
        feature: FeatureType,
        field: &'static str,
    },
}

impl NormalizeError {
    pub fn feature(&self) -> FeatureType {
        match self {
            NormalizeError::NoPayload { feature, .. }
            | NormalizeError::InvalidJson { feature, .. }
            | NormalizeError::MissingField { feature, .. }
            | NormalizeError::NoValidEntries { feature, .. }
            | NormalizeError::TooFewEntries { feature, .. }
            | NormalizeError::InvalidField { feature, .. } => *feature,
        }
    }
}

//=========================================================================================
// Extraction
//=========================================================================================

/// The JSON shape a feature expects to find in the model reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    Object,
    Array,
}

impl PayloadShape {
    fn delimiters(self) -> (char, char) {
        match self {
            PayloadShape::Object => ('{', '}'),
            PayloadShape::Array => ('[', ']'),
        }
    }
}

impl fmt::Display for PayloadShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadShape::Object => f.write_str("object"),
            PayloadShape::Array => f.write_str("array"),
        }
    }
}

/// The span from the first `open` to its matching `close`, ignoring
/// delimiters that appear inside JSON string literals.
fn balanced_span(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        if ch == '"' {
            in_string = true;
        } else if ch == open {
            depth += 1;
        } else if ch == close {
            depth -= 1;
            if depth == 0 {
                let end = start + offset + ch.len_utf8();
                return Some(&text[start..end]);
            }
        }
    }
    None
}

/// Every balanced span of the given shape, in order of its opener, with
/// its parse outcome.
fn payload_candidates(
    raw: &str,
    shape: PayloadShape,
) -> impl Iterator<Item = Result<Value, serde_json::Error>> + '_ {
    let (open, close) = shape.delimiters();
    raw.match_indices(open)
        .filter_map(move |(start, _)| balanced_span(&raw[start..], open, close))
        .map(serde_json::from_str::<Value>)
}

/// Pulls the first parseable JSON value of the given shape out of free-form text.
pub fn extract_payload(
    feature: FeatureType,
    raw: &str,
    shape: PayloadShape,
) -> Result<Value, NormalizeError> {
    let mut first_error = None;

    for candidate in payload_candidates(raw, shape) {
        match candidate {
            Ok(value) => return Ok(value),
            Err(source) => {
                first_error.get_or_insert(source);
            }
        }
    }

    Err(match first_error {
        Some(source) => NormalizeError::InvalidJson { feature, source },
        None => NormalizeError::NoPayload {
            feature,
            expected: shape,
        },
    })
}

/// Line-based recovery for list replies that carry no JSON array.
pub fn split_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(|line| BULLET_MARKER.replace(line.trim(), "").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

//=========================================================================================
// Shared Helpers
//=========================================================================================

/// A list cut down to a requested maximum, remembering how long it was.
#[derive(Debug, Clone, PartialEq)]
pub struct Capped<T> {
    pub items: Vec<T>,
    pub total: usize,
}

pub fn cap_list<T>(mut items: Vec<T>, max: usize) -> Capped<T> {
    let total = items.len();
    items.truncate(max);
    Capped { items, total }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn take_array(
    feature: FeatureType,
    payload: &mut Value,
    field: &'static str,
) -> Result<Vec<Value>, NormalizeError> {
    match payload.get_mut(field).map(Value::take) {
        Some(Value::Array(items)) => Ok(items),
        _ => Err(NormalizeError::MissingField { feature, field }),
    }
}

fn take_string(
    feature: FeatureType,
    payload: &mut Value,
    field: &'static str,
) -> Result<String, NormalizeError> {
    match payload.get_mut(field).map(Value::take) {
        Some(Value::String(text)) => Ok(text.trim().to_string()),
        _ => Err(NormalizeError::MissingField { feature, field }),
    }
}

/// String entries of an optional list field; absent means empty.
fn take_optional_strings(payload: &mut Value, field: &str) -> Vec<String> {
    match payload.get_mut(field).map(Value::take) {
        Some(Value::Array(items)) => strings_from(items),
        _ => Vec::new(),
    }
}

fn strings_from(items: Vec<Value>) -> Vec<String> {
    items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(text) => non_blank(text),
            _ => None,
        })
        .collect()
}

/// Deserializes and validates each entry, dropping the ones that fail.
fn collect_entries<R, T>(
    feature: FeatureType,
    field: &'static str,
    entries: Vec<Value>,
    validate: impl Fn(R) -> Option<T>,
) -> Result<Vec<T>, NormalizeError>
where
    R: DeserializeOwned,
{
    let offered = entries.len();
    let valid: Vec<T> = entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value::<R>(entry).ok())
        .filter_map(validate)
        .collect();

    if offered > 0 && valid.is_empty() {
        return Err(NormalizeError::NoValidEntries { feature, field });
    }
    Ok(valid)
}

//=========================================================================================
// Per-Feature Normalizers
//=========================================================================================

pub fn summary(raw: &str) -> SummaryResult {
    let summary = raw.trim().to_string();
    let word_count = summary.split_whitespace().count();
    SummaryResult { summary, word_count }
}

pub fn bullet_points(raw: &str, max_points: usize) -> BulletPointsResult {
    // An array that has entries but no usable strings (`[1]`, `[{..}]`) is
    // not the payload; keep looking, then fall back to lines.
    let points = payload_candidates(raw, PayloadShape::Array)
        .filter_map(Result::ok)
        .find_map(|value| match value {
            Value::Array(items) if items.is_empty() => Some(Vec::new()),
            Value::Array(items) => Some(strings_from(items)).filter(|points| !points.is_empty()),
            _ => None,
        })
        .unwrap_or_else(|| split_lines(raw));
    let capped = cap_list(points, max_points);
    BulletPointsResult {
        bullet_points: capped.items,
        total_points: capped.total,
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuizQuestion {
    question: Option<String>,
    options: Option<Vec<String>>,
    correct_answer: Option<f64>,
    explanation: Option<String>,
}

impl RawQuizQuestion {
    fn validate(self) -> Option<QuizQuestion> {
        let question = non_blank(self.question?)?;
        let options = self.options?;
        if options.len() != QUIZ_OPTION_COUNT {
            return None;
        }
        let answer = self.correct_answer?;
        if answer.fract() != 0.0 || !(0.0..=3.0).contains(&answer) {
            return None;
        }
        Some(QuizQuestion {
            question,
            options,
            correct_answer: answer as u8,
            explanation: self.explanation.unwrap_or_default().trim().to_string(),
        })
    }
}

pub fn quiz(raw: &str, number_of_questions: usize) -> Result<QuizResult, NormalizeError> {
    let feature = FeatureType::Quiz;
    let mut payload = extract_payload(feature, raw, PayloadShape::Object)?;
    let entries = take_array(feature, &mut payload, "questions")?;
    let valid = collect_entries(feature, "questions", entries, RawQuizQuestion::validate)?;

    let capped = cap_list(valid, number_of_questions);
    Ok(QuizResult {
        questions: capped.items,
        total_questions: capped.total,
    })
}

pub fn insights(raw: &str) -> Result<InsightsResult, NormalizeError> {
    let feature = FeatureType::Insights;
    let mut payload = extract_payload(feature, raw, PayloadShape::Object)?;

    let mut insights = strings_from(take_array(feature, &mut payload, "insights")?);
    if insights.len() < MIN_INSIGHTS {
        return Err(NormalizeError::TooFewEntries {
            feature,
            field: "insights",
            found: insights.len(),
            min: MIN_INSIGHTS,
        });
    }
    insights.truncate(MAX_INSIGHTS);

    Ok(InsightsResult {
        insights,
        main_theme: take_string(feature, &mut payload, "mainTheme")?,
        target_audience: take_string(feature, &mut payload, "targetAudience")?,
    })
}

#[derive(Deserialize)]
struct RawFlashcard {
    front: Option<String>,
    back: Option<String>,
    category: Option<String>,
}

impl RawFlashcard {
    fn validate(self) -> Option<Flashcard> {
        Some(Flashcard {
            front: non_blank(self.front?)?,
            back: non_blank(self.back?)?,
            category: self
                .category
                .and_then(non_blank)
                .unwrap_or_else(|| DEFAULT_FLASHCARD_CATEGORY.to_string()),
        })
    }
}

pub fn flashcards(raw: &str, number_of_cards: usize) -> Result<FlashcardsResult, NormalizeError> {
    let feature = FeatureType::Flashcards;
    let mut payload = extract_payload(feature, raw, PayloadShape::Object)?;
    let entries = take_array(feature, &mut payload, "flashcards")?;
    let valid = collect_entries(feature, "flashcards", entries, RawFlashcard::validate)?;

    let capped = cap_list(valid, number_of_cards);
    Ok(FlashcardsResult {
        flashcards: capped.items,
        total_cards: capped.total,
    })
}

#[derive(Deserialize)]
struct RawGlossaryTerm {
    term: Option<String>,
    definition: Option<String>,
    importance: Option<String>,
}

impl RawGlossaryTerm {
    fn validate(self) -> Option<GlossaryTerm> {
        Some(GlossaryTerm {
            term: non_blank(self.term?)?,
            definition: non_blank(self.definition?)?,
            importance: Level::parse_loose(&self.importance?)?,
        })
    }
}

pub fn glossary(raw: &str) -> Result<GlossaryResult, NormalizeError> {
    let feature = FeatureType::Glossary;
    let mut payload = extract_payload(feature, raw, PayloadShape::Object)?;
    let entries = take_array(feature, &mut payload, "terms")?;
    let terms = collect_entries(feature, "terms", entries, RawGlossaryTerm::validate)?;

    Ok(GlossaryResult {
        total_terms: terms.len(),
        terms,
    })
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRelatedTopic {
    topic: Option<String>,
    relevance: Option<String>,
    search_query: Option<String>,
}

impl RawRelatedTopic {
    fn validate(self) -> Option<RelatedTopic> {
        let topic = non_blank(self.topic?)?;
        let relevance = non_blank(self.relevance?)?;
        let search_query = self
            .search_query
            .and_then(non_blank)
            .unwrap_or_else(|| topic.clone());
        Some(RelatedTopic {
            topic,
            relevance,
            search_query,
        })
    }
}

pub fn related_topics(raw: &str) -> Result<RelatedTopicsResult, NormalizeError> {
    let feature = FeatureType::RelatedTopics;
    let mut payload = extract_payload(feature, raw, PayloadShape::Object)?;
    let entries = take_array(feature, &mut payload, "topics")?;
    let topics = collect_entries(feature, "topics", entries, RawRelatedTopic::validate)?;

    Ok(RelatedTopicsResult {
        topics,
        prerequisites: take_optional_strings(&mut payload, "prerequisites"),
        advanced_topics: take_optional_strings(&mut payload, "advancedTopics"),
    })
}

pub fn answer(raw: &str) -> Result<AnswerResult, NormalizeError> {
    let feature = FeatureType::Question;
    let mut payload = extract_payload(feature, raw, PayloadShape::Object)?;

    let answer = take_string(feature, &mut payload, "answer")?;
    let confidence = take_string(feature, &mut payload, "confidence")?;
    let confidence = Level::parse_loose(&confidence).ok_or(NormalizeError::InvalidField {
        feature,
        field: "confidence",
    })?;

    Ok(AnswerResult {
        answer,
        confidence,
        relevant_quotes: take_optional_strings(&mut payload, "relevantQuotes"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn quiz_question(options: usize, correct_answer: Value) -> Value {
        let options: Vec<String> = (0..options).map(|i| format!("Option {i}")).collect();
        json!({
            "question": "What is tested?",
            "options": options,
            "correctAnswer": correct_answer,
            "explanation": "Because."
        })
    }

    #[test]
    fn balanced_scan_ignores_brackets_inside_strings() {
        let text = r#"Here: {"a": "has } brace", "b": {"c": 1}} and {"later": true}"#;
        let span = balanced_span(text, '{', '}').unwrap();
        assert_eq!(span, r#"{"a": "has } brace", "b": {"c": 1}}"#);
    }

    #[test]
    fn extraction_skips_trailing_json_like_text() {
        // A greedy match would swallow both objects and fail to parse.
        let text = r#"{"answer": "yes", "confidence": "high"} Note: {see above}"#;
        let value = extract_payload(FeatureType::Question, text, PayloadShape::Object).unwrap();
        assert_eq!(value["answer"], "yes");
    }

    #[test]
    fn extraction_moves_past_openers_that_do_not_parse() {
        let text = r#"Use {braces} like this: {"answer": "ok", "confidence": "high"}"#;
        let value = extract_payload(FeatureType::Question, text, PayloadShape::Object).unwrap();
        assert_eq!(value["answer"], "ok");

        let text = r#"{"answer": "a \"quoted\" }", "confidence": "low"}"#;
        let value = extract_payload(FeatureType::Question, text, PayloadShape::Object).unwrap();
        assert_eq!(value["confidence"], "low");
    }

    #[test]
    fn extraction_reports_missing_and_malformed_payloads_distinctly() {
        let missing = extract_payload(FeatureType::Quiz, "no json here", PayloadShape::Object);
        assert!(matches!(missing, Err(NormalizeError::NoPayload { .. })));

        let malformed = extract_payload(FeatureType::Quiz, "{questions: [}", PayloadShape::Object);
        assert!(matches!(malformed, Err(NormalizeError::InvalidJson { .. })));
    }

    #[test]
    fn bullet_points_are_pulled_out_of_surrounding_prose() {
        let raw = "Intro text before the list [\"A\",\"B\",\"C\"] and some trailing words";
        let result = bullet_points(raw, 10);
        assert_eq!(result.bullet_points, vec!["A", "B", "C"]);
        assert_eq!(result.total_points, 3);
    }

    #[test]
    fn bullet_points_fall_back_to_lines_without_brackets() {
        let raw = "- First point\n* Second point\n\nThird point";
        let result = bullet_points(raw, 10);
        assert_eq!(
            result.bullet_points,
            vec!["First point", "Second point", "Third point"]
        );
    }

    #[test]
    fn bullet_points_fall_back_to_lines_when_the_array_is_malformed() {
        let raw = "• Alpha [unfinished\n  - Beta";
        let result = bullet_points(raw, 10);
        assert_eq!(result.bullet_points, vec!["Alpha [unfinished", "Beta"]);
    }

    #[test]
    fn citation_markers_do_not_count_as_the_bullet_array() {
        let raw = "- Mitochondria make ATP [1]\n- Ribosomes build proteins [2]";
        let result = bullet_points(raw, 10);
        assert_eq!(
            result.bullet_points,
            vec!["Mitochondria make ATP [1]", "Ribosomes build proteins [2]"]
        );
        assert_eq!(result.total_points, 2);
    }

    #[test]
    fn arrays_without_strings_are_skipped_for_a_later_string_array() {
        let raw = r#"See [1] and [2]. Points: ["Alpha", "Beta"]"#;
        let result = bullet_points(raw, 10);
        assert_eq!(result.bullet_points, vec!["Alpha", "Beta"]);
    }

    #[test]
    fn object_arrays_fall_back_to_lines_instead_of_an_empty_list() {
        let raw = r#"[{"point": "A"}, {"point": "B"}]"#;
        let result = bullet_points(raw, 10);
        assert!(!result.bullet_points.is_empty());
        assert_eq!(result.total_points, result.bullet_points.len());
    }

    #[test]
    fn an_empty_array_is_an_empty_list() {
        let result = bullet_points("[]", 10);
        assert!(result.bullet_points.is_empty());
        assert_eq!(result.total_points, 0);
    }

    #[test]
    fn bullet_points_report_the_count_before_truncation() {
        let raw = r#"["one", "two", "three", "four"]"#;
        let result = bullet_points(raw, 2);
        assert_eq!(result.bullet_points, vec!["one", "two"]);
        assert_eq!(result.total_points, 4);
    }

    #[test]
    fn quiz_keeps_only_well_formed_questions() {
        let payload = json!({
            "questions": [
                quiz_question(4, json!(2)),
                quiz_question(3, json!(0)),
                quiz_question(4, json!(4)),
                quiz_question(4, json!(-1)),
                quiz_question(4, json!(1.5)),
                quiz_question(4, json!(0)),
            ]
        });
        let raw = format!("Sure, here is your quiz:\n```json\n{payload}\n```");

        let result = quiz(&raw, 10).unwrap();
        assert_eq!(result.total_questions, 2);
        assert_eq!(result.questions.len(), 2);
        assert_eq!(result.questions[0].correct_answer, 2);
        assert_eq!(result.questions[1].correct_answer, 0);
        assert!(result.questions.iter().all(|q| q.options.len() == 4));
    }

    #[test]
    fn quiz_total_counts_valid_questions_before_truncation() {
        let questions: Vec<Value> = (0..6).map(|_| quiz_question(4, json!(1))).collect();
        let payload = json!({ "questions": questions });
        let result = quiz(&payload.to_string(), 3).unwrap();
        assert_eq!(result.questions.len(), 3);
        assert_eq!(result.total_questions, 6);
    }

    #[test]
    fn quiz_without_any_valid_question_is_an_error() {
        let raw = r#"{"questions": [{"question": "Q?", "options": ["a","b","c","d"], "explanation": "x"}]}"#;
        let err = quiz(raw, 5).unwrap_err();
        assert!(matches!(err, NormalizeError::NoValidEntries { field: "questions", .. }));
    }

    #[test]
    fn quiz_with_unparseable_json_is_an_error() {
        let raw = r#"{"questions": [{"question": "Q?", "correctAnswer": }]}"#;
        assert!(matches!(quiz(raw, 5), Err(NormalizeError::InvalidJson { .. })));
        assert!(matches!(
            quiz(r#"{"items": []}"#, 5),
            Err(NormalizeError::MissingField { field: "questions", .. })
        ));
    }

    #[test]
    fn quiz_with_an_empty_list_is_valid_but_empty() {
        let result = quiz(r#"{"questions": []}"#, 5).unwrap();
        assert!(result.questions.is_empty());
        assert_eq!(result.total_questions, 0);
    }

    #[test]
    fn summary_counts_whitespace_delimited_words() {
        let result = summary("  A short\nsummary\tof things.  ");
        assert_eq!(result.summary, "A short\nsummary\tof things.");
        assert_eq!(result.word_count, 5);
        assert_eq!(summary("   ").word_count, 0);
    }

    #[test]
    fn insights_require_five_and_keep_at_most_seven() {
        let nine: Vec<String> = (1..=9).map(|i| format!("Insight {i}")).collect();
        let many = json!({
            "insights": nine,
            "mainTheme": "Theme",
            "targetAudience": "Students"
        });
        let result = insights(&many.to_string()).unwrap();
        assert_eq!(result.insights.len(), 7);
        assert_eq!(result.main_theme, "Theme");

        let few = json!({
            "insights": ["one", "two", "", 3],
            "mainTheme": "Theme",
            "targetAudience": "Students"
        });
        assert!(matches!(
            insights(&few.to_string()),
            Err(NormalizeError::TooFewEntries { found: 2, .. })
        ));
    }

    #[test]
    fn insights_without_a_theme_are_rejected() {
        let raw = json!({
            "insights": ["a", "b", "c", "d", "e"],
            "targetAudience": "Students"
        });
        assert!(matches!(
            insights(&raw.to_string()),
            Err(NormalizeError::MissingField { field: "mainTheme", .. })
        ));
    }

    #[test]
    fn flashcards_drop_incomplete_cards_and_default_the_category() {
        let raw = json!({
            "flashcards": [
                {"front": "Term", "back": "Definition", "category": "Definition"},
                {"front": "No back"},
                {"front": "Q", "back": "A"},
                {"front": "Q2", "back": "A2", "category": "Fact"}
            ]
        });
        let result = flashcards(&raw.to_string(), 2).unwrap();
        assert_eq!(result.total_cards, 3);
        assert_eq!(result.flashcards.len(), 2);
        assert_eq!(result.flashcards[1].category, "General");
    }

    #[test]
    fn glossary_matches_importance_case_insensitively() {
        let raw = r#"Glossary:
        {"terms": [
            {"term": "Latency", "definition": "Delay", "importance": "High"},
            {"term": "Jitter", "definition": "Variance", "importance": "urgent"},
            {"term": "Throughput", "definition": "Rate", "importance": "low"}
        ]}"#;
        let result = glossary(raw).unwrap();
        assert_eq!(result.total_terms, 2);
        assert_eq!(result.terms[0].importance, Level::High);
        assert_eq!(result.terms[1].term, "Throughput");
    }

    #[test]
    fn related_topics_default_missing_lists() {
        let raw = json!({
            "topics": [
                {"topic": "Graphs", "relevance": "Underlies the model"},
                {"topic": "Trees", "relevance": "Special case", "searchQuery": "tree data structure"},
                {"relevance": "orphan"}
            ],
            "prerequisites": ["Sets", 7]
        });
        let result = related_topics(&raw.to_string()).unwrap();
        assert_eq!(result.topics.len(), 2);
        assert_eq!(result.topics[0].search_query, "Graphs");
        assert_eq!(result.prerequisites, vec!["Sets"]);
        assert!(result.advanced_topics.is_empty());
    }

    #[test]
    fn answers_need_a_known_confidence() {
        let ok = r#"{"answer": "Yes.", "confidence": "Medium", "relevantQuotes": ["quote"]}"#;
        let result = answer(ok).unwrap();
        assert_eq!(result.confidence, Level::Medium);
        assert_eq!(result.relevant_quotes, vec!["quote"]);

        let bad = r#"{"answer": "Yes.", "confidence": "certain"}"#;
        assert!(matches!(
            answer(bad),
            Err(NormalizeError::InvalidField { field: "confidence", .. })
        ));
    }

    #[test]
    fn structured_features_have_no_line_fallback() {
        let prose = "- just\n- some\n- lines";
        assert!(quiz(prose, 5).is_err());
        assert!(insights(prose).is_err());
        assert!(flashcards(prose, 5).is_err());
        assert!(glossary(prose).is_err());
        assert!(related_topics(prose).is_err());
        assert!(answer(prose).is_err());
    }

    #[test]
    fn errors_remember_their_feature() {
        let err = glossary("nothing").unwrap_err();
        assert_eq!(err.feature(), FeatureType::Glossary);
    }
}
