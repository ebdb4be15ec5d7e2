//! crates/study_assistant_core/src/prompts.rs
//!
//! Prompt templates for every feature. Each prompt is laid out the same way:
//! the task, then the document text, then the output format rules, ending
//! with an instruction to emit nothing else.

const SUMMARIZE_TEMPLATE: &str = r#"Please provide a comprehensive summary of the following text. The summary should capture the main ideas, key points, and overall theme of the content. Keep it concise but informative.

Text to summarize:
{content}

Provide your response as a clear, well-structured summary in plain prose. Do not add a title, a preamble, or any commentary about the task."#;

const BULLET_POINTS_TEMPLATE: &str = r#"Analyze the following text and extract the most important points as bullet points.
Provide up to {max_points} key bullet points that capture the essential information.
Each bullet point should be clear, concise, and self-contained.

Text to analyze:
{content}

Format your response as a JSON array of strings, where each string is a bullet point.
Example: ["Point 1", "Point 2", "Point 3"]

Only respond with the JSON array, nothing else."#;

const QUIZ_TEMPLATE: &str = r#"Based on the following text, create {number_of_questions} multiple choice quiz questions to test understanding of the content.

Text:
{content}

Generate questions in the following JSON format:
{
  "questions": [
    {
      "question": "The question text",
      "options": ["Option A", "Option B", "Option C", "Option D"],
      "correctAnswer": 0,
      "explanation": "Brief explanation of why this is the correct answer"
    }
  ]
}

Rules:
1. Each question must have exactly 4 options
2. correctAnswer is the index (0-3) of the correct option
3. Questions should test comprehension, not trivial details
4. Make sure all questions are answerable from the provided text
5. Provide clear explanations

Only respond with the JSON object, nothing else."#;

const INSIGHTS_TEMPLATE: &str = r#"Analyze the following text and extract key insights that go beyond summarizing: offer deeper analysis and implications.

Text:
{content}

Provide your response in the following JSON format:
{
  "insights": ["Insight 1", "Insight 2", "Insight 3", "Insight 4", "Insight 5"],
  "mainTheme": "The main theme or topic of the content",
  "targetAudience": "Who would benefit most from this content"
}

Provide between 5 and 7 insights.

Only respond with the JSON object, nothing else."#;

const FLASHCARDS_TEMPLATE: &str = r#"Create {number_of_cards} flashcards for studying the following content.

Text:
{content}

Generate flashcards in the following JSON format:
{
  "flashcards": [
    {
      "front": "Question or term on front of card",
      "back": "Answer or definition on back of card",
      "category": "Category like 'Definition', 'Concept', 'Fact', 'Application'"
    }
  ]
}

Rules:
1. Create cards that help with memorization and understanding
2. Mix different types: definitions, concepts, facts, and applications
3. Keep the front concise, the back can be more detailed
4. Make cards that are useful for active recall

Only respond with the JSON object, nothing else."#;

const GLOSSARY_TEMPLATE: &str = r#"Extract important terms and create a glossary from the following text.

Text:
{content}

Generate a glossary in the following JSON format:
{
  "terms": [
    {
      "term": "The term or concept",
      "definition": "Clear, concise definition",
      "importance": "high"
    }
  ]
}

Rules:
1. Identify key terms, concepts, and jargon
2. Provide clear, understandable definitions
3. importance is one of "high", "medium" or "low", based on how central the term is to understanding the content
4. Include 8-15 terms

Only respond with the JSON object, nothing else."#;

const RELATED_TOPICS_TEMPLATE: &str = r#"Based on the following text, suggest related topics for further learning.

Text:
{content}

Generate suggestions in the following JSON format:
{
  "topics": [
    {
      "topic": "Related topic name",
      "relevance": "Why this topic is related",
      "searchQuery": "Suggested search query to learn more"
    }
  ],
  "prerequisites": ["Topic to learn before", "Another topic to learn before"],
  "advancedTopics": ["Advanced topic", "Another advanced topic"]
}

Provide:
- 5-8 related topics
- 2-4 prerequisite topics (what to learn first)
- 2-4 advanced topics (what to learn next)

Only respond with the JSON object, nothing else."#;

const ASK_QUESTION_TEMPLATE: &str = r#"Answer the following question based on the provided text.

Question: {question}

Text:
{content}

Provide your response in the following JSON format:
{
  "answer": "Your detailed answer to the question",
  "confidence": "high",
  "relevantQuotes": ["Quote from the text", "Another quote from the text"]
}

Rules:
1. Only answer based on information in the provided text
2. If the answer cannot be found in the text, say so
3. confidence is one of "high", "medium" or "low", based on how well the text supports the answer
4. Include relevant quotes that support your answer
5. Be thorough but concise

Only respond with the JSON object, nothing else."#;

/// Substitutes `{name}` placeholders in a single pass over the template, so
/// placeholder-like text inside substituted values is left untouched.
fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let extra: usize = vars.iter().map(|(_, value)| value.len()).sum();
    let mut out = String::with_capacity(template.len() + extra);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let substitution = after.find('}').and_then(|close| {
            let name = &after[..close];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });
        match substitution {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

pub fn summarize(content: &str) -> String {
    render(SUMMARIZE_TEMPLATE, &[("content", content)])
}

pub fn bullet_points(content: &str, max_points: usize) -> String {
    let max_points = max_points.to_string();
    render(
        BULLET_POINTS_TEMPLATE,
        &[("content", content), ("max_points", &max_points)],
    )
}

pub fn quiz(content: &str, number_of_questions: usize) -> String {
    let number_of_questions = number_of_questions.to_string();
    render(
        QUIZ_TEMPLATE,
        &[
            ("content", content),
            ("number_of_questions", &number_of_questions),
        ],
    )
}

pub fn insights(content: &str) -> String {
    render(INSIGHTS_TEMPLATE, &[("content", content)])
}

pub fn flashcards(content: &str, number_of_cards: usize) -> String {
    let number_of_cards = number_of_cards.to_string();
    render(
        FLASHCARDS_TEMPLATE,
        &[("content", content), ("number_of_cards", &number_of_cards)],
    )
}

pub fn glossary(content: &str) -> String {
    render(GLOSSARY_TEMPLATE, &[("content", content)])
}

pub fn related_topics(content: &str) -> String {
    render(RELATED_TOPICS_TEMPLATE, &[("content", content)])
}

pub fn ask_question(content: &str, question: &str) -> String {
    render(
        ASK_QUESTION_TEMPLATE,
        &[("content", content), ("question", question)],
    )
}
