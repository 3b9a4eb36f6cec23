// Question/answer pairs and lenient parsing of model output

use regex_automata::meta::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::GenerationError;

const OBJECT_PATTERN: &str = r"(?s)\{.*?\}";
const QUESTION_PATTERN: &str = r#""question"\s*:\s*"([^"]+)""#;
const ANSWER_PATTERN: &str = r#""answer"\s*:\s*"([^"]+)""#;
const KIND_PATTERN: &str = r#""type"\s*:\s*"([^"]+)""#;

/// Question type assumed when the model leaves it out.
pub const DEFAULT_KIND: &str = "factual";

fn default_kind() -> String {
    DEFAULT_KIND.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
    /// factual, analytical, interpretative or contextual.
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum QaPayload {
    Many(Vec<QaPair>),
    One(QaPair),
}

impl From<QaPayload> for Vec<QaPair> {
    fn from(payload: QaPayload) -> Self {
        match payload {
            QaPayload::Many(pairs) => pairs,
            QaPayload::One(pair) => vec![pair],
        }
    }
}

/// Parses model output that is supposed to be a JSON array of pairs but often isn't.
pub struct QaParser {
    object: Regex,
    question: Regex,
    answer: Regex,
    kind: Regex,
}

impl QaParser {
    pub fn new() -> Result<Self, GenerationError> {
        Ok(Self {
            object: Regex::new(OBJECT_PATTERN)?,
            question: Regex::new(QUESTION_PATTERN)?,
            answer: Regex::new(ANSWER_PATTERN)?,
            kind: Regex::new(KIND_PATTERN)?,
        })
    }

    /// Try progressively looser readings of `content` until one yields pairs.
    pub fn parse(&self, content: &str) -> Result<Vec<QaPair>, GenerationError> {
        let sliced = slice_outer_array(content.trim());

        if let Ok(payload) = serde_json::from_str::<QaPayload>(sliced) {
            return Ok(payload.into());
        }

        let repaired = sliced.replace('\'', "\"").replace(['\n', '\r'], " ");
        if let Ok(payload) = serde_json::from_str::<QaPayload>(&repaired) {
            debug!("Parsed response after quote repair");
            return Ok(payload.into());
        }

        if let Some(pairs) = self.parse_objects(&repaired) {
            debug!("Parsed {} objects individually", pairs.len());
            return Ok(pairs);
        }

        let pairs = self.extract_fields(&repaired);
        if pairs.is_empty() {
            return Err(GenerationError::MalformedResponse(format!(
                "no question/answer pairs in: {}",
                preview(content)
            )));
        }
        debug!("Recovered {} pairs by field extraction", pairs.len());
        Ok(pairs)
    }

    /// Every `{...}` span must parse for this step to succeed.
    fn parse_objects(&self, text: &str) -> Option<Vec<QaPair>> {
        let mut pairs = Vec::new();
        for found in self.object.find_iter(text) {
            pairs.push(serde_json::from_str::<QaPair>(&text[found.range()]).ok()?);
        }
        (!pairs.is_empty()).then_some(pairs)
    }

    fn extract_fields(&self, text: &str) -> Vec<QaPair> {
        let questions = self.capture_all(&self.question, text);
        let answers = self.capture_all(&self.answer, text);
        let kinds = self.capture_all(&self.kind, text);

        questions
            .into_iter()
            .zip(answers)
            .enumerate()
            .map(|(index, (question, answer))| QaPair {
                question,
                answer,
                kind: kinds.get(index).cloned().unwrap_or_else(default_kind),
            })
            .collect()
    }

    fn capture_all(&self, pattern: &Regex, text: &str) -> Vec<String> {
        pattern
            .captures_iter(text)
            .filter_map(|caps| caps.get_group(1))
            .map(|span| text[span.range()].to_string())
            .collect()
    }
}

/// Drop any prose around the outermost `[` ... `]`.
fn slice_outer_array(content: &str) -> &str {
    match (content.find('['), content.rfind(']')) {
        (Some(start), Some(end)) if start < end => &content[start..=end],
        _ => content,
    }
}

fn preview(content: &str) -> String {
    content.chars().take(120).collect()
}
