//! GeminiAnalysisService - direct REST implementation of the analysis port.
//!
//! Calls the Gemini `generateContent` endpoint with a response schema so the
//! model returns the annotation as structured JSON. Callers are expected to
//! fall back on [`EntryAnnotation::fallback`] when this service errs; this
//! module only reports failures, it never substitutes.

use async_trait::async_trait;
use mindflow_core::{
    AnalysisInput, AnalysisService, Emotion, EntryAnnotation, MindflowError, Result,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const ANNOTATE_PROMPT: &str = "Transcribe this audio accurately. Then analyze the content to \
     determine the dominant emotion, a general category (Work, Life, Philosophy, etc), and \
     generate relevant tags.";

const ANNOTATE_TEXT_PROMPT: &str = "Analyze this journal text to determine the dominant \
     emotion, a general category (Work, Life, Philosophy, etc), and generate relevant tags. \
     Return the text itself as the transcription.";

/// Analysis service that talks to the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiAnalysisService {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiAnalysisService {
    /// Creates a new service with the provided API key and the default model.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
        }
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    async fn send_request(&self, body: &GenerateContentRequest<'_>) -> Result<String> {
        let url = format!(
            "{}/{model}:generateContent?key={api_key}",
            BASE_URL,
            model = self.model,
            api_key = self.api_key
        );

        let response = self
            .client
            .post(url)
            .timeout(REQUEST_TIMEOUT)
            .json(body)
            .send()
            .await
            .map_err(|e| MindflowError::analysis(format!("Gemini API request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response.text().await.unwrap_or_default();
            return Err(MindflowError::analysis(format!(
                "Gemini API returned {}: {}",
                status, body_text
            )));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            MindflowError::analysis(format!("Failed to parse Gemini response: {}", e))
        })?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl AnalysisService for GeminiAnalysisService {
    async fn annotate(&self, input: AnalysisInput, language: &str) -> Result<EntryAnnotation> {
        let mut parts = Vec::new();
        let prompt = match &input {
            AnalysisInput::Audio { base64, mime_type } => {
                parts.push(Part::InlineData {
                    inline_data: InlineDataPayload {
                        mime_type: mime_type.clone(),
                        data: base64.clone(),
                    },
                });
                ANNOTATE_PROMPT.to_string()
            }
            AnalysisInput::Text { content } => {
                format!("{}\n\nText:\n{}", ANNOTATE_TEXT_PROMPT, content)
            }
        };
        parts.push(Part::Text {
            text: format!("{} Respond in language: {}.", prompt, language),
        });

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts,
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json",
                response_schema: Some(annotation_schema()),
            }),
        };

        let text = self.send_request(&request).await?;
        let payload: AnnotationPayload = serde_json::from_str(&text).map_err(|e| {
            MindflowError::analysis(format!("Malformed annotation payload: {}", e))
        })?;

        Ok(EntryAnnotation {
            transcript: payload.transcription,
            emotion: Emotion::parse_lenient(&payload.emotion),
            category: payload.category,
            tags: payload.tags,
        })
    }

    async fn reflect(&self, entry_text: &str, language: &str) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part::Text {
                    text: format!(
                        "Write a short, warm, one-paragraph reflection on this journal \
                         entry, in language: {}. Entry:\n{}",
                        language, entry_text
                    ),
                }],
            }],
            generation_config: None,
        };

        self.send_request(&request).await
    }
}

fn annotation_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "transcription": {
                "type": "STRING",
                "description": "The precise transcription of the audio."
            },
            "emotion": {
                "type": "STRING",
                "description": "The dominant emotion of the text. Must be one of: JOY, SADNESS, CALM, ANGRY, EXCITED, ANXIOUS, NEUTRAL."
            },
            "category": {
                "type": "STRING",
                "description": "A high-level category for this thought. Choose the best fit from: Work, Life, Philosophy, Social, Health, Idea."
            },
            "tags": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "Up to 3 relevant tags based on the content (e.g., Design, Family, Stress)."
            }
        },
        "required": ["transcription", "emotion", "category", "tags"]
    })
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineDataPayload,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataPayload {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
    #[serde(rename = "responseSchema", skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct AnnotationPayload {
    transcription: String,
    emotion: String,
    #[serde(default = "default_category")]
    category: String,
    #[serde(default)]
    tags: Vec<String>,
}

fn default_category() -> String {
    "Life".to_string()
}

fn extract_text_response(response: GenerateContentResponse) -> Result<String> {
    response
        .candidates
        .and_then(|mut candidates| candidates.pop())
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
        .ok_or_else(|| {
            MindflowError::analysis("Gemini API returned no text in the response candidates")
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotation_payload_parsing() {
        let json = r#"{
            "transcription": "Had a great walk in the park",
            "emotion": "joy",
            "category": "Life",
            "tags": ["Nature", "Exercise"]
        }"#;
        let payload: AnnotationPayload = serde_json::from_str(json).unwrap();
        assert_eq!(Emotion::parse_lenient(&payload.emotion), Emotion::Joy);
        assert_eq!(payload.category, "Life");
        assert_eq!(payload.tags.len(), 2);
    }

    #[test]
    fn test_annotation_payload_defaults() {
        let json = r#"{"transcription": "t", "emotion": "WEIRD"}"#;
        let payload: AnnotationPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.category, "Life");
        assert!(payload.tags.is_empty());
        assert_eq!(Emotion::parse_lenient(&payload.emotion), Emotion::Neutral);
    }

    #[test]
    fn test_extract_text_response_empty_is_error() {
        let response = GenerateContentResponse { candidates: None };
        assert!(extract_text_response(response).is_err());
    }
}
