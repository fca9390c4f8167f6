//! Request and response types for the Responses API.

use serde::{Deserialize, Serialize};

/// A text generation request.
///
/// Covers everything the enrichment pipeline asks of the provider: a user
/// prompt, an optional system prompt, an optional web-search tool, sampling
/// temperature and an output-token budget.
#[derive(Debug, Clone)]
pub struct TextRequest {
    /// Model to use (e.g. "gpt-4o", "gpt-4o-mini")
    pub model: String,

    /// The user prompt
    pub prompt: String,

    /// Optional system prompt
    pub system: Option<String>,

    /// Enable the provider's web-search tool for this call
    pub web_search: bool,

    /// Sampling temperature
    pub temperature: Option<f32>,

    /// Maximum output tokens
    pub max_output_tokens: Option<u32>,
}

impl TextRequest {
    /// Create a new request with the given model and prompt.
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system: None,
            web_search: false,
            temperature: None,
            max_output_tokens: None,
        }
    }

    /// Set a system prompt.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Enable web search.
    pub fn with_web_search(mut self) -> Self {
        self.web_search = true;
        self
    }

    /// Set temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the output-token budget.
    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = Some(max_output_tokens);
        self
    }
}

/// Wire request body for the `/responses` endpoint.
#[derive(Debug, Serialize)]
pub(crate) struct ResponsesRequest {
    pub model: String,

    pub input: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolSpec>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_response_id: Option<String>,
}

impl ResponsesRequest {
    pub(crate) fn from_request(request: &TextRequest, previous_response_id: Option<&str>) -> Self {
        let tools = if request.web_search {
            vec![ToolSpec {
                tool_type: "web_search".to_string(),
            }]
        } else {
            Vec::new()
        };

        Self {
            model: request.model.clone(),
            input: request.prompt.clone(),
            instructions: request.system.clone(),
            tools,
            temperature: request.temperature,
            max_output_tokens: request.max_output_tokens,
            previous_response_id: previous_response_id.map(|s| s.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ToolSpec {
    #[serde(rename = "type")]
    pub tool_type: String,
}

/// A completed generation, with the response id for multi-turn continuation.
#[derive(Debug, Clone)]
pub struct TextResponse {
    /// Concatenated output text. Empty if the response carried none.
    pub text: String,

    /// Provider response id, used to thread follow-up turns.
    pub response_id: String,

    /// Token usage, when reported.
    pub usage: Option<Usage>,
}

/// Token usage statistics.
#[derive(Debug, Clone, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
}

/// Raw response envelope from the API (for internal parsing).
#[derive(Debug, Deserialize)]
pub(crate) struct ResponsesEnvelope {
    pub id: String,

    #[serde(default)]
    pub output: Vec<OutputItem>,

    pub usage: Option<Usage>,
}

impl ResponsesEnvelope {
    /// Extract plain output text from the envelope.
    ///
    /// Walks `output[] -> content[] -> output_text.text` and concatenates.
    /// A successful response with no textual content yields an empty string,
    /// never an error.
    pub(crate) fn output_text(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        for item in &self.output {
            if item.item_type != "message" {
                continue;
            }
            for content in &item.content {
                if content.content_type == "output_text" {
                    parts.push(&content.text);
                }
            }
        }
        parts.join("")
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct OutputItem {
    #[serde(rename = "type")]
    pub item_type: String,

    #[serde(default)]
    pub content: Vec<OutputContent>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OutputContent {
    #[serde(rename = "type")]
    pub content_type: String,

    #[serde(default)]
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let req = TextRequest::new("gpt-4o", "Hello")
            .with_system("Be terse")
            .with_web_search()
            .with_temperature(0.2)
            .with_max_output_tokens(512);

        assert_eq!(req.model, "gpt-4o");
        assert_eq!(req.system.as_deref(), Some("Be terse"));
        assert!(req.web_search);
        assert_eq!(req.temperature, Some(0.2));
        assert_eq!(req.max_output_tokens, Some(512));
    }

    #[test]
    fn test_wire_request_omits_empty_tools() {
        let req = TextRequest::new("gpt-4o", "Hello");
        let wire = ResponsesRequest::from_request(&req, None);
        let json = serde_json::to_value(&wire).unwrap();

        assert!(json.get("tools").is_none());
        assert!(json.get("previous_response_id").is_none());
    }

    #[test]
    fn test_wire_request_includes_web_search_tool() {
        let req = TextRequest::new("gpt-4o", "Hello").with_web_search();
        let wire = ResponsesRequest::from_request(&req, Some("resp_123"));
        let json = serde_json::to_value(&wire).unwrap();

        assert_eq!(json["tools"][0]["type"], "web_search");
        assert_eq!(json["previous_response_id"], "resp_123");
    }

    #[test]
    fn test_output_text_extraction() {
        let raw = serde_json::json!({
            "id": "resp_1",
            "output": [
                { "type": "web_search_call", "content": [] },
                { "type": "message", "content": [
                    { "type": "output_text", "text": "Hello " },
                    { "type": "output_text", "text": "world" }
                ]}
            ]
        });

        let envelope: ResponsesEnvelope = serde_json::from_value(raw).unwrap();
        assert_eq!(envelope.output_text(), "Hello world");
    }

    #[test]
    fn test_output_text_empty_when_no_message() {
        let raw = serde_json::json!({
            "id": "resp_2",
            "output": [ { "type": "web_search_call", "content": [] } ]
        });

        let envelope: ResponsesEnvelope = serde_json::from_value(raw).unwrap();
        assert_eq!(envelope.output_text(), "");
    }
}
