//! Gemini streaming client
//!
//! Talks to the `streamGenerateContent` REST endpoint with SSE framing and
//! translates response chunks into [`ModelEvent`]s. Tool declarations ride
//! along as function declarations; tool results are fed back as function
//! responses.

use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::mpsc;

use crate::conversation::{Role, StepContent, ToolCallRequest};
use crate::provider::{
    ModelEvent, ModelProvider, ProviderError, TurnRequest, EVENT_CHANNEL_CAPACITY,
};
use revu_core::tools::ToolOutcome;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Streaming client for the Gemini generative-language API
#[derive(Debug, Clone)]
pub struct GeminiProvider {
    name: String,
    api_key: String,
    model: String,
    base_url: String,
    http_client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let model = model.into();
        Self {
            name: format!("Gemini {model}"),
            api_key: api_key.into(),
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
            http_client: reqwest::Client::new(),
        }
    }

    /// Point the client at a different endpoint (proxies, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:streamGenerateContent?alt=sse&key={}",
            self.base_url, self.model, self.api_key
        )
    }

    fn build_request(&self, request: &TurnRequest) -> GeminiRequest {
        let mut system_text = String::new();
        let mut contents: Vec<GeminiContent> = Vec::new();

        for step in &request.conversation {
            match (&step.role, &step.content) {
                (Role::System, StepContent::Text(text)) => {
                    if !system_text.is_empty() {
                        system_text.push('\n');
                    }
                    system_text.push_str(text);
                }
                (Role::User, StepContent::Text(text)) => {
                    contents.push(GeminiContent::text("user", text));
                }
                (Role::Model, StepContent::Text(text)) => {
                    contents.push(GeminiContent::text("model", text));
                }
                (Role::Model, StepContent::ToolCall(call)) => {
                    contents.push(GeminiContent::function_call(call));
                }
                (Role::ToolResult, StepContent::ToolResult(outcome)) => {
                    contents.push(GeminiContent::function_response(outcome));
                }
                (role, content) => {
                    tracing::debug!(?role, ?content, "skipping unmappable conversation step");
                }
            }
        }

        GeminiRequest {
            system_instruction: (!system_text.is_empty()).then(|| GeminiSystemInstruction {
                parts: vec![GeminiPart {
                    text: Some(system_text),
                    ..GeminiPart::default()
                }],
            }),
            contents,
            tools: (!request.tools.is_empty()).then(|| {
                vec![GeminiTools {
                    function_declarations: request
                        .tools
                        .iter()
                        .map(|spec| GeminiFunctionDeclaration {
                            name: spec.name.clone(),
                            description: spec.description.clone(),
                            parameters: spec.parameters.clone(),
                        })
                        .collect(),
                }]
            }),
            generation_config: Some(GeminiGenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_output_tokens,
            }),
        }
    }
}

#[async_trait]
impl ModelProvider for GeminiProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn begin_turn(
        &self,
        request: TurnRequest,
    ) -> Result<mpsc::Receiver<ModelEvent>, ProviderError> {
        let payload = self.build_request(&request);
        let response = self
            .http_client
            .post(self.endpoint())
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Rejected(format!("{status}: {body}")));
        }

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        tokio::spawn(stream_events(response, tx));
        Ok(rx)
    }
}

/// Drain the SSE body and forward events until it ends or the receiver goes
/// away. A transport fault mid-stream surfaces as a terminal event.
async fn stream_events(response: reqwest::Response, tx: mpsc::Sender<ModelEvent>) {
    let mut body = response.bytes_stream();
    let mut buffer = String::new();

    while let Some(chunk) = body.next().await {
        let bytes = match chunk {
            Ok(bytes) => bytes,
            Err(e) => {
                let _ = tx.send(ModelEvent::TransportError(e.to_string())).await;
                return;
            }
        };

        buffer.push_str(&String::from_utf8_lossy(&bytes));
        while let Some(newline) = buffer.find('\n') {
            let line: String = buffer.drain(..=newline).collect();
            if !emit_line(line.trim(), &tx).await {
                return;
            }
        }
    }

    if !buffer.trim().is_empty() {
        let _ = emit_line(buffer.trim(), &tx).await;
    }
    let _ = tx.send(ModelEvent::TurnComplete).await;
}

/// Parse one SSE line and forward its events. Returns `false` when the
/// receiver is gone and streaming should stop.
async fn emit_line(line: &str, tx: &mpsc::Sender<ModelEvent>) -> bool {
    let Some(data) = line.strip_prefix("data:") else {
        return true;
    };
    let data = data.trim();
    if data.is_empty() || data == "[DONE]" {
        return true;
    }

    let chunk: GeminiStreamChunk = match serde_json::from_str(data) {
        Ok(chunk) => chunk,
        Err(e) => {
            tracing::warn!(error = %e, "skipping unparseable stream chunk");
            return true;
        }
    };

    for candidate in chunk.candidates {
        let Some(content) = candidate.content else {
            continue;
        };
        for part in content.parts {
            let event = if let Some(text) = part.text {
                ModelEvent::TextDelta(text)
            } else if let Some(call) = part.function_call {
                ModelEvent::ToolCall(ToolCallRequest {
                    name: call.name,
                    input: call.args,
                })
            } else {
                continue;
            };
            if tx.send(event).await.is_err() {
                return false;
            }
        }
    }
    true
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    #[serde(skip_serializing_if = "Option::is_none", rename = "systemInstruction")]
    system_instruction: Option<GeminiSystemInstruction>,
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<GeminiTools>>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "generationConfig")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiSystemInstruction {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

impl GeminiContent {
    fn text(role: &str, text: &str) -> Self {
        Self {
            role: role.to_string(),
            parts: vec![GeminiPart {
                text: Some(text.to_string()),
                ..GeminiPart::default()
            }],
        }
    }

    fn function_call(call: &ToolCallRequest) -> Self {
        Self {
            role: "model".to_string(),
            parts: vec![GeminiPart {
                function_call: Some(GeminiFunctionCall {
                    name: call.name.clone(),
                    args: call.input.clone(),
                }),
                ..GeminiPart::default()
            }],
        }
    }

    fn function_response(outcome: &ToolOutcome) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![GeminiPart {
                function_response: Some(GeminiFunctionResponse {
                    name: outcome.tool.clone(),
                    response: json!({
                        "success": outcome.success,
                        "content": outcome.payload,
                    }),
                }),
                ..GeminiPart::default()
            }],
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "functionCall")]
    function_call: Option<GeminiFunctionCall>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "functionResponse")]
    function_response: Option<GeminiFunctionResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiFunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiFunctionResponse {
    name: String,
    response: Value,
}

#[derive(Debug, Serialize)]
struct GeminiTools {
    #[serde(rename = "functionDeclarations")]
    function_declarations: Vec<GeminiFunctionDeclaration>,
}

#[derive(Debug, Serialize)]
struct GeminiFunctionDeclaration {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f64,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiStreamChunk {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Conversation;
    use revu_core::tools::ToolSpec;

    fn request_for(conversation: Conversation) -> TurnRequest {
        TurnRequest {
            conversation: conversation.steps().to_vec(),
            tools: vec![ToolSpec {
                name: "read_file".to_string(),
                description: "Reads a file".to_string(),
                parameters: json!({ "type": "object" }),
            }],
            temperature: 0.3,
            max_output_tokens: 1024,
        }
    }

    #[test]
    fn test_system_steps_fold_into_the_system_instruction() {
        let provider = GeminiProvider::new("key", "gemini-2.5-flash");
        let conversation = Conversation::seeded("be thorough", "review this");

        let request = provider.build_request(&request_for(conversation));

        let system = request.system_instruction.unwrap();
        assert_eq!(system.parts[0].text.as_deref(), Some("be thorough"));
        assert_eq!(request.contents.len(), 1);
        assert_eq!(request.contents[0].role, "user");
    }

    #[test]
    fn test_tool_results_become_function_responses() {
        let provider = GeminiProvider::new("key", "gemini-2.5-flash");
        let mut conversation = Conversation::seeded("sys", "user");
        conversation.push_tool_call(ToolCallRequest {
            name: "read_file".to_string(),
            input: json!({ "filePath": "a.ts" }),
        });
        conversation.push_tool_result(ToolOutcome::success("read_file", json!({ "ok": true })));

        let request = provider.build_request(&request_for(conversation));

        let call_part = &request.contents[1].parts[0];
        assert_eq!(call_part.function_call.as_ref().unwrap().name, "read_file");

        let response_content = &request.contents[2];
        assert_eq!(response_content.role, "user");
        let response = response_content.parts[0].function_response.as_ref().unwrap();
        assert_eq!(response.name, "read_file");
        assert_eq!(response.response["success"], true);
    }

    #[test]
    fn test_declarations_ride_along() {
        let provider = GeminiProvider::new("key", "gemini-2.5-flash");
        let request = provider.build_request(&request_for(Conversation::seeded("s", "u")));

        let tools = request.tools.unwrap();
        assert_eq!(tools[0].function_declarations[0].name, "read_file");
    }

    #[tokio::test]
    async fn test_text_chunk_line_becomes_a_delta() {
        let (tx, mut rx) = mpsc::channel(8);
        let line = r#"data: {"candidates":[{"content":{"role":"model","parts":[{"text":"Hello"}]}}]}"#;

        assert!(emit_line(line, &tx).await);
        assert_eq!(
            rx.recv().await,
            Some(ModelEvent::TextDelta("Hello".to_string()))
        );
    }

    #[tokio::test]
    async fn test_function_call_line_becomes_a_tool_call() {
        let (tx, mut rx) = mpsc::channel(8);
        let line = r#"data: {"candidates":[{"content":{"parts":[{"functionCall":{"name":"read_file","args":{"filePath":"a.ts"}}}]}}]}"#;

        assert!(emit_line(line, &tx).await);
        match rx.recv().await {
            Some(ModelEvent::ToolCall(call)) => {
                assert_eq!(call.name, "read_file");
                assert_eq!(call.input["filePath"], "a.ts");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_data_lines_are_ignored() {
        let (tx, mut rx) = mpsc::channel(8);

        assert!(emit_line(": keepalive", &tx).await);
        assert!(emit_line("", &tx).await);
        assert!(emit_line("data: [DONE]", &tx).await);

        drop(tx);
        assert_eq!(rx.recv().await, None);
    }
}
