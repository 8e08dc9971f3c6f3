use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;

use crate::ExtractError;

/// Client for an OpenAI-compatible chat-completions endpoint with structured
/// output. One request per extraction, no retry: a failed call is fatal to
/// the request.
#[derive(Clone)]
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<Value>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(
        base_url: String,
        api_key: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self, ExtractError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url,
            api_key,
            model,
            client,
        })
    }

    /// Chat completion constrained to a JSON schema. Returns the raw content
    /// string; the caller parses and validates it.
    pub async fn chat_structured(
        &self,
        system: &str,
        user: &str,
        schema_name: &str,
        schema: Value,
        temperature: f32,
    ) -> Result<String, ExtractError> {
        let response_format = json!({
            "type": "json_schema",
            "json_schema": {
                "name": schema_name,
                "strict": true,
                "schema": schema,
            }
        });
        self.chat(system, user, temperature, Some(response_format))
            .await
    }

    async fn chat(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
        response_format: Option<Value>,
    ) -> Result<String, ExtractError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user.to_string(),
                },
            ],
            temperature,
            response_format,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractError::Api(format!("{}: {}", status, body)));
        }

        let chat: ChatResponse = response.json().await?;
        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.is_empty())
            .ok_or(ExtractError::NoContent)
    }
}
