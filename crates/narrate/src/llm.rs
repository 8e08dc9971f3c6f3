use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::NarrateError;

/// Client for the secondary language-model calls: free-form chat for Q&A and
/// storytelling, plus text-to-speech for narrated playback.
#[derive(Clone)]
pub struct NarrationClient {
    base_url: String,
    api_key: String,
    chat_model: String,
    tts_model: String,
    tts_voice: String,
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

#[derive(Serialize)]
struct SpeechRequest {
    model: String,
    voice: String,
    input: String,
    response_format: &'static str,
}

impl NarrationClient {
    pub fn new(
        base_url: String,
        api_key: String,
        chat_model: String,
        tts_model: String,
        tts_voice: String,
        timeout: Duration,
    ) -> Result<Self, NarrateError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url,
            api_key,
            chat_model,
            tts_model,
            tts_voice,
            client,
        })
    }

    pub async fn chat(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
    ) -> Result<String, NarrateError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: self.chat_model.clone(),
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
            return Err(NarrateError::Api(format!("{}: {}", status, body)));
        }

        let chat: ChatResponse = response.json().await?;
        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.is_empty())
            .ok_or(NarrateError::NoContent)
    }

    /// Synthesize speech for a chapter narrative. Returns mp3 bytes.
    pub async fn speech(&self, text: &str) -> Result<Vec<u8>, NarrateError> {
        let url = format!("{}/audio/speech", self.base_url);
        let request = SpeechRequest {
            model: self.tts_model.clone(),
            voice: self.tts_voice.clone(),
            input: text.to_string(),
            response_format: "mp3",
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
            return Err(NarrateError::Api(format!("{}: {}", status, body)));
        }

        Ok(response.bytes().await?.to_vec())
    }
}
