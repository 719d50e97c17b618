use serde_json::{json, Value};
use std::time::Duration;

/// Minimal blocking client for an OpenAI-compatible chat-completions
/// endpoint. Shared by the correctness judge and the summarizer; both treat
/// every failure here as a reason string to fall back on, never an abort.
pub(crate) struct ChatClient {
    client: reqwest::blocking::Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl ChatClient {
    pub(crate) fn new(api_base: String, api_key: String, model: String) -> Result<Self, String> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(|err| format!("http client init failed: {}", err))?;

        Ok(Self {
            client,
            api_base,
            api_key,
            model,
        })
    }

    /// Send one system+user exchange and return the first choice's content.
    pub(crate) fn complete(
        &self,
        system: &str,
        user: &str,
        temperature: f64,
        max_tokens: u32,
        timeout: Duration,
    ) -> Result<String, String> {
        let url = format!("{}/chat/completions", self.api_base.trim_end_matches('/'));
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
            "temperature": temperature,
            "max_tokens": max_tokens,
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(timeout)
            .json(&body)
            .send()
            .map_err(|err| format!("chat POST {} transport error: {}", url, err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("chat POST {} failed: status={}", url, status));
        }

        let payload: Value = response
            .json()
            .map_err(|err| format!("chat POST {} returned invalid JSON: {}", url, err))?;

        let content = payload
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(Value::as_str)
            .ok_or_else(|| "chat response missing choices[0].message.content".to_string())?;

        Ok(content.trim().to_string())
    }
}
