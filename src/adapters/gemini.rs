use crate::domain::ports::ModelClient;
use crate::utils::error::{CleanerError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f64,
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
    #[serde(rename = "responseSchema")]
    response_schema: serde_json::Value,
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiCandidateContent,
}

#[derive(Deserialize)]
struct GeminiCandidateContent {
    parts: Vec<GeminiCandidatePart>,
}

#[derive(Deserialize)]
struct GeminiCandidatePart {
    text: String,
}

/// Gemini generateContent 客戶端，所有請求都要求 schema 約束的 JSON 回應
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

/// 剝除模型偶爾包上的 markdown 圍欄，結構化輸出之外的防護
fn strip_code_fence(value: &str) -> &str {
    let trimmed = value.trim();
    if let Some(stripped) = trimmed.strip_prefix("```json") {
        return stripped.trim().trim_end_matches("```").trim_end();
    }
    if let Some(stripped) = trimmed.strip_prefix("```") {
        return stripped.trim().trim_end_matches("```").trim_end();
    }
    trimmed
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn invoke(
        &self,
        model: &str,
        prompt: &str,
        response_schema: &serde_json::Value,
    ) -> Result<serde_json::Value> {
        if prompt.trim().is_empty() {
            return Err(CleanerError::ModelError {
                message: "prompt must not be empty".to_string(),
            });
        }

        let base_url = self.base_url.trim_end_matches('/');
        let url = format!(
            "{}/{}:generateContent?key={}",
            base_url, model, self.api_key
        );

        let body = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.2,
                response_mime_type: "application/json".to_string(),
                response_schema: response_schema.clone(),
            },
        };

        tracing::debug!("📡 Calling model {} ({} prompt chars)", model, prompt.len());

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| CleanerError::ModelError {
                message: format!("request failed: {}", e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(CleanerError::ModelError {
                message: format!("API error ({}): {}", status, text),
            });
        }

        let json: GeminiResponse =
            response
                .json()
                .await
                .map_err(|e| CleanerError::ModelError {
                    message: format!("failed to parse response envelope: {}", e),
                })?;

        let payload = json
            .candidates
            .first()
            .and_then(|candidate| candidate.content.parts.first())
            .map(|part| part.text.clone())
            .ok_or_else(|| CleanerError::ModelError {
                message: "response contained no candidates".to_string(),
            })?;

        serde_json::from_str(strip_code_fence(&payload)).map_err(|e| CleanerError::ModelError {
            message: format!("structured output did not parse as JSON: {}", e),
        })
    }
}
