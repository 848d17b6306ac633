//! HTTP client for a Gemini-style `generateContent` endpoint.

use std::time::Duration;

use panim_core::{Collaborator, CollaboratorRequest};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::settings::Settings;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
  #[error("no API key configured (set PANIM_API_KEY or api_key in the config file)")]
  MissingApiKey,

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("service returned {status}: {body}")]
  Status { status: StatusCode, body: String },

  #[error("request blocked by the service: {0}")]
  Blocked(String),
}

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
  system_instruction: Content<'a>,
  contents:           [Content<'a>; 1],
  generation_config:  GenerationConfig<'a>,
}

#[derive(Serialize)]
struct Content<'a> {
  #[serde(skip_serializing_if = "Option::is_none")]
  role:  Option<&'static str>,
  parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
  text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
  response_mime_type: &'static str,
  response_schema:    &'a Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct GenerateResponse {
  candidates:      Vec<Candidate>,
  prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Candidate {
  content: Option<CandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CandidateContent {
  parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ResponsePart {
  text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PromptFeedback {
  block_reason: Option<String>,
}

impl GenerateResponse {
  /// Text of the first candidate; empty when the service produced none.
  fn into_text(self) -> Result<String, ClientError> {
    if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
      return Err(ClientError::Blocked(reason));
    }
    Ok(
      self
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default(),
    )
  }
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct GeminiClient {
  client:   Client,
  endpoint: String,
  model:    String,
  api_key:  String,
}

impl GeminiClient {
  pub fn new(settings: &Settings) -> Result<Self, ClientError> {
    if settings.api_key.is_empty() {
      return Err(ClientError::MissingApiKey);
    }
    let client = Client::builder()
      .timeout(Duration::from_secs(settings.timeout_secs))
      .build()?;
    Ok(Self {
      client,
      endpoint: settings.endpoint.trim_end_matches('/').to_owned(),
      model: settings.model.clone(),
      api_key: settings.api_key.clone(),
    })
  }

  fn url(&self) -> String { format!("{}/models/{}:generateContent", self.endpoint, self.model) }
}

impl Collaborator for GeminiClient {
  type Error = ClientError;

  async fn generate(&self, request: &CollaboratorRequest) -> Result<String, ClientError> {
    let body = GenerateRequest {
      system_instruction: Content {
        role:  None,
        parts: [Part { text: &request.system_instruction }],
      },
      contents:           [Content {
        role:  Some("user"),
        parts: [Part { text: &request.contents }],
      }],
      generation_config:  GenerationConfig {
        response_mime_type: "application/json",
        response_schema:    &request.response_schema,
      },
    };

    debug!(model = %self.model, "POST generateContent");
    let resp = self
      .client
      .post(self.url())
      .header("x-goog-api-key", &self.api_key)
      .json(&body)
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(ClientError::Status { status, body });
    }

    resp.json::<GenerateResponse>().await?.into_text()
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn parse(value: Value) -> GenerateResponse { serde_json::from_value(value).unwrap() }

  #[test]
  fn joins_parts_of_first_candidate() {
    let resp = parse(json!({
      "candidates": [
        {"content": {"parts": [{"text": "{\"analysis\""}, {"text": ": []}"}]}},
        {"content": {"parts": [{"text": "ignored"}]}}
      ]
    }));
    assert_eq!(resp.into_text().unwrap(), "{\"analysis\": []}");
  }

  #[test]
  fn no_candidates_is_empty_text() {
    assert_eq!(parse(json!({})).into_text().unwrap(), "");
    assert_eq!(parse(json!({"candidates": [{}]})).into_text().unwrap(), "");
  }

  #[test]
  fn block_reason_is_an_error() {
    let resp = parse(json!({"promptFeedback": {"blockReason": "SAFETY"}}));
    assert!(matches!(resp.into_text(), Err(ClientError::Blocked(r)) if r == "SAFETY"));
  }

  #[test]
  fn request_body_shape() {
    let schema = json!({"type": "OBJECT"});
    let body = GenerateRequest {
      system_instruction: Content { role: None, parts: [Part { text: "sys" }] },
      contents:           [Content { role: Some("user"), parts: [Part { text: "q" }] }],
      generation_config:  GenerationConfig {
        response_mime_type: "application/json",
        response_schema:    &schema,
      },
    };
    let value = serde_json::to_value(&body).unwrap();
    assert_eq!(value["systemInstruction"], json!({"parts": [{"text": "sys"}]}));
    assert_eq!(value["contents"][0]["role"], "user");
    assert_eq!(value["generationConfig"]["responseSchema"], schema);
  }

  #[test]
  fn missing_key_is_rejected() {
    assert!(matches!(
      GeminiClient::new(&Settings::default()),
      Err(ClientError::MissingApiKey)
    ));
  }
}
