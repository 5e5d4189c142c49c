//! Gemini adapter (HTTP `generateContent` endpoint).
//!
//! Implements the `james-core` ChatModel port over the Generative Language
//! REST API. Inline images are base64-encoded here; the core never sees wire
//! formats.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use james_core::{
    errors::Error,
    model::{ChatModel, GenerateRequest, Part},
    utils::truncate_text,
    Result,
};

const BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Clone, Debug)]
pub struct GeminiClient {
    api_key: String,
    model: String,
    http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: std::time::Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Model(format!("gemini http client build: {e}")))?;

        Ok(Self {
            api_key: api_key.into(),
            model: model.into(),
            http,
        })
    }
}

// ---- wire types ----

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<WireContent>,
    contents: Vec<WireContent>,
    generation_config: WireGenerationConfig,
}

#[derive(Debug, Serialize)]
struct WireContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<WirePart>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
enum WirePart {
    #[serde(rename = "text")]
    Text(String),
    InlineData(WireInlineData),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct WireGenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    candidates: Vec<WireCandidate>,
}

#[derive(Debug, Deserialize)]
struct WireCandidate {
    content: Option<WireCandidateContent>,
}

#[derive(Debug, Deserialize)]
struct WireCandidateContent {
    #[serde(default)]
    parts: Vec<WireCandidatePart>,
}

#[derive(Debug, Deserialize)]
struct WireCandidatePart {
    text: Option<String>,
}

fn build_body(req: &GenerateRequest) -> WireRequest {
    let system_instruction = if req.system.trim().is_empty() {
        None
    } else {
        Some(WireContent {
            role: None,
            parts: vec![WirePart::Text(req.system.clone())],
        })
    };

    let parts = req
        .parts
        .iter()
        .map(|p| match p {
            Part::Text(t) => WirePart::Text(t.clone()),
            Part::InlineImage { mime_type, data } => WirePart::InlineData(WireInlineData {
                mime_type: mime_type.clone(),
                data: STANDARD.encode(data),
            }),
        })
        .collect();

    WireRequest {
        system_instruction,
        contents: vec![WireContent {
            role: Some("user"),
            parts,
        }],
        generation_config: WireGenerationConfig {
            temperature: req.temperature,
        },
    }
}

fn extract_text(resp: WireResponse) -> String {
    // A blocked prompt arrives with no candidates or no content; callers
    // treat the empty string as "no reply".
    let Some(first) = resp.candidates.into_iter().next() else {
        return String::new();
    };
    let Some(content) = first.content else {
        return String::new();
    };
    content
        .parts
        .into_iter()
        .filter_map(|p| p.text)
        .collect::<Vec<_>>()
        .join("")
        .trim()
        .to_string()
}

#[async_trait]
impl ChatModel for GeminiClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, req: &GenerateRequest) -> Result<String> {
        let url = format!(
            "{BASE_URL}/v1beta/models/{}:generateContent?key={}",
            self.model, self.api_key
        );

        let resp = self
            .http
            .post(&url)
            .json(&build_body(req))
            .send()
            .await
            .map_err(|e| Error::Model(format!("gemini request error: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Model(format!(
                "gemini generateContent failed: {status} {}",
                truncate_text(&body, 200)
            )));
        }

        let wire: WireResponse = resp
            .json()
            .await
            .map_err(|e| Error::Model(format!("gemini json error: {e}")))?;

        Ok(extract_text(wire))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_has_system_instruction_and_user_content() {
        let req = GenerateRequest {
            system: "persona".to_string(),
            parts: vec![Part::text("hello")],
            temperature: 0.5,
        };
        let v = serde_json::to_value(build_body(&req)).unwrap();

        assert_eq!(
            v["systemInstruction"]["parts"][0]["text"],
            serde_json::json!("persona")
        );
        assert_eq!(v["contents"][0]["role"], serde_json::json!("user"));
        assert_eq!(
            v["contents"][0]["parts"][0]["text"],
            serde_json::json!("hello")
        );
        assert_eq!(
            v["generationConfig"]["temperature"],
            serde_json::json!(0.5)
        );
    }

    #[test]
    fn inline_images_are_base64_encoded() {
        let req = GenerateRequest {
            system: String::new(),
            parts: vec![Part::jpeg(vec![0xFF, 0xD8, 0xFF])],
            temperature: 0.6,
        };
        let v = serde_json::to_value(build_body(&req)).unwrap();

        assert!(v.get("systemInstruction").is_none());
        let inline = &v["contents"][0]["parts"][0]["inlineData"];
        assert_eq!(inline["mimeType"], serde_json::json!("image/jpeg"));
        assert_eq!(inline["data"], serde_json::json!(STANDARD.encode([0xFF, 0xD8, 0xFF])));
    }

    #[test]
    fn extracts_candidate_text() {
        let wire: WireResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Answer: B" }, { "text": "\nTakeaway: read closely." }] }
            }]
        }))
        .unwrap();
        assert_eq!(extract_text(wire), "Answer: B\nTakeaway: read closely.");
    }

    #[test]
    fn blocked_prompt_yields_empty_text() {
        let wire: WireResponse = serde_json::from_value(serde_json::json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        }))
        .unwrap();
        assert_eq!(extract_text(wire), "");
    }
}
