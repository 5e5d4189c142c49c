//! Model port: the interface the handlers use to talk to a chat model.
//!
//! Provider quirks (HTTP payload shapes, base64 encoding, key handling) stay
//! in adapter crates; this module only defines the request vocabulary.

use async_trait::async_trait;

use crate::Result;

/// One piece of a multimodal prompt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Part {
    Text(String),
    /// Raw image bytes; the adapter encodes them for the wire.
    InlineImage { mime_type: String, data: Vec<u8> },
}

impl Part {
    pub fn text(s: impl Into<String>) -> Self {
        Part::Text(s.into())
    }

    pub fn jpeg(data: Vec<u8>) -> Self {
        Part::InlineImage {
            mime_type: "image/jpeg".to_string(),
            data,
        }
    }
}

/// A single stateless generation request. The bot keeps no conversation
/// history; every message stands alone.
#[derive(Clone, Debug)]
pub struct GenerateRequest {
    pub system: String,
    pub parts: Vec<Part>,
    pub temperature: f32,
}

/// Chat model client used by the handlers.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Provider/model label for logs.
    fn model_name(&self) -> &str;

    /// Run one generation. An empty string means the model produced no text
    /// (e.g. the prompt was blocked); callers treat that as "no reply".
    async fn generate(&self, req: &GenerateRequest) -> Result<String>;
}
