//! Keyword suggestions from an OpenAI-compatible multimodal chat endpoint.

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::Asset;
use crate::error::TaggerError;

pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Produces candidate search keywords for an asset.
pub trait KeywordSource {
    fn suggest(&self, asset: &Asset) -> Result<Vec<String>, TaggerError>;
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    /// Base URL including `/v1`.
    pub base_url: String,
    pub model: String,
}

pub struct OpenAiKeywords {
    config: OpenAiConfig,
    agent: ureq::Agent,
}

impl OpenAiKeywords {
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            config,
            agent: ureq::agent(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

/// Text half of the user message.
pub fn prompt_for(name: &str) -> String {
    format!(
        "This is a game asset named '{name}'. Based on the name and the image, return a list of \
         lower-case, single-word keywords that would make it easy to search for this specific asset."
    )
}

/// Chat request asking for `{ "keywords": [string] }` under a strict schema.
pub fn request_body(model: &str, asset: &Asset) -> Value {
    json!({
        "model": model,
        "messages": [{
            "role": "user",
            "content": [
                { "type": "text", "text": prompt_for(&asset.name) },
                { "type": "image_url", "image_url": { "url": asset.image } },
            ],
        }],
        "response_format": {
            "type": "json_schema",
            "json_schema": {
                "name": "keyword_list",
                "strict": true,
                "schema": {
                    "type": "object",
                    "properties": {
                        "keywords": { "type": "array", "items": { "type": "string" } },
                    },
                    "required": ["keywords"],
                    "additionalProperties": false,
                },
            },
        },
    })
}

#[derive(Deserialize)]
struct ChatReply {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct KeywordList {
    keywords: Vec<String>,
}

/// Keywords from a chat-completions reply body. Blank entries are dropped and
/// surrounding whitespace trimmed; case is left as the model returned it.
pub fn parse_reply(body: &str) -> Result<Vec<String>, TaggerError> {
    let reply: ChatReply =
        serde_json::from_str(body).map_err(|e| TaggerError::Response(format!("reply: {e}")))?;
    let content = reply
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| TaggerError::Response("reply has no message content".into()))?;
    let list: KeywordList = serde_json::from_str(&content)
        .map_err(|e| TaggerError::Response(format!("keyword list: {e}")))?;
    Ok(list
        .keywords
        .into_iter()
        .map(|k| k.trim().to_owned())
        .filter(|k| !k.is_empty())
        .collect())
}

impl KeywordSource for OpenAiKeywords {
    fn suggest(&self, asset: &Asset) -> Result<Vec<String>, TaggerError> {
        let body = request_body(&self.config.model, asset).to_string();
        let response = self
            .agent
            .post(&self.endpoint())
            .set("Authorization", &format!("Bearer {}", self.config.api_key))
            .set("Content-Type", "application/json")
            .send_string(&body)
            .map_err(|e| TaggerError::Inference(e.to_string()))?;
        let text = response
            .into_string()
            .map_err(|e| TaggerError::Inference(format!("reading reply: {e}")))?;
        let keywords = parse_reply(&text)?;
        debug!(asset = %asset.id, ?keywords, "keywords suggested");
        Ok(keywords)
    }
}
