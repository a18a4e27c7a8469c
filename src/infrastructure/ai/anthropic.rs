//! Recommendation model backed by the Anthropic Messages API.

use crate::config::{AnthropicConfig, HttpConfig};
use crate::domain::context::TradingContext;
use crate::domain::ports::RecommendationModel;
use crate::domain::recommendation::{ModelDraft, RecommendationRequest};
use crate::domain::trading::types::Direction;
use crate::infrastructure::core::HttpClientFactory;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

const ANTHROPIC_VERSION: &str = "2023-06-01";

const SYSTEM_PROMPT: &str = "You are a professional forex trading analyst with 20+ years of experience. \
Answer with a single JSON object and nothing else, using the keys \
instrument, direction (BUY or SELL), confidence (0 to 1), rationale and optionally units.";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
    system: &'a str,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

/// Shape the model is asked to answer with; direction is parsed leniently
#[derive(Debug, Deserialize)]
struct DraftReply {
    instrument: String,
    direction: String,
    #[serde(default)]
    confidence: f64,
    #[serde(default)]
    rationale: String,
    #[serde(default)]
    units: Option<Decimal>,
    #[serde(default)]
    expires_at: Option<DateTime<Utc>>,
}

pub struct AnthropicModel {
    config: AnthropicConfig,
    client: Client,
}

impl AnthropicModel {
    pub fn new(config: AnthropicConfig, http: &HttpConfig) -> Self {
        Self {
            config,
            client: HttpClientFactory::create_plain_client(http),
        }
    }
}

fn user_prompt(context: &TradingContext, request: &RecommendationRequest) -> String {
    let mut prompt = format!(
        "Generate a forex trade recommendation given context. Instruments: {}. Risk: {}. Horizon: {}.",
        request.instruments.join(", "),
        request.effective_risk_level(),
        if request.time_horizon.is_empty() {
            "unspecified"
        } else {
            request.time_horizon.as_str()
        }
    );
    if let Some(notes) = request.context.as_deref().filter(|n| !n.trim().is_empty()) {
        prompt.push_str("\nOperator notes: ");
        prompt.push_str(notes);
    }
    let summary = context.summary();
    if !summary.is_empty() {
        prompt.push_str("\n\nContext:\n");
        prompt.push_str(&summary);
    }
    prompt
}

/// Slice from the first '{' to the last '}' of a free-text reply
fn json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

pub fn parse_draft(text: &str) -> Result<ModelDraft> {
    let json = json_object(text).context("Model reply contains no JSON object")?;
    let reply: DraftReply =
        serde_json::from_str(json).context("Failed to decode model reply")?;
    Ok(ModelDraft {
        id: None,
        instrument: reply.instrument,
        direction: reply.direction.parse::<Direction>()?,
        confidence: reply.confidence,
        rationale: reply.rationale,
        units: reply.units,
        expires_at: reply.expires_at,
    })
}

#[async_trait]
impl RecommendationModel for AnthropicModel {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn draft(
        &self,
        context: &TradingContext,
        request: &RecommendationRequest,
    ) -> Result<ModelDraft> {
        if self.config.api_key.is_empty() {
            anyhow::bail!("ANTHROPIC_API_KEY not set");
        }

        let body = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            system: SYSTEM_PROMPT,
            messages: vec![Message {
                role: "user",
                content: user_prompt(context, request),
            }],
        };

        let url = format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'));
        debug!("Anthropic POST {} model={}", url, self.config.model);
        let resp = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .context("Anthropic request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("anthropic api status {}: {}", status.as_u16(), text);
        }

        let reply: MessagesResponse = resp
            .json()
            .await
            .context("Failed to decode Anthropic response")?;
        let text: String = reply
            .content
            .iter()
            .filter(|b| b.kind == "text")
            .map(|b| b.text.as_str())
            .collect();
        parse_draft(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn empty_context() -> TradingContext {
        TradingContext {
            assembled_at: Utc::now(),
            market: Default::default(),
            news: Vec::new(),
            historical: Default::default(),
        }
    }

    #[test]
    fn test_parse_draft_inside_prose() {
        let text = "Here is my view:\n```json\n{\"instrument\": \"EUR_USD\", \"direction\": \"sell\", \
                    \"confidence\": 0.72, \"rationale\": \"ECB dovish\", \"units\": 2500}\n```";
        let draft = parse_draft(text).unwrap();
        assert_eq!(draft.instrument, "EUR_USD");
        assert_eq!(draft.direction, Direction::Sell);
        assert_eq!(draft.units, Some(dec!(2500)));
        assert!((draft.confidence - 0.72).abs() < 1e-9);
    }

    #[test]
    fn test_parse_draft_without_json_fails() {
        assert!(parse_draft("I cannot help with that.").is_err());
        assert!(parse_draft("} backwards {").is_err());
    }

    #[test]
    fn test_parse_draft_rejects_unknown_direction() {
        let text = r#"{"instrument": "EUR_USD", "direction": "HOLD", "confidence": 0.4}"#;
        assert!(parse_draft(text).is_err());
    }

    #[test]
    fn test_prompt_mentions_request() {
        let mut request = RecommendationRequest::new(vec!["USD_JPY".to_string()]);
        request.time_horizon = "intraday".to_string();
        request.context = Some("BoJ meeting tomorrow".to_string());
        let prompt = user_prompt(&empty_context(), &request);
        assert!(prompt.contains("Instruments: USD_JPY"));
        assert!(prompt.contains("Horizon: intraday"));
        assert!(prompt.contains("BoJ meeting tomorrow"));
    }

    #[tokio::test]
    async fn test_missing_key_is_an_error() {
        let model = AnthropicModel::new(AnthropicConfig::default(), &HttpConfig::default());
        let request = RecommendationRequest::new(vec!["EUR_USD".to_string()]);
        let err = model.draft(&empty_context(), &request).await.unwrap_err();
        assert!(err.to_string().contains("ANTHROPIC_API_KEY not set"));
    }
}
