use roadwatch_core::{AssessError, AssessmentContext, Severity, SeverityAssessor};
use std::time::Duration;
use tracing::debug;

const MAX_INPUT_CHARS: usize = 4000;
const SEVERITY_MODEL: &str = "claude-3-haiku-20240307";
const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

pub fn build_severity_prompt(context: &AssessmentContext) -> String {
    let findings: String = context.findings_summary.chars().take(MAX_INPUT_CHARS).collect();
    format!(
        "You triage road hazard reports for a maintenance authority. \
         Rate the urgency of the findings below as exactly one word: HIGH, MEDIUM or LOW.\n\n\
         Location (lat,lon): {}\nFindings: {}",
        context.location, findings
    )
}

/// First severity word in a model reply, ignoring case and punctuation
pub fn parse_severity_reply(text: &str) -> Option<Severity> {
    text.split(|c: char| !c.is_ascii_alphabetic())
        .filter(|word| !word.is_empty())
        .find_map(Severity::from_label)
}

/// Severity assessor backed by a hosted language model
pub struct RemoteAssessor {
    client: reqwest::blocking::Client,
    api_key: String,
    endpoint: String,
}

impl RemoteAssessor {
    pub fn new(api_key: impl Into<String>) -> Result<Self, AssessError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AssessError::Unavailable(e.to_string()))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        })
    }

    /// Build from `$ANTHROPIC_API_KEY`; None when unset or blank
    pub fn from_env() -> Option<Result<Self, AssessError>> {
        std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .map(Self::new)
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

impl SeverityAssessor for RemoteAssessor {
    fn assess(&self, context: &AssessmentContext) -> Result<String, AssessError> {
        let prompt = build_severity_prompt(context);

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&serde_json::json!({
                "model": SEVERITY_MODEL,
                "max_tokens": 16,
                "messages": [{"role": "user", "content": prompt}]
            }))
            .send()
            .map_err(|e| AssessError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AssessError::Http(format!("status {}", status)));
        }

        let body: serde_json::Value = response
            .json()
            .map_err(|e| AssessError::InvalidResponse(e.to_string()))?;
        let text = body["content"][0]["text"].as_str().unwrap_or("");
        debug!(reply = text, "severity model replied");

        parse_severity_reply(text)
            .map(|severity| severity.as_str().to_string())
            .ok_or_else(|| AssessError::InvalidResponse(format!("no tier in reply {:?}", text)))
    }
}
