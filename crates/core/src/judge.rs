//! Answer Judge client.
//!
//! The judge is an external model service that decides whether a free-text
//! answer is semantically equivalent to a reference answer. The
//! orchestrator only ever sees a boolean verdict; the similarity threshold
//! is a system-wide constant fixed at startup, never renegotiated per call.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

/// Failures surfaced by judge calls.
#[derive(Debug, thiserror::Error)]
pub enum JudgeError {
    #[error("unexpected judge response: {0}")]
    Unexpected(String),
    #[error("judge transport failure")]
    Transport(#[from] reqwest::Error),
}

/// Semantic-equivalence oracle for grading free-text answers.
#[async_trait]
pub trait AnswerJudge: Send + Sync {
    /// Compares a candidate answer against the reference answer.
    async fn judge(&self, candidate: &str, reference: &str) -> Result<bool, JudgeError>;
}

/// Client for the model service's prediction endpoint.
pub struct HttpAnswerJudge {
    client: reqwest::Client,
    base: String,
    threshold: f64,
}

impl HttpAnswerJudge {
    pub fn new(
        base: impl Into<String>,
        threshold: f64,
        timeout: Duration,
    ) -> Result<Self, JudgeError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base: base.into(),
            threshold,
        })
    }

    fn url(&self) -> String {
        format!("{}/api/predict", self.base.trim_end_matches('/'))
    }
}

#[derive(Deserialize)]
struct Verdict {
    duplicates: bool,
}

#[async_trait]
impl AnswerJudge for HttpAnswerJudge {
    async fn judge(&self, candidate: &str, reference: &str) -> Result<bool, JudgeError> {
        let resp = self
            .client
            .post(self.url())
            .json(&json!({
                "sentence1": candidate,
                "sentence2": reference,
                "threshold": self.threshold,
            }))
            .send()
            .await?;

        match resp.status().as_u16() {
            200 => {
                let verdict: Verdict = resp.json().await?;
                Ok(verdict.duplicates)
            }
            code => Err(JudgeError::Unexpected(format!("status {code}"))),
        }
    }
}

/// Deterministic judge for tests and local development: case-insensitive,
/// whitespace-trimmed equality.
pub struct ExactMatchJudge;

#[async_trait]
impl AnswerJudge for ExactMatchJudge {
    async fn judge(&self, candidate: &str, reference: &str) -> Result<bool, JudgeError> {
        Ok(candidate.trim().eq_ignore_ascii_case(reference.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn exact_match_ignores_case_and_whitespace() {
        let judge = ExactMatchJudge;
        assert!(judge.judge("  Four ", "four").await.unwrap());
        assert!(judge.judge("4", "4").await.unwrap());
        assert!(!judge.judge("five", "four").await.unwrap());
        assert!(!judge.judge("", "four").await.unwrap());
    }
}
