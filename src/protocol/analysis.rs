//! Structured analysis steps — role extraction and ATS scoring.
//!
//! Both are strict-JSON completion calls at temperature 0. The model's
//! reply is parsed here; malformed JSON is a failure the orchestrator
//! surfaces, never a crash.

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::config::CoachConfig;
use crate::error::LlmError;
use crate::llm::{ChatMessage, CompletionRequest, LlmProvider, ResponseFormat};

use super::prompts;
use super::session::AtsResult;

const ANALYSIS_SYSTEM_PROMPT: &str =
    "You are a data extraction assistant. Output only valid JSON.";

#[derive(Debug, Deserialize)]
struct RoleReply {
    target_role: String,
}

/// Wire shape of the ATS reply; the score arrives unclamped.
#[derive(Debug, Deserialize)]
struct AtsReply {
    score: i64,
    #[serde(default)]
    keywords_present: Vec<String>,
    #[serde(default)]
    keywords_missing: Vec<String>,
    #[serde(default)]
    recommendations: Vec<String>,
}

/// Derive the role the resume should target.
pub async fn extract_target_role(
    llm: &dyn LlmProvider,
    document: &str,
    config: &CoachConfig,
) -> Result<String, LlmError> {
    let prompt = prompts::role_extraction_prompt(document, config.role_extract_chars);
    let content = run_json_call(llm, &prompt, config).await?;
    let reply: RoleReply = parse_json_reply(llm.model_name(), &content)?;
    let role = reply.target_role.trim().to_string();
    if role.is_empty() {
        return Err(LlmError::InvalidResponse {
            provider: llm.model_name().to_string(),
            reason: "role extraction returned an empty target_role".to_string(),
        });
    }
    Ok(role)
}

/// Score the resume against ATS screening for `target_role`.
pub async fn score_resume(
    llm: &dyn LlmProvider,
    document: &str,
    target_role: &str,
    config: &CoachConfig,
) -> Result<AtsResult, LlmError> {
    let prompt = prompts::ats_prompt(document, target_role, config.ats_excerpt_chars);
    let content = run_json_call(llm, &prompt, config).await?;
    let reply: AtsReply = parse_json_reply(llm.model_name(), &content)?;
    Ok(AtsResult {
        score: reply.score.clamp(0, 100) as u8,
        keywords_present: reply.keywords_present,
        keywords_missing: reply.keywords_missing,
        recommendations: reply.recommendations,
    })
}

async fn run_json_call(
    llm: &dyn LlmProvider,
    prompt: &str,
    config: &CoachConfig,
) -> Result<String, LlmError> {
    let messages = vec![
        ChatMessage::system(ANALYSIS_SYSTEM_PROMPT),
        ChatMessage::user(prompt),
    ];
    let request = CompletionRequest::new(messages)
        .with_max_tokens(config.analysis_max_tokens)
        .with_temperature(0.0)
        .with_response_format(ResponseFormat::Json);
    let response = llm.complete(request).await?;
    Ok(response.content)
}

fn parse_json_reply<T: DeserializeOwned>(provider: &str, content: &str) -> Result<T, LlmError> {
    let stripped = strip_code_fences(content);
    serde_json::from_str(stripped).map_err(|e| LlmError::InvalidResponse {
        provider: provider.to_string(),
        reason: format!("malformed JSON reply: {e}"),
    })
}

/// Models wrap JSON in markdown fences often enough that stripping them is
/// part of the parse contract.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.strip_prefix("json").unwrap_or(rest);
    body.strip_suffix("```").unwrap_or(body).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::llm::{CompletionResponse, FinishReason};

    /// Provider that returns one canned reply.
    struct CannedLlm(String);

    #[async_trait]
    impl LlmProvider for CannedLlm {
        fn model_name(&self) -> &str {
            "canned"
        }
        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            Ok(CompletionResponse {
                content: self.0.clone(),
                input_tokens: 0,
                output_tokens: 0,
                finish_reason: FinishReason::Stop,
                response_id: None,
            })
        }
    }

    #[test]
    fn strips_fenced_json() {
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("  {\"a\": 1} "), "{\"a\": 1}");
    }

    #[tokio::test]
    async fn role_extraction_parses_fenced_reply() {
        let llm = CannedLlm("```json\n{\"target_role\": \"VP of Engineering\"}\n```".to_string());
        let role = extract_target_role(&llm, "resume", &CoachConfig::default())
            .await
            .unwrap();
        assert_eq!(role, "VP of Engineering");
    }

    #[tokio::test]
    async fn empty_role_is_invalid() {
        let llm = CannedLlm("{\"target_role\": \"  \"}".to_string());
        let err = extract_target_role(&llm, "resume", &CoachConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn ats_score_is_clamped() {
        let llm = CannedLlm(
            r#"{"score": 150, "keywords_present": ["Rust"], "keywords_missing": [], "recommendations": ["quantify outcomes"]}"#
                .to_string(),
        );
        let result = score_resume(&llm, "resume", "CTO", &CoachConfig::default())
            .await
            .unwrap();
        assert_eq!(result.score, 100);
        assert_eq!(result.keywords_present, vec!["Rust".to_string()]);
    }

    #[tokio::test]
    async fn malformed_json_is_a_failure_not_a_crash() {
        let llm = CannedLlm("The score is about 80 out of 100.".to_string());
        let err = score_resume(&llm, "resume", "CTO", &CoachConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn missing_arrays_default_to_empty() {
        let llm = CannedLlm(r#"{"score": 55}"#.to_string());
        let result = score_resume(&llm, "resume", "CTO", &CoachConfig::default())
            .await
            .unwrap();
        assert_eq!(result.score, 55);
        assert!(result.keywords_present.is_empty());
        assert!(result.recommendations.is_empty());
    }
}
