//! The dashboard's analysis flows and the compliance assistant.
//!
//! Every flow is one inference call. Only document forensics goes through the
//! retry shim; the others surface the backend error to the caller.

use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use fraudlens_common::config::ModelConfig;
use fraudlens_llm::{
    complete_with_retry, Completion, LlmBackend, LlmError, LlmRequest, Message, RetryPolicy,
};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::defang::defang;
use crate::enrich::{EvidenceEnricher, DEFAULT_NUM_RESULTS};
use crate::gauge::{render_gauge, GaugeSpec};
use crate::prompts;
use crate::score::RiskAssessment;
use crate::transcript::Transcript;

/// Flow labels recorded on each request for the audit trail.
pub mod flow {
    pub const EMAIL: &str = "email";
    pub const CHAT: &str = "chat";
    pub const DOCUMENT: &str = "document";
    pub const AI_DETECTION: &str = "ai_detection";
    pub const ASSISTANT: &str = "assistant";
}

/// Result of the email scan.
#[derive(Debug, Clone, Serialize)]
pub struct EmailReport {
    pub assessment: RiskAssessment,
    pub gauge: GaugeSpec,
    /// The submitted text with links neutralised, safe to echo back.
    pub defanged_input: String,
}

pub struct FraudLens {
    backend: Arc<dyn LlmBackend>,
    enricher: EvidenceEnricher,
    models: ModelConfig,
    retry: RetryPolicy,
    num_results: usize,
}

impl FraudLens {
    pub fn new(backend: Arc<dyn LlmBackend>, enricher: EvidenceEnricher, models: ModelConfig) -> Self {
        Self {
            backend,
            enricher,
            models,
            retry: RetryPolicy::default(),
            num_results: DEFAULT_NUM_RESULTS,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_num_results(mut self, num_results: usize) -> Self {
        self.num_results = num_results;
        self
    }

    pub fn models(&self) -> &ModelConfig {
        &self.models
    }

    async fn ask_text_model(&self, flow: &str, messages: Vec<Message>) -> Result<String, LlmError> {
        let req = LlmRequest::new(&self.models.text, messages).with_flow(flow);
        let resp = self.backend.complete(req).await?;
        Ok(resp.content)
    }

    /// Fraud scan of a pasted email. Empty input is a no-op.
    #[instrument(skip_all, fields(len = text.len()))]
    pub async fn analyze_email(&self, text: &str) -> Result<Option<EmailReport>, LlmError> {
        if text.is_empty() {
            return Ok(None);
        }
        let reply = self
            .ask_text_model(flow::EMAIL, vec![Message::user(prompts::email_scan(text))])
            .await?;

        let assessment = RiskAssessment::from_reply(reply);
        debug!(score = assessment.score, "Email scored");
        let gauge = render_gauge(assessment.score as f64);
        Ok(Some(EmailReport { assessment, gauge, defanged_input: defang(text) }))
    }

    /// Off-platform luring audit of a chat log. Narrative only, no score.
    #[instrument(skip_all, fields(len = text.len()))]
    pub async fn audit_chat(&self, text: &str) -> Result<Option<String>, LlmError> {
        if text.is_empty() {
            return Ok(None);
        }
        self.ask_text_model(flow::CHAT, vec![Message::user(prompts::chat_audit(text))])
            .await
            .map(Some)
    }

    /// Tampering check on an uploaded image, via the vision model and the
    /// retry shim. Never fails; a degraded completion carries the fallback text.
    #[instrument(skip_all, fields(bytes = image.len()))]
    pub async fn inspect_document(&self, image: &[u8]) -> Completion {
        let encoded = general_purpose::STANDARD.encode(image);
        let req = LlmRequest::new(
            &self.models.vision,
            vec![Message::user_with_image(prompts::DOCUMENT_FORENSICS, &encoded)],
        )
        .with_flow(flow::DOCUMENT);
        complete_with_retry(self.backend.as_ref(), req, &self.retry).await
    }

    /// Probability that the text is machine-written. Empty text is sent as-is.
    #[instrument(skip_all, fields(len = text.len()))]
    pub async fn detect_ai(&self, text: &str) -> Result<String, LlmError> {
        self.ask_text_model(flow::AI_DETECTION, vec![Message::user(prompts::ai_detection(text))])
            .await
    }

    /// One assistant turn. The question is recorded before the call, so it
    /// stays in the transcript even when the call fails. Earlier turns are
    /// shown to the user but not sent to the model.
    #[instrument(skip_all, fields(history = transcript.len()))]
    pub async fn ask_assistant(
        &self,
        transcript: &mut Transcript,
        question: &str,
    ) -> Result<String, LlmError> {
        transcript.append(Message::user(question));

        let context = self.enricher.fetch_context(question, self.num_results).await;
        let messages = vec![
            Message::system(prompts::ASSISTANT_SYSTEM),
            Message::user(prompts::assistant_user(&context, question)),
        ];
        let reply = self.ask_text_model(flow::ASSISTANT, messages).await?;

        transcript.append(Message::assistant(reply.clone()));
        Ok(reply)
    }
}
