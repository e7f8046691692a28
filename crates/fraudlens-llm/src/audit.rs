//! Audit trail for inference calls.
//!
//! `AuditedBackend` wraps any backend and records one `LlmAuditEntry` per
//! call into a bounded in-memory `AuditLog`. Only a hash of the output is
//! kept, never the prompt or the reply.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::backend::{LlmBackend, LlmError, LlmRequest, LlmResponse};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmAuditEntry {
    pub id: Uuid,
    pub flow: Option<String>,
    pub model: String,
    pub backend: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    /// SHA-256 of the reply text, hex encoded. Empty when the call failed.
    pub output_hash: String,
    pub latency_ms: u64,
    /// "ok" or the `LlmError::kind` label.
    pub outcome: String,
    pub called_at: chrono::DateTime<Utc>,
}

impl LlmAuditEntry {
    pub fn new(
        req: &LlmRequest,
        backend: &str,
        result: &Result<LlmResponse, LlmError>,
        latency_ms: u64,
    ) -> Self {
        let (model, prompt_tokens, completion_tokens, output_hash, outcome) = match result {
            Ok(resp) => {
                let mut hasher = Sha256::new();
                hasher.update(resp.content.as_bytes());
                (
                    resp.model.clone(),
                    resp.prompt_tokens,
                    resp.completion_tokens,
                    format!("{:x}", hasher.finalize()),
                    "ok".to_string(),
                )
            }
            Err(e) => (req.model.clone(), 0, 0, String::new(), e.kind().to_string()),
        };

        Self {
            id: Uuid::new_v4(),
            flow: req.flow.clone(),
            model,
            backend: backend.to_string(),
            prompt_tokens,
            completion_tokens,
            output_hash,
            latency_ms,
            outcome,
            called_at: Utc::now(),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.outcome == "ok"
    }
}

/// Ring buffer of the most recent audit entries.
pub struct AuditLog {
    capacity: usize,
    entries: Mutex<VecDeque<LlmAuditEntry>>,
}

impl AuditLog {
    pub fn new(capacity: usize) -> Self {
        Self { capacity: capacity.max(1), entries: Mutex::new(VecDeque::new()) }
    }

    pub fn record(&self, entry: LlmAuditEntry) {
        let mut entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Newest first.
    pub fn recent(&self, limit: usize) -> Vec<LlmAuditEntry> {
        let entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        entries.iter().rev().take(limit).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Backend decorator that times each call, logs it and records an audit entry.
pub struct AuditedBackend {
    inner: Arc<dyn LlmBackend>,
    log: Arc<AuditLog>,
}

impl AuditedBackend {
    pub fn new(inner: Arc<dyn LlmBackend>, log: Arc<AuditLog>) -> Self {
        Self { inner, log }
    }
}

#[async_trait]
impl LlmBackend for AuditedBackend {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError> {
        let started = Instant::now();
        let result = self.inner.complete(req.clone()).await;
        let latency_ms = started.elapsed().as_millis() as u64;

        let entry = LlmAuditEntry::new(&req, self.inner.name(), &result, latency_ms);
        tracing::info!(
            flow = entry.flow.as_deref().unwrap_or("-"),
            model = %entry.model,
            backend = %entry.backend,
            latency_ms,
            outcome = %entry.outcome,
            completion_tokens = entry.completion_tokens,
            "Inference call"
        );
        self.log.record(entry);
        result
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Message;

    struct FixedBackend(Result<&'static str, u16>);

    #[async_trait]
    impl LlmBackend for FixedBackend {
        async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError> {
            match self.0 {
                Ok(text) => Ok(LlmResponse {
                    content: text.to_string(),
                    model: req.model,
                    prompt_tokens: 3,
                    completion_tokens: 5,
                }),
                Err(_) => Err(LlmError::Auth("invalid api key".into())),
            }
        }

        fn name(&self) -> &str { "fixed" }
    }

    fn request() -> LlmRequest {
        LlmRequest::new("llama", vec![Message::user("hi")]).with_flow("email_scan")
    }

    #[tokio::test]
    async fn test_successful_call_is_audited_with_hash() {
        let log = Arc::new(AuditLog::new(10));
        let backend = AuditedBackend::new(Arc::new(FixedBackend(Ok("abc"))), log.clone());

        let resp = backend.complete(request()).await.unwrap();
        assert_eq!(resp.content, "abc");

        let entries = log.recent(10);
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert!(entry.succeeded());
        assert_eq!(entry.flow.as_deref(), Some("email_scan"));
        assert_eq!(entry.backend, "fixed");
        assert_eq!(entry.completion_tokens, 5);
        // sha256("abc")
        assert_eq!(
            entry.output_hash,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[tokio::test]
    async fn test_failed_call_is_audited_and_error_passed_through() {
        let log = Arc::new(AuditLog::new(10));
        let backend = AuditedBackend::new(Arc::new(FixedBackend(Err(401))), log.clone());

        let err = backend.complete(request()).await.unwrap_err();
        assert_eq!(err.kind(), "auth");

        let entry = &log.recent(1)[0];
        assert_eq!(entry.outcome, "auth");
        assert_eq!(entry.model, "llama");
        assert!(entry.output_hash.is_empty());
    }

    #[test]
    fn test_log_drops_oldest_beyond_capacity() {
        let log = AuditLog::new(2);
        let failed: Result<LlmResponse, LlmError> = Err(LlmError::Timeout);
        for model in ["a", "b", "c"] {
            let req = LlmRequest::new(model, vec![Message::user("x")]);
            log.record(LlmAuditEntry::new(&req, "t", &failed, 1));
        }
        let models: Vec<String> = log.recent(10).into_iter().map(|e| e.model).collect();
        assert_eq!(models, vec!["c", "b"]);
        assert_eq!(log.len(), 2);
    }
}
