//! fraudlens-llm: inference backend abstraction for FraudLens.
//!
//! `backend` talks to the hosted chat-completion API, `retry` wraps a backend
//! with the bounded retry used by the document-forensics flow, and `audit`
//! keeps a short in-memory trail of every inference call.

pub mod audit;
pub mod backend;
pub mod retry;

pub use backend::{LlmBackend, LlmError, LlmRequest, LlmResponse, Message, Role};
pub use retry::{complete_with_retry, Completion, RetryPolicy};
