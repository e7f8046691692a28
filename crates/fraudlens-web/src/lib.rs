//! fraudlens-web: the FraudLens dashboard server.
//! Provides:
//!   - Email scan, chat audit, document forensics and AI-detection tabs
//!   - GRC compliance assistant sidebar with per-session history
//!   - JSON API over the same flows
//!   - Inference audit trail and health endpoint

pub mod error;
pub mod handlers;
pub mod router;
pub mod session;
pub mod state;
pub mod upload;
