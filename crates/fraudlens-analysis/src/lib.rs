//! fraudlens-analysis: the fraud-analysis flows behind the dashboard.
//!
//!   - `defang`, `score`, `gauge`: pure post-processing of model output
//!   - `enrich`: web-search evidence for the compliance assistant
//!   - `transcript`: per-session assistant history
//!   - `flows`: the four analysis tabs and the assistant, wired to an `LlmBackend`

pub mod defang;
pub mod enrich;
pub mod flows;
pub mod gauge;
pub mod prompts;
pub mod score;
pub mod transcript;

pub use defang::defang;
pub use flows::{EmailReport, FraudLens};
pub use gauge::{render_gauge, Band, GaugeSpec};
pub use score::{extract_score, RiskAssessment};
pub use transcript::Transcript;
