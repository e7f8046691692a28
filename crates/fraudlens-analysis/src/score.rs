//! Risk-score extraction from free-text model output.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

/// Score used when the model reply contains no number at all.
pub const DEFAULT_SCORE: u64 = 5;

/// `\d` is Unicode-aware: it matches every decimal digit (`Nd`), not just ASCII.
fn first_digits() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").expect("static regex"))
}

fn is_decimal(c: char) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    let mut buf = [0u8; 4];
    RE.get_or_init(|| Regex::new(r"^\d$").expect("static regex"))
        .is_match(c.encode_utf8(&mut buf))
}

/// Numeric value of a decimal digit from any script.
fn digit_value(c: char) -> u64 {
    if let Some(d) = c.to_digit(10) {
        return u64::from(d);
    }
    // Unicode encodes each script's digits as a contiguous run starting at zero.
    let mut start = c as u32;
    while let Some(prev) = start.checked_sub(1).and_then(char::from_u32) {
        if !is_decimal(prev) {
            break;
        }
        start -= 1;
    }
    u64::from((c as u32 - start) % 10)
}

/// First run of decimal digits anywhere in `text`, as an integer; 5 when none.
///
/// Digits from any script count ("٧" is 7). The value is not clamped to 0–10:
/// "Score 42" yields 42. A run too long for `u64` saturates at `u64::MAX`.
pub fn extract_score(text: &str) -> u64 {
    match first_digits().find(text) {
        Some(m) => m
            .as_str()
            .chars()
            .try_fold(0u64, |acc, c| acc.checked_mul(10)?.checked_add(digit_value(c)))
            .unwrap_or(u64::MAX),
        None => DEFAULT_SCORE,
    }
}

/// Score and narrative derived from one model reply. Never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskAssessment {
    pub score: u64,
    pub narrative: String,
}

impl RiskAssessment {
    pub fn from_reply(reply: impl Into<String>) -> Self {
        let narrative = reply.into();
        Self { score: extract_score(&narrative), narrative }
    }

    /// True when the score lies outside the gauge's 0–10 scale.
    pub fn out_of_scale(&self) -> bool {
        self.score > 10
    }
}
