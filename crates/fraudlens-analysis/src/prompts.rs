//! Prompt templates. The user's text is appended verbatim after the instruction.

pub const EMAIL_SCAN: &str = "Analyze for fraud and return Risk Score (0-10) and reasoning, \
and if the risk level is above 5 then map it to a relevant MITRE ATT&CK ID: ";

pub const CHAT_AUDIT: &str = "Audit for off-platform luring and trust abuse: ";

pub const DOCUMENT_FORENSICS: &str = "Audit for tampering/Photoshop.";

pub const AI_DETECTION: &str = "Is this AI generated? Provide probability %: ";

pub const ASSISTANT_SYSTEM: &str =
    "You are a professional GRC expert for Deriv. Refer to MFSA and Cybersecurity standards.";

pub fn email_scan(text: &str) -> String {
    format!("{EMAIL_SCAN}{text}")
}

pub fn chat_audit(text: &str) -> String {
    format!("{CHAT_AUDIT}{text}")
}

pub fn ai_detection(text: &str) -> String {
    format!("{AI_DETECTION}{text}")
}

pub fn assistant_user(context: &str, question: &str) -> String {
    format!("Regulatory Context: {context}\n\nUser: {question}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_prompt_text() {
        assert_eq!(
            email_scan("hi"),
            "Analyze for fraud and return Risk Score (0-10) and reasoning, and if the risk \
             level is above 5 then map it to a relevant MITRE ATT&CK ID: hi"
        );
    }

    #[test]
    fn test_assistant_user_prompt_layout() {
        assert_eq!(
            assistant_user("ctx", "What is DORA?"),
            "Regulatory Context: ctx\n\nUser: What is DORA?"
        );
    }
}
