//! Lexical defanging of text shown back to the analyst.

/// Neutralise links and addresses so they cannot be clicked or auto-linked.
///
/// Purely literal: every `http` becomes `hxxp`, then every `.` becomes `[.]`,
/// whether or not it sits inside a URL. The order of the two passes is fixed.
pub fn defang(text: &str) -> String {
    text.replace("http", "hxxp").replace('.', "[.]")
}
