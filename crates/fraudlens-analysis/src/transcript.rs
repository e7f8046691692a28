//! Per-session chat history for the compliance assistant.

use fraudlens_llm::{Message, Role};
use serde::Serialize;

/// Ordered, append-only chat history owned by one session.
///
/// No size cap and no deduplication; the only way to shrink it is `clear`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last_from(&self, role: Role) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.role() == role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order_and_duplicates() {
        let mut t = Transcript::new();
        t.append(Message::user("q"));
        t.append(Message::assistant("a"));
        t.append(Message::user("q"));

        let roles: Vec<Role> = t.messages().iter().map(|m| m.role()).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User]);
        assert_eq!(t.len(), 3);
        assert_eq!(t.last_from(Role::Assistant).unwrap().text(), "a");
    }

    #[test]
    fn test_clear_empties_history() {
        let mut t = Transcript::new();
        t.append(Message::user("q"));
        t.clear();
        assert!(t.is_empty());
        assert!(t.last_from(Role::User).is_none());
    }
}
