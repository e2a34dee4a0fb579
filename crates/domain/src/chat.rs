use serde::{Deserialize, Serialize};

/// A single turn in a conversation (runtime-agnostic).
///
/// An ordered slice of messages forms the conversation, oldest first.
/// Both the local runtime and the remote peer consume this shape directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

// ── Convenience constructors ───────────────────────────────────────

impl ChatMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self { role: Role::System, content: text.into() }
    }
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: Role::User, content: text.into() }
    }
    pub fn assistant(text: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: text.into() }
    }
}

/// Assemble the message set for one request: optional system prompt,
/// the most recent `limit` history turns, then the new user input.
pub fn build_messages(
    system: &str,
    history: &[ChatMessage],
    limit: usize,
    input: &str,
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len().min(limit) + 2);
    if !system.is_empty() {
        messages.push(ChatMessage::system(system));
    }
    let start = history.len().saturating_sub(limit);
    messages.extend_from_slice(&history[start..]);
    messages.push(ChatMessage::user(input));
    messages
}

/// Content of the most recent user turn, if any.
pub fn last_user_message(messages: &[ChatMessage]) -> Option<&str> {
    messages
        .iter()
        .rev()
        .find(|m| m.role == Role::User)
        .map(|m| m.content.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        let msg = ChatMessage::user("hi");
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"hi"}"#);
    }

    #[test]
    fn build_messages_prepends_system_and_appends_input() {
        let history = vec![
            ChatMessage::user("earlier"),
            ChatMessage::assistant("reply"),
        ];
        let messages = build_messages("be terse", &history, 10, "now");
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[3], ChatMessage::user("now"));
    }

    #[test]
    fn build_messages_empty_system_is_omitted() {
        let messages = build_messages("", &[], 10, "hello");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::User);
    }

    #[test]
    fn build_messages_honors_history_limit() {
        let history: Vec<ChatMessage> =
            (0..8).map(|i| ChatMessage::user(format!("m{i}"))).collect();
        let messages = build_messages("", &history, 3, "tail");
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].content, "m5");
    }

    #[test]
    fn last_user_message_skips_assistant_turns() {
        let messages = vec![
            ChatMessage::system("sys"),
            ChatMessage::user("question"),
            ChatMessage::assistant("answer"),
        ];
        assert_eq!(last_user_message(&messages), Some("question"));
        assert_eq!(last_user_message(&[ChatMessage::system("sys")]), None);
    }
}
