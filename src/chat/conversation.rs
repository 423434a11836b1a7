//! Chat message types and system prompt injection.

use serde::{Deserialize, Serialize};

/// Speaker of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single turn of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

/// Ensure the conversation opens with a system message.
///
/// When no message carries the system role, one holding `system_prompt` is
/// prepended. A conversation that already has a system message anywhere is
/// returned untouched: it is neither moved to the front nor duplicated.
pub fn prepare_conversation(
    mut messages: Vec<ChatMessage>,
    system_prompt: &str,
) -> Vec<ChatMessage> {
    if !messages.iter().any(|m| m.role == Role::System) {
        messages.insert(0, ChatMessage::system(system_prompt));
    }
    messages
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROMPT: &str = "You are a test oracle.";

    #[test]
    fn test_empty_conversation_gets_system_prompt() {
        let prepared = prepare_conversation(vec![], PROMPT);
        assert_eq!(prepared, vec![ChatMessage::system(PROMPT)]);
    }

    #[test]
    fn test_system_prompt_prepended() {
        let prepared = prepare_conversation(
            vec![ChatMessage::user("hi"), ChatMessage::assistant("hello")],
            PROMPT,
        );
        assert_eq!(prepared.len(), 3);
        assert_eq!(prepared[0], ChatMessage::system(PROMPT));
        assert_eq!(prepared[1], ChatMessage::user("hi"));
        assert_eq!(prepared[2], ChatMessage::assistant("hello"));
    }

    #[test]
    fn test_existing_system_message_kept() {
        let input = vec![ChatMessage::system("custom"), ChatMessage::user("hi")];
        let prepared = prepare_conversation(input.clone(), PROMPT);
        assert_eq!(prepared, input);
    }

    #[test]
    fn test_idempotent() {
        let once = prepare_conversation(vec![ChatMessage::user("hi")], PROMPT);
        let twice = prepare_conversation(once.clone(), PROMPT);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_misplaced_system_message_accepted_as_is() {
        let input = vec![ChatMessage::user("hi"), ChatMessage::system("late")];
        let prepared = prepare_conversation(input.clone(), PROMPT);
        assert_eq!(prepared, input);
        assert_eq!(prepared.iter().filter(|m| m.role == Role::System).count(), 1);
    }

    #[test]
    fn test_chat_request_serde() {
        let req: ChatRequest =
            serde_json::from_str(r#"{"messages":[{"role":"user","content":"hi"}]}"#).unwrap();
        assert_eq!(req.messages, vec![ChatMessage::user("hi")]);

        let empty: ChatRequest = serde_json::from_str("{}").unwrap();
        assert!(empty.messages.is_empty());

        assert!(serde_json::from_str::<ChatRequest>(
            r#"{"messages":[{"role":"wizard","content":"hi"}]}"#
        )
        .is_err());

        let json = serde_json::to_value(ChatMessage::assistant("ok")).unwrap();
        assert_eq!(json["role"], "assistant");
    }
}
