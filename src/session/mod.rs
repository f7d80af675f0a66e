//! Conversation state for one orchestrator turn.
//!
//! A turn never outlives a single user request, so there is no persistence:
//! the [`Conversation`] is built, grown through the select and synthesize
//! phases, and dropped.

pub mod types;

pub use types::{Message, Role, ToolCall};

/// Ordered message history for one turn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Start a conversation with a system prompt and the user's text.
    ///
    /// # Example
    /// ```
    /// use zeptosense::session::{Conversation, Role};
    ///
    /// let convo = Conversation::new("You control the board.", "开灯");
    /// assert_eq!(convo.len(), 2);
    /// assert_eq!(convo.messages()[1].role, Role::User);
    /// ```
    pub fn new(system_prompt: &str, user_text: &str) -> Self {
        Self {
            messages: vec![Message::system(system_prompt), Message::user(user_text)],
        }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
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

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Clone the history for a provider call.
    pub fn to_vec(&self) -> Vec<Message> {
        self.messages.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_conversation_has_system_and_user() {
        let convo = Conversation::new("sys", "hello");
        assert_eq!(convo.messages()[0].role, Role::System);
        assert_eq!(convo.messages()[1].content, "hello");
        assert!(!convo.is_empty());
    }

    #[test]
    fn test_push_appends_in_order() {
        let mut convo = Conversation::new("sys", "hello");
        convo.push(Message::assistant_with_tools(
            "",
            vec![ToolCall::new("c1", "turn_led_on", "{}")],
        ));
        convo.push(Message::tool_result("c1", r#"{"success":true}"#));
        assert_eq!(convo.len(), 4);
        assert!(convo.last().unwrap().is_tool_result());
        assert_eq!(convo.to_vec().len(), 4);
    }
}
