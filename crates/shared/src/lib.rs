pub mod patent;
pub mod settings;

pub mod agent_api {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum ChatRole {
        User,
        Model,
    }

    impl ChatRole {
        pub fn as_str(&self) -> &'static str {
            match self {
                ChatRole::User => "user",
                ChatRole::Model => "model",
            }
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ChatMessage {
        pub role: ChatRole,
        pub content: String,
    }

    impl ChatMessage {
        pub fn user(content: impl Into<String>) -> Self {
            Self {
                role: ChatRole::User,
                content: content.into(),
            }
        }

        pub fn model(content: impl Into<String>) -> Self {
            Self {
                role: ChatRole::Model,
                content: content.into(),
            }
        }
    }

    /// Conversational context for follow-up questions about an analyzed patent.
    ///
    /// The history is the full server-visible conversation; sending a message
    /// replays it, so the session holds no hidden state.
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ChatSession {
        pub history: Vec<ChatMessage>,
    }

    impl ChatSession {
        pub fn new(history: Vec<ChatMessage>) -> Self {
            Self { history }
        }

        /// Record a completed round trip.
        pub fn record_exchange(&mut self, message: impl Into<String>, reply: impl Into<String>) {
            self.history.push(ChatMessage::user(message));
            self.history.push(ChatMessage::model(reply));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::agent_api::*;

    #[test]
    fn test_chat_role_wire_names() {
        let json = serde_json::to_string(&ChatMessage::model("hi")).unwrap();
        assert_eq!(json, r#"{"role":"model","content":"hi"}"#);
        assert_eq!(ChatRole::User.as_str(), "user");
    }

    #[test]
    fn test_session_records_exchange_in_order() {
        let mut session = ChatSession::new(vec![ChatMessage::user("seed")]);
        session.record_exchange("question", "answer");

        assert_eq!(session.history.len(), 3);
        assert_eq!(session.history[1], ChatMessage::user("question"));
        assert_eq!(session.history[2], ChatMessage::model("answer"));
    }
}
