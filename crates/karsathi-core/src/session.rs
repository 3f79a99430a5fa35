//! Chat transcript types
//!
//! The transcript is an append-only ordered sequence of turns; a turn is
//! never mutated once created. The chat front end owns a `Transcript` and
//! pushes one user turn plus one or more assistant turns per exchange.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One message in the conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub id: u64,
    pub text: String,
    pub from_assistant: bool,
    pub created_at: DateTime<Utc>,
}

/// Append-only conversation history
pub struct Transcript {
    turns: Vec<ChatTurn>,
    next_id: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self {
            turns: Vec::new(),
            next_id: 1,
        }
    }

    /// Append a user turn; returns the assigned id.
    pub fn push_user(&mut self, text: &str) -> u64 {
        self.push(text, false)
    }

    /// Append an assistant turn; returns the assigned id.
    pub fn push_assistant(&mut self, text: &str) -> u64 {
        self.push(text, true)
    }

    fn push(&mut self, text: &str, from_assistant: bool) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.turns.push(ChatTurn {
            id,
            text: text.to_string(),
            from_assistant,
            created_at: Utc::now(),
        });
        id
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_sequential() {
        let mut transcript = Transcript::new();
        let first = transcript.push_user("hello");
        let second = transcript.push_assistant("hi there");
        assert_eq!(first, 1);
        assert_eq!(second, 2);
        assert_eq!(transcript.len(), 2);
    }

    #[test]
    fn test_order_is_preserved() {
        let mut transcript = Transcript::new();
        transcript.push_user("question");
        transcript.push_assistant("answer");

        let turns = transcript.turns();
        assert!(!turns[0].from_assistant);
        assert!(turns[1].from_assistant);
        assert_eq!(turns[0].text, "question");
        assert!(turns[0].created_at <= turns[1].created_at);
    }
}
