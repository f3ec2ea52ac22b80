//! Chat chunks — the named sections of the final message list.
//!
//! Chunks accumulate in assembly order and are flattened exactly once:
//!
//! ```text
//! system ++ (examples ++ reset pair, if any examples) ++ context ++ current
//! ```
//!
//! The context chunk is itself built in a fixed sub-order: repo map, read-only
//! files, chat files.

use crate::token;
use repoprompt_core::Message;
use serde::Serialize;

/// Ordered groups of messages making up one payload.
#[derive(Debug, Clone, Default)]
pub struct ChatChunks {
    pub system: Vec<Message>,
    pub examples: Vec<Message>,
    /// Context-switch announcement appended after non-empty examples.
    pub reset: Vec<Message>,
    pub context: Vec<Message>,
    pub current: Vec<Message>,
}

/// Size of one chunk, for the assembly report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkStats {
    pub name: String,
    pub messages: usize,
    pub tokens: usize,
}

impl ChatChunks {
    /// Flatten into the final message sequence.
    pub fn all_messages(&self) -> Vec<Message> {
        let mut messages = Vec::with_capacity(self.len());
        messages.extend(self.system.iter().cloned());
        if !self.examples.is_empty() {
            messages.extend(self.examples.iter().cloned());
            messages.extend(self.reset.iter().cloned());
        }
        messages.extend(self.context.iter().cloned());
        messages.extend(self.current.iter().cloned());
        messages
    }

    /// Number of messages `all_messages` will return.
    pub fn len(&self) -> usize {
        let examples = if self.examples.is_empty() {
            0
        } else {
            self.examples.len() + self.reset.len()
        };
        self.system.len() + examples + self.context.len() + self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Per-chunk message and token counts, in payload order.
    pub fn stats(&self) -> Vec<ChunkStats> {
        let examples: Vec<Message> = if self.examples.is_empty() {
            Vec::new()
        } else {
            self.examples.iter().chain(&self.reset).cloned().collect()
        };

        [
            ("system", self.system.as_slice()),
            ("examples", examples.as_slice()),
            ("context", self.context.as_slice()),
            ("current", self.current.as_slice()),
        ]
        .into_iter()
        .map(|(name, msgs)| ChunkStats {
            name: name.into(),
            messages: msgs.len(),
            tokens: token::estimate_messages_tokens(msgs),
        })
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repoprompt_core::Role;

    fn chunks_with_examples(examples: bool) -> ChatChunks {
        ChatChunks {
            system: vec![Message::system("sys")],
            examples: if examples {
                Message::exchange("ex user", "ex assistant").to_vec()
            } else {
                Vec::new()
            },
            reset: Message::exchange("reset", "ok").to_vec(),
            context: Message::exchange("files", "Ok.").to_vec(),
            current: vec![Message::user("request")],
        }
    }

    fn contents(messages: &[Message]) -> Vec<&str> {
        messages.iter().map(|m| m.content()).collect()
    }

    #[test]
    fn reset_pair_follows_examples() {
        let chunks = chunks_with_examples(true);
        let all = chunks.all_messages();
        assert_eq!(
            contents(&all),
            vec!["sys", "ex user", "ex assistant", "reset", "ok", "files", "Ok.", "request"]
        );
        assert_eq!(chunks.len(), all.len());
    }

    #[test]
    fn no_reset_pair_without_examples() {
        let chunks = chunks_with_examples(false);
        let all = chunks.all_messages();
        assert_eq!(contents(&all), vec!["sys", "files", "Ok.", "request"]);
        assert_eq!(chunks.len(), 4);
    }

    #[test]
    fn every_assistant_follows_a_user() {
        for examples in [true, false] {
            let all = chunks_with_examples(examples).all_messages();
            for pair in all.windows(2) {
                if pair[1].role() == Role::Assistant {
                    assert_eq!(pair[0].role(), Role::User);
                }
            }
        }
    }

    #[test]
    fn stats_cover_all_chunks() {
        let stats = chunks_with_examples(true).stats();
        let names: Vec<&str> = stats.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["system", "examples", "context", "current"]);
        assert_eq!(stats[1].messages, 4);
        assert!(stats.iter().all(|s| s.tokens > 0));

        let stats = chunks_with_examples(false).stats();
        assert_eq!(stats[1].messages, 0);
        assert_eq!(stats[1].tokens, 0);
    }

    #[test]
    fn empty_chunks() {
        let chunks = ChatChunks::default();
        assert!(chunks.is_empty());
        assert!(chunks.all_messages().is_empty());
    }
}
