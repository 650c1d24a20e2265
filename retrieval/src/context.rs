//! Grounded prompt assembly for the downstream answer generator

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::chunk::Chunk;

/// Fixed reply when retrieval finds nothing to ground an answer in
pub const NO_ANSWER: &str = "I do not know based on the provided context.";

const SYSTEM_PROMPT: &str = "You are a grounded enterprise assistant. \
Only answer from retrieved context. \
If context is insufficient, reply exactly: 'I do not know based on the provided context.' \
Cite sources inline using [n] where possible.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::Assistant => f.write_str("assistant"),
        }
    }
}

/// One prior message in the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// System and user messages for the answer generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundedPrompt {
    pub system: String,
    pub user: String,
}

/// Numbered context entries, `[n] (modality|source|score=0.1234) text`
pub fn format_context_block(chunks: &[Chunk]) -> String {
    chunks
        .iter()
        .enumerate()
        .map(|(i, c)| {
            format!(
                "[{}] ({}|{}|score={:.4}) {}",
                i + 1,
                c.modality,
                c.source,
                c.score,
                c.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Build the prompt for `query`, or `None` when there is no context
///
/// At most the last `max_history * 2` non-empty turns of `history` are
/// included.
pub fn build_prompt(
    query: &str,
    contexts: &[Chunk],
    history: &[ChatTurn],
    max_history: usize,
) -> Option<GroundedPrompt> {
    if contexts.is_empty() {
        return None;
    }

    let keep = max_history.saturating_mul(2);
    let recent = &history[history.len().saturating_sub(keep)..];
    let conversation = recent
        .iter()
        .filter(|turn| !turn.content.trim().is_empty())
        .map(|turn| format!("{}: {}", turn.role, turn.content))
        .collect::<Vec<_>>()
        .join("\n");

    let user = format!(
        "Conversation:\n{}\n\nRetrieved context:\n{}\n\nQuestion: {}\n\
         Answer with concise, factual statements grounded in the context.",
        conversation,
        format_context_block(contexts),
        query
    );

    Some(GroundedPrompt {
        system: SYSTEM_PROMPT.to_string(),
        user,
    })
}
