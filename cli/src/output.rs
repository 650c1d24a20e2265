//! Human-readable and JSON rendering.

use std::fmt::Write;

use serde::Serialize;

use crate::error::CliResult;
use crate::session::{Answer, BuildSummary};

/// Characters of chunk text shown per context.
pub const PREVIEW_CHARS: usize = 500;

pub fn render_build(summary: &BuildSummary) -> String {
    format!(
        "Index ready with {} chunks ({} text, {} image), {}d, built in {:.3} sec",
        summary.chunks,
        summary.text_chunks,
        summary.image_chunks,
        summary.dimension,
        summary.latency_secs
    )
}

pub fn render_answer(answer: &Answer, show_prompt: bool) -> String {
    let mut out = format!("Q: {}\n", answer.query);

    if let Some(reply) = answer.fallback() {
        let _ = writeln!(out, "{reply}");
    }

    for (i, chunk) in answer.contexts.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. [{}] {} (score {:.4})\n   {}",
            i + 1,
            chunk.modality,
            chunk.source,
            chunk.score,
            preview(&chunk.text)
        );
    }

    if show_prompt {
        if let Some(prompt) = &answer.prompt {
            let _ = writeln!(out, "--- system ---\n{}\n--- user ---\n{}", prompt.system, prompt.user);
        }
    }

    let _ = write!(out, "Latency: {:.3} sec", answer.latency_secs);
    out
}

pub fn render_json<T: Serialize>(value: &T) -> CliResult<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mmrag_retrieval::{Chunk, Modality};

    fn answer(contexts: Vec<Chunk>) -> Answer {
        Answer {
            query: "q3 revenue".to_string(),
            contexts,
            prompt: None,
            latency_secs: 0.25,
        }
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let long = "é".repeat(PREVIEW_CHARS + 10);
        let shown = preview(&long);
        assert!(shown.ends_with("..."));
        assert_eq!(shown.chars().count(), PREVIEW_CHARS + 3);
        assert_eq!(preview("short"), "short");
    }

    #[test]
    fn test_render_answer_lists_contexts() {
        let chunk = Chunk::new("revenue grew", "report.txt", Modality::Text).with_score(0.8123);
        let text = render_answer(&answer(vec![chunk]), false);
        assert!(text.contains("1. [text] report.txt (score 0.8123)"));
        assert!(text.ends_with("Latency: 0.250 sec"));
    }

    #[test]
    fn test_render_answer_without_contexts_uses_fallback() {
        let text = render_answer(&answer(vec![]), true);
        assert!(text.contains(mmrag_retrieval::NO_ANSWER));
    }

    #[test]
    fn test_render_json_skips_missing_prompt() {
        let json = render_json(&answer(vec![])).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["query"], "q3 revenue");
        assert!(value.get("prompt").is_none());
    }
}
