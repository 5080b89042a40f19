//! Answer generation for the optional generation step of a run.

use async_trait::async_trait;
use raglens_core::defaults::{ANSWER_CHUNKS, ANSWER_MAX_CHARS};
use raglens_core::{AnswerGenerator, Result, RetrievedChunk};

/// Extractive answer built from the top-ranked chunk texts.
///
/// Joins the texts of the first `chunks` chunks with a single space and
/// truncates the result to `max_chars` characters.
#[derive(Debug, Clone)]
pub struct ExtractiveAnswer {
    chunks: usize,
    max_chars: usize,
}

impl Default for ExtractiveAnswer {
    fn default() -> Self {
        Self {
            chunks: ANSWER_CHUNKS,
            max_chars: ANSWER_MAX_CHARS,
        }
    }
}

impl ExtractiveAnswer {
    pub fn new(chunks: usize, max_chars: usize) -> Self {
        Self { chunks, max_chars }
    }

    /// Build the answer text without going through the async trait.
    pub fn extract(&self, chunks: &[RetrievedChunk]) -> String {
        let joined = chunks
            .iter()
            .take(self.chunks)
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        truncate_chars(&joined, self.max_chars)
    }
}

#[async_trait]
impl AnswerGenerator for ExtractiveAnswer {
    async fn generate(&self, _query: &str, chunks: &[RetrievedChunk]) -> Result<String> {
        Ok(self.extract(chunks))
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}
